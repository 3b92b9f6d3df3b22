// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic bindings produced by a compiler front end.
//!
//! Type bindings are shared (`Arc`) and refer to other types by qualified
//! name key, so the hierarchy is walked through the compiler rather than
//! through owning pointers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::ast::{NodeId, Span};
use crate::modifiers::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeBindingKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    Primitive,
    Array,
    TypeVariable,
    /// Referenced but not found in the lookup environment.
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeBinding {
    pub kind: TypeBindingKind,
    /// Simple source name; empty for anonymous classes.
    pub name: String,
    /// Package plus enclosing type names.
    pub qualification: String,
    pub package: String,
    pub modifiers: Modifiers,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub type_parameters: Vec<String>,
    /// Arguments of a parameterized reference (`List<String>`).
    pub type_arguments: Vec<Arc<TypeBinding>>,
    /// Element type of an array binding.
    pub element: Option<Arc<TypeBinding>>,
    pub dims: usize,
    pub declaring_path: Option<PathBuf>,
    pub declaration: Option<Span>,
}

impl TypeBinding {
    fn bare(kind: TypeBindingKind, name: &str, qualification: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            qualification: qualification.to_string(),
            package: qualification.to_string(),
            modifiers: Modifiers::empty(),
            superclass: None,
            interfaces: Vec::new(),
            type_parameters: Vec::new(),
            type_arguments: Vec::new(),
            element: None,
            dims: 0,
            declaring_path: None,
            declaration: None,
        }
    }

    pub fn primitive(name: &str) -> Arc<Self> {
        Arc::new(Self::bare(TypeBindingKind::Primitive, name, ""))
    }

    pub fn missing(name: &str) -> Arc<Self> {
        let (qualification, simple) = match name.rfind('.') {
            Some(dot) => (&name[..dot], &name[dot + 1..]),
            None => ("", name),
        };
        Arc::new(Self::bare(TypeBindingKind::Missing, simple, qualification))
    }

    pub fn type_variable(name: &str) -> Arc<Self> {
        Arc::new(Self::bare(TypeBindingKind::TypeVariable, name, ""))
    }

    /// A well-known library type (`java.lang.String`) the sources do not declare.
    pub fn library(kind: TypeBindingKind, package: &str, name: &str, superclass: Option<&str>) -> Arc<Self> {
        let mut binding = Self::bare(kind, name, package);
        binding.superclass = superclass.map(str::to_string);
        Arc::new(binding)
    }

    pub fn array(element: Arc<TypeBinding>, dims: usize) -> Arc<Self> {
        if dims == 0 {
            return element;
        }
        let mut binding = Self::bare(TypeBindingKind::Array, &element.name, &element.qualification);
        binding.package = element.package.clone();
        binding.dims = dims;
        binding.element = Some(element);
        Arc::new(binding)
    }

    pub fn parameterized(generic: &Arc<TypeBinding>, arguments: Vec<Arc<TypeBinding>>) -> Arc<Self> {
        if arguments.is_empty() {
            return Arc::clone(generic);
        }
        let mut binding = (**generic).clone();
        binding.type_arguments = arguments;
        Arc::new(binding)
    }

    pub fn qualified_name(&self) -> String {
        if self.qualification.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.qualification, self.name)
        }
    }

    /// Lookup key of the erased type.
    pub fn key(&self) -> String {
        match &self.element {
            Some(element) => format!("{}{}", element.key(), "[]".repeat(self.dims)),
            None => self.qualified_name(),
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeBindingKind::Interface | TypeBindingKind::Annotation)
    }

    pub fn is_missing(&self) -> bool {
        self.kind == TypeBindingKind::Missing
    }

    pub fn is_type_variable(&self) -> bool {
        self.kind == TypeBindingKind::TypeVariable
    }

    pub fn is_parameterized(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// Name as written in signatures: `List<String>[]`.
    pub fn display_name(&self) -> String {
        if let Some(element) = &self.element {
            return format!("{}{}", element.display_name(), "[]".repeat(self.dims));
        }
        if self.type_arguments.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self.type_arguments.iter().map(|a| a.display_name()).collect();
        format!("{}<{}>", self.name, args.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodProblem {
    /// The selector exists on the receiver but with another arity.
    ArityMismatch,
    /// Nothing with that selector is visible.
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    pub selector: String,
    /// Key of the declaring type.
    pub declaring_class: String,
    pub parameters: Vec<Arc<TypeBinding>>,
    /// `None` for `void` and constructors.
    pub return_type: Option<Arc<TypeBinding>>,
    pub modifiers: Modifiers,
    pub is_constructor: bool,
    pub is_default_constructor: bool,
    pub type_parameters: Vec<String>,
    pub declaring_path: Option<PathBuf>,
    pub declaration: Option<Span>,
    pub problem: Option<MethodProblem>,
}

impl MethodBinding {
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_private(&self) -> bool {
        self.modifiers.is_private()
    }

    pub fn is_problem(&self) -> bool {
        self.problem.is_some()
    }

    /// Same selector and parameter erasures.
    pub fn has_signature_of(&self, other: &MethodBinding) -> bool {
        self.selector == other.selector
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.key() == b.key() || a.is_type_variable() || b.is_type_variable())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub name: String,
    pub declaring_class: String,
    pub field_type: Option<Arc<TypeBinding>>,
    pub modifiers: Modifiers,
    pub declaring_path: Option<PathBuf>,
    pub declaration: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalBinding {
    pub name: String,
    /// Span of the declared name.
    pub declaration: Span,
    pub local_type: Option<Arc<TypeBinding>>,
    pub is_argument: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Type(Arc<TypeBinding>),
    Method(Arc<MethodBinding>),
    Field(Arc<FieldBinding>),
    Local(Arc<LocalBinding>),
    Package(String),
}

impl Binding {
    pub fn as_type(&self) -> Option<&Arc<TypeBinding>> {
        match self {
            Binding::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Arc<MethodBinding>> {
        match self {
            Binding::Method(m) => Some(m),
            _ => None,
        }
    }
}

/// Bindings of one unit, keyed by node.
#[derive(Debug, Default, Clone)]
pub struct ResolvedUnit {
    bindings: HashMap<NodeId, Binding>,
    expression_types: HashMap<NodeId, Arc<TypeBinding>>,
    /// Per-token bindings of qualified names (`a.b.c`, `java.util.List`).
    token_bindings: HashMap<NodeId, Vec<Option<Binding>>>,
}

impl ResolvedUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding(&self, node: NodeId) -> Option<&Binding> {
        self.bindings.get(&node)
    }

    pub fn expression_type(&self, node: NodeId) -> Option<&Arc<TypeBinding>> {
        self.expression_types.get(&node)
    }

    pub fn token_binding(&self, node: NodeId, token: usize) -> Option<&Binding> {
        self.token_bindings
            .get(&node)
            .and_then(|tokens| tokens.get(token))
            .and_then(Option::as_ref)
    }

    pub fn set_binding(&mut self, node: NodeId, binding: Binding) {
        self.bindings.insert(node, binding);
    }

    pub fn set_expression_type(&mut self, node: NodeId, ty: Arc<TypeBinding>) {
        self.expression_types.insert(node, ty);
    }

    pub fn set_token_bindings(&mut self, node: NodeId, tokens: Vec<Option<Binding>>) {
        self.token_bindings.insert(node, tokens);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_and_parameterized_names() {
        let string = TypeBinding::library(TypeBindingKind::Class, "java.lang", "String", Some("java.lang.Object"));
        let list = TypeBinding::library(TypeBindingKind::Interface, "java.util", "List", None);
        let list_of_string = TypeBinding::parameterized(&list, vec![Arc::clone(&string)]);
        assert_eq!(list_of_string.display_name(), "List<String>");
        assert_eq!(list_of_string.key(), "java.util.List");
        let matrix = TypeBinding::array(TypeBinding::primitive("int"), 2);
        assert_eq!(matrix.key(), "int[][]");
        assert_eq!(matrix.display_name(), "int[][]");
    }

    #[test]
    fn missing_types_split_their_name() {
        let missing = TypeBinding::missing("com.acme.Gone");
        assert_eq!(missing.name, "Gone");
        assert_eq!(missing.qualification, "com.acme");
        assert!(missing.is_missing());
    }
}
