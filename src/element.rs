// SPDX-License-Identifier: MIT OR Apache-2.0

//! Element handles: stable symbolic references handed back with each match

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ast::{NodeId, NodeKind, ParsedUnit, TypeKind};
use crate::binding::{Binding, TypeBindingKind};

/// Element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Package,
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    Method,
    Constructor,
    Field,
    Initializer,
    LocalVariable,
    /// A type the environment could not find.
    Unresolved,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Package => write!(f, "package"),
            ElementKind::Class => write!(f, "class"),
            ElementKind::Interface => write!(f, "interface"),
            ElementKind::Enum => write!(f, "enum"),
            ElementKind::Annotation => write!(f, "annotation"),
            ElementKind::Record => write!(f, "record"),
            ElementKind::Method => write!(f, "method"),
            ElementKind::Constructor => write!(f, "constructor"),
            ElementKind::Field => write!(f, "field"),
            ElementKind::Initializer => write!(f, "initializer"),
            ElementKind::LocalVariable => write!(f, "local"),
            ElementKind::Unresolved => write!(f, "unresolved"),
        }
    }
}

impl From<TypeKind> for ElementKind {
    fn from(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Class => ElementKind::Class,
            TypeKind::Interface => ElementKind::Interface,
            TypeKind::Enum => ElementKind::Enum,
            TypeKind::Annotation => ElementKind::Annotation,
            TypeKind::Record => ElementKind::Record,
        }
    }
}

/// A symbolic reference to a Java element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub kind: ElementKind,
    /// Source file of the element, when it comes from source.
    pub path: Option<PathBuf>,
    /// `com.acme.Widget.foo`; constructors use their type's name.
    pub qualified_name: String,
    /// Parameter types as written, `(int,String)`, for methods and constructors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ElementHandle {
    pub fn new(kind: ElementKind, qualified_name: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            qualified_name: qualified_name.into(),
            signature: None,
        }
    }

    pub fn at(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name)?;
        if let Some(signature) = &self.signature {
            write!(f, "{}", signature)?;
        }
        Ok(())
    }
}

/// Turns declarations and bindings into handles.
pub trait HandleFactory {
    /// Handle of the element a declaration node declares.
    fn declared(&self, unit: &ParsedUnit, id: NodeId) -> Option<ElementHandle>;

    /// Handle of the element a binding resolves to.
    fn resolved(&self, binding: &Binding) -> Option<ElementHandle>;

    /// Innermost method, field, initializer or type around a reference.
    fn enclosing(&self, unit: &ParsedUnit, id: NodeId) -> Option<ElementHandle> {
        unit.enclosing_member(id).and_then(|member| self.declared(unit, member))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHandleFactory;

impl DefaultHandleFactory {
    fn owner_name(unit: &ParsedUnit, id: NodeId) -> String {
        unit.enclosing_type(id)
            .and_then(|t| unit.type_decl(t))
            .map(|t| type_name(t.qualified_name(), t.anonymous))
            .unwrap_or_default()
    }

    fn signature(unit: &ParsedUnit, parameters: &[NodeId]) -> String {
        let types: Vec<&str> = parameters
            .iter()
            .map(|&p| match unit.kind(p) {
                NodeKind::Local(decl) => decl.type_ref.map_or("var", |r| unit.text(unit.node(r).span)),
                _ => "?",
            })
            .collect();
        format!("({})", types.join(","))
    }
}

fn type_name(qualified: String, anonymous: bool) -> String {
    if anonymous {
        format!("{}<anonymous>", qualified)
    } else {
        qualified
    }
}

fn member(owner: &str, name: &str) -> String {
    if owner.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", owner, name)
    }
}

impl HandleFactory for DefaultHandleFactory {
    fn declared(&self, unit: &ParsedUnit, id: NodeId) -> Option<ElementHandle> {
        let handle = match unit.kind(id) {
            NodeKind::Package { name, .. } => ElementHandle::new(ElementKind::Package, name.clone()),
            NodeKind::Type(decl) => {
                ElementHandle::new(decl.kind.into(), type_name(decl.qualified_name(), decl.anonymous))
            }
            NodeKind::Method(decl) => {
                ElementHandle::new(ElementKind::Method, member(&Self::owner_name(unit, id), &decl.name))
                    .with_signature(Self::signature(unit, &decl.parameters))
            }
            NodeKind::Constructor(decl) => ElementHandle::new(ElementKind::Constructor, Self::owner_name(unit, id))
                .with_signature(Self::signature(unit, &decl.parameters)),
            NodeKind::Field(decl) => ElementHandle::new(ElementKind::Field, member(&Self::owner_name(unit, id), &decl.name)),
            NodeKind::Local(decl) => {
                let scope = self.enclosing(unit, id).map(|h| h.qualified_name).unwrap_or_default();
                ElementHandle::new(ElementKind::LocalVariable, member(&scope, &decl.name))
            }
            NodeKind::Initializer { is_static } => {
                let name = if *is_static { "<clinit>" } else { "<init>" };
                ElementHandle::new(ElementKind::Initializer, member(&Self::owner_name(unit, id), name))
            }
            _ => return None,
        };
        Some(handle.at(unit.path()))
    }

    fn resolved(&self, binding: &Binding) -> Option<ElementHandle> {
        let handle = match binding {
            Binding::Package(name) => ElementHandle::new(ElementKind::Package, name.clone()),
            Binding::Type(ty) => {
                let ty = ty.element.as_ref().unwrap_or(ty);
                let kind = match ty.kind {
                    TypeBindingKind::Class => ElementKind::Class,
                    TypeBindingKind::Interface => ElementKind::Interface,
                    TypeBindingKind::Enum => ElementKind::Enum,
                    TypeBindingKind::Annotation => ElementKind::Annotation,
                    TypeBindingKind::Record => ElementKind::Record,
                    TypeBindingKind::Missing => ElementKind::Unresolved,
                    TypeBindingKind::Primitive | TypeBindingKind::Array | TypeBindingKind::TypeVariable => return None,
                };
                let handle = ElementHandle::new(kind, ty.qualified_name());
                match &ty.declaring_path {
                    Some(path) => handle.at(path),
                    None => handle,
                }
            }
            Binding::Method(method) if !method.is_problem() => {
                let types: Vec<String> = method.parameters.iter().map(|p| p.display_name()).collect();
                let handle = if method.is_constructor {
                    ElementHandle::new(ElementKind::Constructor, method.declaring_class.clone())
                } else {
                    ElementHandle::new(ElementKind::Method, member(&method.declaring_class, &method.selector))
                };
                let handle = handle.with_signature(format!("({})", types.join(",")));
                match &method.declaring_path {
                    Some(path) => handle.at(path),
                    None => handle,
                }
            }
            Binding::Method(_) => return None,
            Binding::Field(field) => {
                let handle = ElementHandle::new(ElementKind::Field, member(&field.declaring_class, &field.name));
                match &field.declaring_path {
                    Some(path) => handle.at(path),
                    None => handle,
                }
            }
            Binding::Local(local) => ElementHandle::new(ElementKind::LocalVariable, local.name.clone()),
        };
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ContainerMask;
    use crate::java::lower::lower;
    use std::sync::Arc;

    #[test]
    fn declarations_name_their_owner() {
        let source = "package p; class A { int n; A(int x) {} void run(String s, int[] v) { int local = 1; } }";
        let unit = lower(std::path::Path::new("/r/p/A.java"), Arc::from(source), ContainerMask::ALL).unwrap();
        let factory = DefaultHandleFactory;
        let handles: Vec<ElementHandle> = unit.ids().filter_map(|id| factory.declared(&unit, id)).collect();
        let names: Vec<String> = handles.iter().map(|h| h.to_string()).collect();
        assert!(names.contains(&"p".to_string()));
        assert!(names.contains(&"p.A".to_string()));
        assert!(names.contains(&"p.A.n".to_string()));
        assert!(names.contains(&"p.A(int)".to_string()));
        assert!(names.contains(&"p.A.run(String,int[])".to_string()));
        assert!(names.contains(&"p.A.run.local".to_string()));
        assert!(handles.iter().all(|h| h.path.as_deref() == Some(std::path::Path::new("/r/p/A.java"))));
    }

    #[test]
    fn problem_bindings_have_no_handle() {
        let method = crate::binding::MethodBinding {
            selector: "foo".into(),
            declaring_class: "p.A".into(),
            parameters: Vec::new(),
            return_type: None,
            modifiers: crate::modifiers::Modifiers::empty(),
            is_constructor: false,
            is_default_constructor: false,
            type_parameters: Vec::new(),
            declaring_path: None,
            declaration: None,
            problem: Some(crate::binding::MethodProblem::NotFound),
        };
        assert!(DefaultHandleFactory.resolved(&Binding::Method(Arc::new(method.clone()))).is_none());
        let fine = crate::binding::MethodBinding { problem: None, ..method };
        let handle = DefaultHandleFactory.resolved(&Binding::Method(Arc::new(fine))).unwrap();
        assert_eq!(handle.to_string(), "p.A.foo()");
        assert_eq!(handle.kind, ElementKind::Method);
    }
}
