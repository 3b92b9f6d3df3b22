// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-root lookup environment: every type the root declares, plus a small
//! table of well-known library types, keyed by qualified name.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::lower::lower;
use crate::ast::{ContainerMask, NodeId, NodeKind, ParsedUnit};
use crate::binding::{FieldBinding, MethodBinding, TypeBinding, TypeBindingKind};
use crate::modifiers::Modifiers;
use crate::scope::SearchDocument;

pub const OBJECT: &str = "java.lang.Object";

const PRIMITIVES: [&str; 8] = ["boolean", "byte", "char", "short", "int", "long", "float", "double"];

/// (kind, package, name, superclass, interfaces)
const LIBRARY: &[(TypeBindingKind, &str, &str, Option<&str>, &[&str])] = &[
    (TypeBindingKind::Class, "java.lang", "Object", None, &[]),
    (TypeBindingKind::Class, "java.lang", "String", Some(OBJECT), &["java.lang.CharSequence", "java.lang.Comparable"]),
    (TypeBindingKind::Interface, "java.lang", "CharSequence", None, &[]),
    (TypeBindingKind::Interface, "java.lang", "Comparable", None, &[]),
    (TypeBindingKind::Interface, "java.lang", "Runnable", None, &[]),
    (TypeBindingKind::Interface, "java.lang", "Iterable", None, &[]),
    (TypeBindingKind::Interface, "java.lang", "AutoCloseable", None, &[]),
    (TypeBindingKind::Interface, "java.lang", "Cloneable", None, &[]),
    (TypeBindingKind::Class, "java.lang", "Number", Some(OBJECT), &[]),
    (TypeBindingKind::Class, "java.lang", "Integer", Some("java.lang.Number"), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Long", Some("java.lang.Number"), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Short", Some("java.lang.Number"), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Byte", Some("java.lang.Number"), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Double", Some("java.lang.Number"), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Float", Some("java.lang.Number"), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Boolean", Some(OBJECT), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Character", Some(OBJECT), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Class", Some(OBJECT), &[]),
    (TypeBindingKind::Class, "java.lang", "Enum", Some(OBJECT), &["java.lang.Comparable"]),
    (TypeBindingKind::Class, "java.lang", "Record", Some(OBJECT), &[]),
    (TypeBindingKind::Class, "java.lang", "Throwable", Some(OBJECT), &[]),
    (TypeBindingKind::Class, "java.lang", "Exception", Some("java.lang.Throwable"), &[]),
    (TypeBindingKind::Class, "java.lang", "Error", Some("java.lang.Throwable"), &[]),
    (TypeBindingKind::Class, "java.lang", "RuntimeException", Some("java.lang.Exception"), &[]),
    (TypeBindingKind::Class, "java.lang", "StringBuilder", Some(OBJECT), &["java.lang.CharSequence"]),
    (TypeBindingKind::Class, "java.lang", "Thread", Some(OBJECT), &["java.lang.Runnable"]),
    (TypeBindingKind::Class, "java.lang", "System", Some(OBJECT), &[]),
    (TypeBindingKind::Class, "java.lang", "Math", Some(OBJECT), &[]),
    (TypeBindingKind::Annotation, "java.lang", "Override", None, &[]),
    (TypeBindingKind::Annotation, "java.lang", "Deprecated", None, &[]),
    (TypeBindingKind::Annotation, "java.lang", "SuppressWarnings", None, &[]),
    (TypeBindingKind::Annotation, "java.lang", "FunctionalInterface", None, &[]),
    (TypeBindingKind::Interface, "java.util", "Collection", None, &["java.lang.Iterable"]),
    (TypeBindingKind::Interface, "java.util", "List", None, &["java.util.Collection"]),
    (TypeBindingKind::Interface, "java.util", "Set", None, &["java.util.Collection"]),
    (TypeBindingKind::Interface, "java.util", "Map", None, &[]),
    (TypeBindingKind::Class, "java.util", "ArrayList", Some(OBJECT), &["java.util.List"]),
    (TypeBindingKind::Class, "java.util", "HashMap", Some(OBJECT), &["java.util.Map"]),
    (TypeBindingKind::Class, "java.util", "HashSet", Some(OBJECT), &["java.util.Set"]),
];

/// Members a type declares, not inherited ones.
#[derive(Debug, Default, Clone)]
pub struct TypeMembers {
    pub methods: Vec<Arc<MethodBinding>>,
    pub constructors: Vec<Arc<MethodBinding>>,
    pub fields: Vec<Arc<FieldBinding>>,
}

#[derive(Debug, Default)]
pub struct LookupEnvironment {
    types: HashMap<String, Arc<TypeBinding>>,
    members: HashMap<String, TypeMembers>,
    packages: HashSet<String>,
}

impl LookupEnvironment {
    /// Environment holding only the library types.
    pub fn library() -> Self {
        let mut env = Self::default();
        for (kind, package, name, superclass, interfaces) in LIBRARY {
            let mut binding = (*TypeBinding::library(*kind, package, name, *superclass)).clone();
            binding.interfaces = interfaces.iter().map(|i| i.to_string()).collect();
            if *kind == TypeBindingKind::Annotation {
                binding.modifiers = Modifiers::INTERFACE | Modifiers::ANNOTATION;
            }
            env.insert_type(Arc::new(binding));
            env.packages.insert(package.to_string());
        }
        env.object_members();
        env
    }

    /// Build from declaration-only parses of `documents`; unparsable ones are skipped.
    #[tracing::instrument(level = "debug", skip_all, fields(documents = documents.len()))]
    pub fn build(documents: &[SearchDocument]) -> Self {
        let mut env = Self::library();
        let units: Vec<ParsedUnit> = documents
            .iter()
            .filter_map(|document| {
                match lower(
                    &document.path(),
                    Arc::clone(&document.contents),
                    ContainerMask::COMPILATION_UNIT | ContainerMask::CLASS,
                ) {
                    Ok(unit) => Some(unit),
                    Err(abort) => {
                        tracing::debug!(document = %document.name, reason = %abort.reason, "skipped while building environment");
                        None
                    }
                }
            })
            .collect();

        // names first, so headers and signatures can refer to any of them
        let mut declared: Vec<(usize, NodeId)> = Vec::new();
        for (index, unit) in units.iter().enumerate() {
            env.packages.insert(unit.package_name().to_string());
            for id in unit.ids() {
                if let Some(decl) = unit.type_decl(id).filter(|d| !d.local && !d.anonymous) {
                    env.insert_type(TypeBinding::missing(&decl.qualified_name()));
                    declared.push((index, id));
                }
            }
        }
        for &(index, id) in &declared {
            let binding = env.declared_type(&units[index], id);
            env.insert_type(binding);
        }
        for &(index, id) in &declared {
            let unit = &units[index];
            if let Some(decl) = unit.type_decl(id) {
                let key = decl.qualified_name();
                let members = env.collect_members(unit, id, &key);
                env.members.insert(key, members);
            }
        }
        tracing::debug!(types = env.types.len(), "lookup environment ready");
        env
    }

    fn insert_type(&mut self, binding: Arc<TypeBinding>) {
        self.types.insert(binding.key(), binding);
    }

    fn object_members(&mut self) {
        let method = |selector: &str, parameters: Vec<Arc<TypeBinding>>, return_type: Option<Arc<TypeBinding>>| {
            Arc::new(MethodBinding {
                selector: selector.to_string(),
                declaring_class: OBJECT.to_string(),
                parameters,
                return_type,
                modifiers: Modifiers::PUBLIC,
                is_constructor: false,
                is_default_constructor: false,
                type_parameters: Vec::new(),
                declaring_path: None,
                declaration: None,
                problem: None,
            })
        };
        let object = self.types.get(OBJECT).cloned();
        let string = self.types.get("java.lang.String").cloned();
        let class = self.types.get("java.lang.Class").cloned();
        let mut members = TypeMembers::default();
        members.methods.push(method("toString", Vec::new(), string));
        members.methods.push(method("hashCode", Vec::new(), Some(TypeBinding::primitive("int"))));
        members.methods.push(method("getClass", Vec::new(), class));
        if let Some(object) = object {
            members
                .methods
                .push(method("equals", vec![object], Some(TypeBinding::primitive("boolean"))));
        }
        self.members.insert(OBJECT.to_string(), members);
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<Arc<TypeBinding>> {
        self.types.get(qualified_name).cloned()
    }

    pub fn is_package(&self, name: &str) -> bool {
        self.packages.contains(name)
    }

    pub fn members(&self, key: &str) -> Option<&TypeMembers> {
        self.members.get(key)
    }

    pub fn all_types(&self) -> impl Iterator<Item = &Arc<TypeBinding>> {
        self.types.values()
    }

    /// Library types stand in for a classpath the environment does not have.
    pub fn is_library(&self, ty: &TypeBinding) -> bool {
        ty.declaring_path.is_none() && !ty.is_missing() && ty.kind != TypeBindingKind::Primitive
    }

    pub fn super_class(&self, ty: &TypeBinding) -> Option<Arc<TypeBinding>> {
        if ty.element.is_some() {
            return self.lookup(OBJECT);
        }
        let name = ty.superclass.as_deref()?;
        Some(self.lookup(name).unwrap_or_else(|| TypeBinding::missing(name)))
    }

    pub fn super_interfaces(&self, ty: &TypeBinding) -> Vec<Arc<TypeBinding>> {
        ty.interfaces
            .iter()
            .map(|name| self.lookup(name).unwrap_or_else(|| TypeBinding::missing(name)))
            .collect()
    }

    /// Full binding of a source type declaration, headers resolved.
    fn declared_type(&self, unit: &ParsedUnit, id: NodeId) -> Arc<TypeBinding> {
        let Some(decl) = unit.type_decl(id) else {
            return TypeBinding::missing("");
        };
        let kind = match decl.kind {
            crate::ast::TypeKind::Class => TypeBindingKind::Class,
            crate::ast::TypeKind::Interface => TypeBindingKind::Interface,
            crate::ast::TypeKind::Enum => TypeBindingKind::Enum,
            crate::ast::TypeKind::Annotation => TypeBindingKind::Annotation,
            crate::ast::TypeKind::Record => TypeBindingKind::Record,
        };
        let superclass = match (decl.superclass, kind) {
            (Some(reference), _) => Some(self.type_name_of(unit, reference)),
            (None, TypeBindingKind::Class) => Some(OBJECT.to_string()),
            (None, TypeBindingKind::Enum) => Some("java.lang.Enum".to_string()),
            (None, TypeBindingKind::Record) => Some("java.lang.Record".to_string()),
            _ => None,
        };
        let interfaces = decl.interfaces.iter().map(|&i| self.type_name_of(unit, i)).collect();
        Arc::new(TypeBinding {
            kind,
            name: decl.name.clone(),
            qualification: decl.qualification.clone(),
            package: unit.package_name().to_string(),
            modifiers: decl.modifiers,
            superclass,
            interfaces,
            type_parameters: decl.type_parameters.clone(),
            type_arguments: Vec::new(),
            element: None,
            dims: 0,
            declaring_path: Some(unit.path.clone()),
            declaration: Some(decl.name_span),
        })
    }

    /// Erased key of a header type reference, or its written text when unresolved.
    fn type_name_of(&self, unit: &ParsedUnit, reference: NodeId) -> String {
        match self.resolve_type_ref(unit, reference) {
            Some(ty) => ty.key(),
            None => unit
                .kind(reference)
                .type_ref_name()
                .map(|(tokens, _)| tokens.join("."))
                .unwrap_or_default(),
        }
    }

    /// Method, constructor and field bindings declared directly by `type_id`.
    pub fn collect_members(&self, unit: &ParsedUnit, type_id: NodeId, key: &str) -> TypeMembers {
        let mut members = TypeMembers::default();
        let signature_type = |reference: Option<NodeId>| -> Option<Arc<TypeBinding>> {
            let reference = reference?;
            Some(self.resolve_type_ref(unit, reference).unwrap_or_else(|| {
                let written = unit
                    .kind(reference)
                    .type_ref_name()
                    .map(|(tokens, _)| tokens.join("."))
                    .unwrap_or_default();
                TypeBinding::missing(&written)
            }))
        };
        let parameter_types = |parameters: &[NodeId]| -> Vec<Arc<TypeBinding>> {
            parameters
                .iter()
                .map(|&p| match unit.kind(p) {
                    NodeKind::Local(v) => signature_type(v.type_ref).unwrap_or_else(|| TypeBinding::missing(OBJECT)),
                    _ => TypeBinding::missing(OBJECT),
                })
                .collect()
        };
        for member in unit.members(type_id) {
            match unit.kind(member) {
                NodeKind::Method(decl) => members.methods.push(Arc::new(MethodBinding {
                    selector: decl.name.clone(),
                    declaring_class: key.to_string(),
                    parameters: parameter_types(&decl.parameters),
                    return_type: signature_type(decl.return_type),
                    modifiers: decl.modifiers,
                    is_constructor: false,
                    is_default_constructor: false,
                    type_parameters: decl.type_parameters.clone(),
                    declaring_path: Some(unit.path.clone()),
                    declaration: Some(decl.name_span),
                    problem: None,
                })),
                NodeKind::Constructor(decl) => members.constructors.push(Arc::new(MethodBinding {
                    selector: decl.name.clone(),
                    declaring_class: key.to_string(),
                    parameters: parameter_types(&decl.parameters),
                    return_type: None,
                    modifiers: decl.modifiers,
                    is_constructor: true,
                    is_default_constructor: decl.is_default,
                    type_parameters: decl.type_parameters.clone(),
                    declaring_path: Some(unit.path.clone()),
                    declaration: Some(decl.name_span),
                    problem: None,
                })),
                NodeKind::Field(decl) => {
                    let field_type = signature_type(decl.type_ref);
                    members.fields.push(Arc::new(FieldBinding {
                        name: decl.name.clone(),
                        declaring_class: key.to_string(),
                        field_type,
                        modifiers: decl.modifiers,
                        declaring_path: Some(unit.path.clone()),
                        declaration: Some(decl.name_span),
                    }));
                }
                _ => {}
            }
        }
        members
    }

    /// Resolve a `TypeRef` node, including type arguments and dimensions.
    pub fn resolve_type_ref(&self, unit: &ParsedUnit, reference: NodeId) -> Option<Arc<TypeBinding>> {
        let NodeKind::TypeRef {
            tokens,
            type_arguments,
            dims,
            ..
        } = unit.kind(reference)
        else {
            return None;
        };
        let base = self.resolve_name(unit, reference, tokens)?;
        let arguments: Vec<Arc<TypeBinding>> = type_arguments
            .iter()
            .map(|&a| self.resolve_type_ref(unit, a).unwrap_or_else(|| TypeBinding::missing(OBJECT)))
            .collect();
        Some(TypeBinding::array(TypeBinding::parameterized(&base, arguments), *dims))
    }

    /// Resolve a written type name as seen from node `at`.
    ///
    /// Single names go through type variables, enclosing and inherited member
    /// types, single-type imports, the unit's package, on-demand imports,
    /// and `java.lang`. A name none of those see stays unresolved. Unknown
    /// qualified names resolve to a missing binding that keeps the qualification.
    pub fn resolve_name(&self, unit: &ParsedUnit, at: NodeId, tokens: &[String]) -> Option<Arc<TypeBinding>> {
        match tokens {
            [] => None,
            [name] => self.resolve_simple(unit, at, name),
            [first, rest @ ..] => {
                let joined = tokens.join(".");
                if let Some(ty) = self.lookup(&joined) {
                    return Some(ty);
                }
                if let Some(outer) = self.resolve_simple(unit, at, first).filter(|t| !t.is_missing()) {
                    let member = format!("{}.{}", outer.key(), rest.join("."));
                    return Some(self.lookup(&member).unwrap_or_else(|| TypeBinding::missing(&member)));
                }
                Some(TypeBinding::missing(&joined))
            }
        }
    }

    fn resolve_simple(&self, unit: &ParsedUnit, at: NodeId, name: &str) -> Option<Arc<TypeBinding>> {
        if PRIMITIVES.contains(&name) {
            return Some(TypeBinding::primitive(name));
        }
        let scopes = std::iter::once(at).chain(unit.ancestors(at));
        for scope in scopes {
            let type_parameters = match unit.kind(scope) {
                NodeKind::Method(m) => &m.type_parameters,
                NodeKind::Constructor(c) => &c.type_parameters,
                NodeKind::Type(t) => &t.type_parameters,
                _ => continue,
            };
            if type_parameters.iter().any(|p| p == name) {
                return Some(TypeBinding::type_variable(name));
            }
            if let Some(decl) = unit.type_decl(scope).filter(|d| !d.local && !d.anonymous) {
                let own = decl.qualified_name();
                if decl.name == name {
                    return self.lookup(&own);
                }
                if let Some(found) = self.member_type(&own, name) {
                    return Some(found);
                }
            }
        }

        let mut on_demand = Vec::new();
        for &import in &unit.imports {
            let NodeKind::Import {
                tokens,
                on_demand: wildcard,
                is_static,
                ..
            } = unit.kind(import)
            else {
                continue;
            };
            if *wildcard {
                on_demand.push(tokens.join("."));
            } else if !is_static && tokens.last().is_some_and(|last| last == name) {
                let joined = tokens.join(".");
                return Some(self.lookup(&joined).unwrap_or_else(|| TypeBinding::missing(&joined)));
            }
        }

        let package = unit.package_name();
        let in_package = if package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", package, name)
        };
        if let Some(found) = self.lookup(&in_package) {
            return Some(found);
        }
        for prefix in on_demand {
            if let Some(found) = self.lookup(&format!("{}.{}", prefix, name)) {
                return Some(found);
            }
        }
        if let Some(found) = self.lookup(&format!("java.lang.{}", name)) {
            return Some(found);
        }
        None
    }

    /// A member type of `owner` or of one of its supertypes.
    fn member_type(&self, owner: &str, name: &str) -> Option<Arc<TypeBinding>> {
        let mut seen = HashSet::new();
        let mut pending = vec![owner.to_string()];
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(found) = self.lookup(&format!("{}.{}", current, name)) {
                return Some(found);
            }
            if let Some(ty) = self.lookup(&current) {
                pending.extend(ty.superclass.iter().cloned());
                pending.extend(ty.interfaces.iter().cloned());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(files: &[(&str, &str)]) -> LookupEnvironment {
        let documents: Vec<SearchDocument> = files
            .iter()
            .map(|(name, source)| SearchDocument::new("/repo", *name, *source))
            .collect();
        LookupEnvironment::build(&documents)
    }

    #[test]
    fn headers_resolve_across_files() {
        let env = env(&[
            ("com/acme/Base.java", "package com.acme; public class Base { void foo(int x) {} }"),
            (
                "com/acme/Widget.java",
                "package com.acme; import java.util.List; public class Widget extends Base implements Runnable { void foo(int x) {} public void run() {} List<String> items; }",
            ),
        ]);
        let widget = env.lookup("com.acme.Widget").unwrap();
        assert_eq!(widget.superclass.as_deref(), Some("com.acme.Base"));
        assert_eq!(widget.interfaces, vec!["java.lang.Runnable".to_string()]);
        let base = env.super_class(&widget).unwrap();
        assert_eq!(env.super_class(&base).unwrap().key(), OBJECT);

        let members = env.members("com.acme.Widget").unwrap();
        assert_eq!(members.methods.len(), 2);
        assert_eq!(members.methods[0].parameters[0].key(), "int");
        assert_eq!(members.constructors.len(), 1);
        assert!(members.constructors[0].is_default_constructor);
        let items = &members.fields[0];
        let items_type = items.field_type.as_ref().unwrap();
        assert_eq!(items_type.key(), "java.util.List");
        assert_eq!(items_type.display_name(), "List<String>");
    }

    #[test]
    fn nested_and_unknown_types() {
        let env = env(&[(
            "Outer.java",
            "import org.other.Thing; class Outer { static class Inner {} Inner make(Thing t) { return null; } }",
        )]);
        assert!(env.lookup("Outer.Inner").is_some());
        let make = &env.members("Outer").unwrap().methods[0];
        assert_eq!(make.return_type.as_ref().unwrap().key(), "Outer.Inner");
        let thing = &make.parameters[0];
        assert!(thing.is_missing());
        assert_eq!(thing.qualified_name(), "org.other.Thing");
    }

    #[test]
    fn names_outside_every_import_stay_unresolved() {
        let env = env(&[
            ("app/A.java", "package app; class A { List<String> xs; Helper h; }"),
            ("lib/Helper.java", "package lib; public class Helper {}"),
        ]);
        let fields = &env.members("app.A").unwrap().fields;
        for (field, written) in fields.iter().zip(["List", "Helper"]) {
            let ty = field.field_type.as_ref().unwrap();
            assert!(ty.is_missing(), "{}", written);
            assert_eq!(ty.qualified_name(), written);
        }
    }
}
