// SPDX-License-Identifier: MIT OR Apache-2.0

//! Light binder: attaches type, method, field, local and package bindings to
//! the nodes of one unit, and the static type of expressions.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::environment::{LookupEnvironment, TypeMembers, OBJECT};
use crate::ast::{ConstructorCallKind, LiteralKind, NodeId, NodeKind, ParsedUnit, Receiver};
use crate::binding::{
    Binding, FieldBinding, LocalBinding, MethodBinding, MethodProblem, ResolvedUnit, TypeBinding, TypeBindingKind,
};
use crate::modifiers::Modifiers;

pub(crate) struct Binder<'a> {
    env: &'a LookupEnvironment,
    unit: &'a ParsedUnit,
    bindings: HashMap<NodeId, Option<Binding>>,
    types: HashMap<NodeId, Option<Arc<TypeBinding>>>,
    locals_by_name: HashMap<&'a str, Vec<NodeId>>,
    /// Local and anonymous classes of this unit, by node and by key.
    local_types: HashMap<NodeId, Arc<TypeBinding>>,
    local_by_key: HashMap<String, Arc<TypeBinding>>,
    local_members: HashMap<String, TypeMembers>,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(env: &'a LookupEnvironment, unit: &'a ParsedUnit) -> Self {
        let mut locals_by_name: HashMap<&str, Vec<NodeId>> = HashMap::new();
        for id in unit.ids() {
            if let NodeKind::Local(decl) = unit.kind(id) {
                locals_by_name.entry(decl.name.as_str()).or_default().push(id);
            }
        }
        Self {
            env,
            unit,
            bindings: HashMap::new(),
            types: HashMap::new(),
            locals_by_name,
            local_types: HashMap::new(),
            local_by_key: HashMap::new(),
            local_members: HashMap::new(),
        }
    }

    pub(crate) fn bind(mut self) -> ResolvedUnit {
        self.declare_local_types();
        let mut resolved = ResolvedUnit::new();
        for id in self.unit.ids() {
            if let Some(binding) = self.binding_of(id) {
                resolved.set_binding(id, binding);
            }
            if let Some(ty) = self.type_of(id) {
                resolved.set_expression_type(id, ty);
            }
            if let Some(tokens) = self.token_bindings(id) {
                resolved.set_token_bindings(id, tokens);
            }
        }
        resolved
    }

    fn declare_local_types(&mut self) {
        let unit = self.unit;
        for id in unit.ids() {
            let Some(decl) = unit.type_decl(id).filter(|d| d.local || d.anonymous) else {
                continue;
            };
            let outer = unit
                .enclosing_type(id)
                .and_then(|t| self.declared_type(t))
                .map(|t| t.key())
                .unwrap_or_default();
            let qualification = if decl.anonymous {
                format!("{}${}", outer, unit.node(id).span.start)
            } else {
                outer
            };
            let mut superclass = decl
                .superclass
                .and_then(|s| self.resolve_type_ref(s))
                .map(|t| t.key());
            let mut interfaces: Vec<String> = decl
                .interfaces
                .iter()
                .filter_map(|&i| self.resolve_type_ref(i))
                .map(|t| t.key())
                .collect();
            // `new Runnable() {...}` implements the interface and extends Object
            if decl.anonymous {
                if let Some(super_type) = decl.superclass.and_then(|s| self.resolve_type_ref(s)) {
                    if super_type.is_interface() {
                        interfaces.push(super_type.key());
                        superclass = None;
                    }
                }
            }
            if superclass.is_none() && decl.kind == crate::ast::TypeKind::Class {
                superclass = Some(OBJECT.to_string());
            }
            interfaces.dedup();
            let binding = Arc::new(TypeBinding {
                kind: TypeBindingKind::Class,
                name: decl.name.clone(),
                qualification,
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
            });
            let key = binding.key();
            self.local_members
                .insert(key.clone(), self.env.collect_members(unit, id, &key));
            self.local_by_key.insert(key, Arc::clone(&binding));
            self.local_types.insert(id, binding);
        }
    }

    fn lookup(&self, key: &str) -> Option<Arc<TypeBinding>> {
        self.local_by_key.get(key).cloned().or_else(|| self.env.lookup(key))
    }

    fn members(&self, key: &str) -> Option<&TypeMembers> {
        self.local_members.get(key).or_else(|| self.env.members(key))
    }

    fn super_class(&self, ty: &TypeBinding) -> Option<Arc<TypeBinding>> {
        if ty.element.is_some() {
            return self.lookup(OBJECT);
        }
        let name = ty.superclass.as_deref()?;
        Some(self.lookup(name).unwrap_or_else(|| TypeBinding::missing(name)))
    }

    /// `ty`, then its superclass chain, then interfaces, each once.
    fn hierarchy(&self, ty: &Arc<TypeBinding>) -> Vec<Arc<TypeBinding>> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut interfaces = VecDeque::new();
        let mut current = Some(Arc::clone(ty));
        while let Some(class) = current {
            if !seen.insert(class.key()) {
                break;
            }
            interfaces.extend(class.interfaces.iter().cloned());
            current = self.super_class(&class);
            order.push(class);
        }
        while let Some(name) = interfaces.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            let interface = self.lookup(&name).unwrap_or_else(|| TypeBinding::missing(&name));
            interfaces.extend(interface.interfaces.iter().cloned());
            order.push(interface);
        }
        order
    }

    /// Whether every supertype is declared in source (or is `Object`).
    fn hierarchy_known(&self, hierarchy: &[Arc<TypeBinding>]) -> bool {
        hierarchy
            .iter()
            .all(|t| !t.is_missing() && (!self.env.is_library(t) || t.key() == OBJECT))
    }

    fn declared_type(&mut self, type_id: NodeId) -> Option<Arc<TypeBinding>> {
        if let Some(local) = self.local_types.get(&type_id) {
            return Some(Arc::clone(local));
        }
        let decl = self.unit.type_decl(type_id)?;
        self.env.lookup(&decl.qualified_name())
    }

    /// Enclosing type declarations of `id`, innermost first.
    fn enclosing_types(&mut self, id: NodeId) -> Vec<Arc<TypeBinding>> {
        let unit = self.unit;
        unit.ancestors(id)
            .filter(|&a| matches!(unit.kind(a), NodeKind::Type(_)))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|t| self.declared_type(t))
            .collect()
    }

    fn resolve_type_ref(&self, reference: NodeId) -> Option<Arc<TypeBinding>> {
        let NodeKind::TypeRef { tokens, dims, .. } = self.unit.kind(reference) else {
            return None;
        };
        if let [name] = tokens.as_slice() {
            if let Some(local) = self.visible_local_type(reference, name) {
                return Some(TypeBinding::array(local, *dims));
            }
        }
        self.env.resolve_type_ref(self.unit, reference)
    }

    /// A local class declared in a body enclosing `at`.
    fn visible_local_type(&self, at: NodeId, name: &str) -> Option<Arc<TypeBinding>> {
        let unit = self.unit;
        let scopes: HashSet<NodeId> = unit.ancestors(at).collect();
        self.local_types
            .iter()
            .filter(|(&id, ty)| {
                ty.name == name
                    && (scopes.contains(&id) || unit.node(id).parent.is_some_and(|p| scopes.contains(&p)))
            })
            .max_by_key(|(&id, _)| id)
            .map(|(_, ty)| Arc::clone(ty))
    }

    fn binding_of(&mut self, id: NodeId) -> Option<Binding> {
        if let Some(done) = self.bindings.get(&id) {
            return done.clone();
        }
        self.bindings.insert(id, None);
        let binding = self.compute_binding(id);
        self.bindings.insert(id, binding.clone());
        binding
    }

    fn compute_binding(&mut self, id: NodeId) -> Option<Binding> {
        let unit = self.unit;
        match unit.kind(id) {
            NodeKind::Type(_) => self.declared_type(id).map(Binding::Type),
            NodeKind::Method(decl) => {
                let owner = self.declared_type(unit.enclosing_type(id)?)?;
                self.members(&owner.key())?
                    .methods
                    .iter()
                    .find(|m| m.declaration == Some(decl.name_span))
                    .cloned()
                    .map(Binding::Method)
            }
            NodeKind::Constructor(decl) => {
                let owner = self.declared_type(unit.enclosing_type(id)?)?;
                self.members(&owner.key())?
                    .constructors
                    .iter()
                    .find(|m| m.declaration == Some(decl.name_span))
                    .cloned()
                    .map(Binding::Method)
            }
            NodeKind::Field(decl) => {
                let owner = self.declared_type(unit.enclosing_type(id)?)?;
                self.members(&owner.key())?
                    .fields
                    .iter()
                    .find(|f| f.declaration == Some(decl.name_span))
                    .cloned()
                    .map(Binding::Field)
            }
            NodeKind::Local(decl) => {
                let local_type = match decl.type_ref {
                    Some(reference) => self.type_of(reference),
                    None => unit
                        .children(id)
                        .find(|&c| !matches!(unit.kind(c), NodeKind::TypeRef { .. }))
                        .and_then(|initializer| self.type_of(initializer)),
                };
                Some(Binding::Local(Arc::new(LocalBinding {
                    name: decl.name.clone(),
                    declaration: decl.name_span,
                    local_type,
                    is_argument: decl.is_argument,
                })))
            }
            NodeKind::Package { name, .. } => Some(Binding::Package(name.clone())),
            NodeKind::Import {
                tokens,
                on_demand,
                is_static,
                ..
            } => {
                let joined = tokens.join(".");
                if let Some(ty) = self.env.lookup(&joined) {
                    return Some(Binding::Type(ty));
                }
                if *on_demand {
                    return Some(Binding::Package(joined));
                }
                if *is_static {
                    let owner = tokens[..tokens.len().saturating_sub(1)].join(".");
                    return self.env.lookup(&owner).map(Binding::Type);
                }
                Some(Binding::Type(TypeBinding::missing(&joined)))
            }
            NodeKind::TypeRef { .. } => self.resolve_type_ref(id).map(Binding::Type),
            NodeKind::MessageSend {
                selector,
                receiver,
                arguments,
                ..
            } => self.resolve_send(id, selector, *receiver, arguments).map(Binding::Method),
            NodeKind::Allocation {
                type_ref, arguments, ..
            } => {
                let ty = self.resolve_type_ref(*type_ref)?;
                let target = if ty.is_interface() { self.lookup(OBJECT)? } else { ty };
                self.find_constructor(&target, arguments).map(Binding::Method)
            }
            NodeKind::ExplicitConstructorCall { kind, arguments } => {
                let owner = self.declared_type(unit.enclosing_type(id)?)?;
                let target = match kind {
                    ConstructorCallKind::This => owner,
                    ConstructorCallKind::Super | ConstructorCallKind::ImplicitSuper => self.super_class(&owner)?,
                };
                self.find_constructor(&target, arguments).map(Binding::Method)
            }
            NodeKind::FieldAccess { receiver, name, .. } => {
                let ty = self.type_of(*receiver)?;
                self.find_field(&ty, name).map(Binding::Field)
            }
            NodeKind::NameRef { name } => self.resolve_simple_name(id, name),
            NodeKind::QualifiedNameRef { .. } => self.qualified_tokens(id).pop().flatten(),
            _ => None,
        }
    }

    fn type_of(&mut self, id: NodeId) -> Option<Arc<TypeBinding>> {
        if let Some(done) = self.types.get(&id) {
            return done.clone();
        }
        self.types.insert(id, None);
        let ty = self.compute_type(id);
        self.types.insert(id, ty.clone());
        ty
    }

    fn compute_type(&mut self, id: NodeId) -> Option<Arc<TypeBinding>> {
        let unit = self.unit;
        match unit.kind(id) {
            NodeKind::Literal(kind) => match kind {
                LiteralKind::Int => Some(TypeBinding::primitive("int")),
                LiteralKind::Long => Some(TypeBinding::primitive("long")),
                LiteralKind::Float => Some(TypeBinding::primitive("float")),
                LiteralKind::Double => Some(TypeBinding::primitive("double")),
                LiteralKind::Char => Some(TypeBinding::primitive("char")),
                LiteralKind::Boolean => Some(TypeBinding::primitive("boolean")),
                LiteralKind::String => self.env.lookup("java.lang.String"),
                LiteralKind::Class => self.env.lookup("java.lang.Class"),
                LiteralKind::Null => None,
            },
            NodeKind::This => self.enclosing_types(id).into_iter().next(),
            NodeKind::Super => {
                let owner = self.enclosing_types(id).into_iter().next()?;
                self.super_class(&owner)
            }
            NodeKind::TypeRef { .. } => self.resolve_type_ref(id),
            NodeKind::NameRef { .. } | NodeKind::QualifiedNameRef { .. } | NodeKind::FieldAccess { .. } => {
                match self.binding_of(id)? {
                    Binding::Local(local) => local.local_type.clone(),
                    Binding::Field(field) => field.field_type.clone(),
                    Binding::Type(ty) => Some(ty),
                    _ => None,
                }
            }
            NodeKind::MessageSend { receiver, .. } => {
                let receiver = *receiver;
                let method = self.binding_of(id)?.as_method().cloned()?;
                if method.is_problem() {
                    return None;
                }
                let returned = method.return_type.clone()?;
                if !returned.is_type_variable() {
                    return Some(returned);
                }
                // `List<String>.get()` yields `String`
                let Receiver::Expression(receiver) = receiver else {
                    return None;
                };
                let receiver_type = self.type_of(receiver)?;
                let generic = self.lookup(&method.declaring_class)?;
                let index = generic.type_parameters.iter().position(|p| *p == returned.name)?;
                receiver_type.type_arguments.get(index).cloned()
            }
            NodeKind::Allocation { type_ref, .. } => self.resolve_type_ref(*type_ref),
            NodeKind::Cast { type_ref, .. } => self.resolve_type_ref(*type_ref),
            NodeKind::ArrayAccess { array } => {
                let array = self.type_of(*array)?;
                let element = array.element.clone()?;
                Some(TypeBinding::array(element, array.dims.saturating_sub(1)))
            }
            NodeKind::Assignment { left, .. } => self.type_of(*left),
            _ => None,
        }
    }

    /// Fields of `ty` and its supertypes, nearest first.
    fn find_field(&self, ty: &Arc<TypeBinding>, name: &str) -> Option<Arc<FieldBinding>> {
        self.hierarchy(ty).iter().find_map(|t| {
            self.members(&t.key())?
                .fields
                .iter()
                .find(|f| f.name == name)
                .cloned()
        })
    }

    fn problem(selector: &str, declaring_class: String, is_constructor: bool, problem: MethodProblem) -> Arc<MethodBinding> {
        Arc::new(MethodBinding {
            selector: selector.to_string(),
            declaring_class,
            parameters: Vec::new(),
            return_type: None,
            modifiers: Modifiers::empty(),
            is_constructor,
            is_default_constructor: false,
            type_parameters: Vec::new(),
            declaring_path: None,
            declaration: None,
            problem: Some(problem),
        })
    }

    /// How many argument types equal the parameter types; ties keep the nearest declaration.
    fn pick(&mut self, candidates: Vec<Arc<MethodBinding>>, arguments: &[NodeId]) -> Option<Arc<MethodBinding>> {
        let argument_types: Vec<Option<String>> = arguments.iter().map(|&a| self.type_of(a).map(|t| t.key())).collect();
        let mut best: Option<(usize, Arc<MethodBinding>)> = None;
        for candidate in candidates {
            let score = candidate
                .parameters
                .iter()
                .zip(&argument_types)
                .filter(|(p, a)| a.as_deref() == Some(p.key().as_str()))
                .count();
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, candidate));
            }
        }
        best.map(|(_, method)| method)
    }

    fn find_method(&mut self, ty: &Arc<TypeBinding>, selector: &str, arguments: &[NodeId]) -> Option<Arc<MethodBinding>> {
        let hierarchy = self.hierarchy(ty);
        let mut candidates = Vec::new();
        let mut other_arity = false;
        for t in &hierarchy {
            let Some(members) = self.members(&t.key()) else {
                continue;
            };
            for method in members.methods.iter().filter(|m| m.selector == selector) {
                if method.parameters.len() == arguments.len() {
                    candidates.push(Arc::clone(method));
                } else {
                    other_arity = true;
                }
            }
        }
        if !candidates.is_empty() {
            return self.pick(candidates, arguments);
        }
        if !self.hierarchy_known(&hierarchy) {
            return None;
        }
        let problem = if other_arity {
            MethodProblem::ArityMismatch
        } else {
            MethodProblem::NotFound
        };
        Some(Self::problem(selector, ty.key(), false, problem))
    }

    fn declares_selector(&self, ty: &Arc<TypeBinding>, selector: &str) -> bool {
        self.hierarchy(ty).iter().any(|t| {
            self.members(&t.key())
                .is_some_and(|m| m.methods.iter().any(|method| method.selector == selector))
        })
    }

    fn resolve_send(
        &mut self,
        id: NodeId,
        selector: &str,
        receiver: Receiver,
        arguments: &[NodeId],
    ) -> Option<Arc<MethodBinding>> {
        match receiver {
            Receiver::Expression(expression) => {
                let ty = self.type_of(expression)?;
                self.find_method(&ty, selector, arguments)
            }
            Receiver::Super => {
                let owner = self.enclosing_types(id).into_iter().next()?;
                let superclass = self.super_class(&owner)?;
                self.find_method(&superclass, selector, arguments)
            }
            Receiver::Implicit => {
                let enclosing = self.enclosing_types(id);
                let owner = enclosing
                    .iter()
                    .find(|t| self.declares_selector(t, selector))
                    .or_else(|| enclosing.first())
                    .cloned()?;
                self.find_method(&owner, selector, arguments)
            }
        }
    }

    fn find_constructor(&mut self, ty: &Arc<TypeBinding>, arguments: &[NodeId]) -> Option<Arc<MethodBinding>> {
        let constructors = self.members(&ty.key())?.constructors.clone();
        if constructors.is_empty() {
            return None;
        }
        let candidates: Vec<Arc<MethodBinding>> = constructors
            .into_iter()
            .filter(|c| c.parameters.len() == arguments.len())
            .collect();
        if candidates.is_empty() {
            return Some(Self::problem(&ty.name, ty.key(), true, MethodProblem::ArityMismatch));
        }
        self.pick(candidates, arguments)
    }

    /// Locals, then fields of enclosing types, then types.
    fn resolve_simple_name(&mut self, id: NodeId, name: &str) -> Option<Binding> {
        let unit = self.unit;
        let at = unit.node(id).span.start;
        let local = self.locals_by_name.get(name).and_then(|candidates| {
            candidates
                .iter()
                .copied()
                .filter(|&l| match unit.kind(l) {
                    NodeKind::Local(decl) => decl.scope.contains(at) && decl.name_span.start <= at,
                    _ => false,
                })
                .max_by_key(|&l| match unit.kind(l) {
                    NodeKind::Local(decl) => decl.name_span.start,
                    _ => 0,
                })
        });
        if let Some(local) = local {
            return self.binding_of(local);
        }
        for owner in self.enclosing_types(id) {
            if let Some(field) = self.find_field(&owner, name) {
                return Some(Binding::Field(field));
            }
        }
        if let Some(ty) = self.visible_local_type(id, name) {
            return Some(Binding::Type(ty));
        }
        self.env
            .resolve_name(unit, id, &[name.to_string()])
            .map(Binding::Type)
    }

    /// Bindings of each segment of `a.b.c`; unresolvable segments end the chain.
    fn qualified_tokens(&mut self, id: NodeId) -> Vec<Option<Binding>> {
        let unit = self.unit;
        let NodeKind::QualifiedNameRef { tokens, .. } = unit.kind(id) else {
            return Vec::new();
        };
        let mut bindings: Vec<Option<Binding>> = Vec::with_capacity(tokens.len());
        let first = self
            .resolve_simple_name(id, &tokens[0])
            .unwrap_or_else(|| Binding::Package(tokens[0].clone()));
        bindings.push(Some(first));
        for token in &tokens[1..] {
            let next = match bindings.last().cloned().flatten() {
                Some(Binding::Package(package)) => {
                    let name = format!("{}.{}", package, token);
                    Some(match self.env.lookup(&name) {
                        Some(ty) => Binding::Type(ty),
                        None => Binding::Package(name),
                    })
                }
                Some(Binding::Type(ty)) => {
                    let member = format!("{}.{}", ty.key(), token);
                    match self.lookup(&member) {
                        Some(inner) => Some(Binding::Type(inner)),
                        None => self.find_field(&ty, token).map(Binding::Field),
                    }
                }
                Some(Binding::Local(local)) => local
                    .local_type
                    .as_ref()
                    .and_then(|t| self.find_field(t, token))
                    .map(Binding::Field),
                Some(Binding::Field(field)) => field
                    .field_type
                    .as_ref()
                    .and_then(|t| self.find_field(t, token))
                    .map(Binding::Field),
                _ => None,
            };
            bindings.push(next);
        }
        bindings
    }

    fn token_bindings(&mut self, id: NodeId) -> Option<Vec<Option<Binding>>> {
        let unit = self.unit;
        let prefixes = |tokens: &[String], last: Option<Binding>, env: &LookupEnvironment| {
            let mut bindings: Vec<Option<Binding>> = (1..tokens.len())
                .map(|n| {
                    let prefix = tokens[..n].join(".");
                    Some(match env.lookup(&prefix) {
                        Some(ty) => Binding::Type(ty),
                        None => Binding::Package(prefix),
                    })
                })
                .collect();
            bindings.push(last);
            bindings
        };
        match unit.kind(id) {
            NodeKind::QualifiedNameRef { .. } => Some(self.qualified_tokens(id)),
            NodeKind::TypeRef { tokens, .. } | NodeKind::Import { tokens, .. } if tokens.len() > 1 => {
                let last = self.binding_of(id);
                Some(prefixes(tokens, last, self.env))
            }
            NodeKind::Package { name, .. } if name.contains('.') => {
                let tokens: Vec<String> = name.split('.').map(str::to_string).collect();
                Some(prefixes(&tokens, Some(Binding::Package(name.clone())), self.env))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ContainerMask;
    use crate::java::lower::lower;
    use crate::scope::SearchDocument;
    use std::path::Path;

    const BASE: &str = "package p; public class Base { void foo(int x) {} int size; }";
    const WIDGET: &str = r#"package p;
public class Widget extends Base {
    Widget next;
    void foo(int x) {}
    void use(Base b) {
        Widget w = new Widget();
        w.foo(1);
        b.foo(2);
        foo(3);
        w.foo();
        int n = w.next.size;
        var again = w;
        again.foo(4);
    }
}
"#;

    fn bind(source: &str) -> (ParsedUnit, ResolvedUnit) {
        let documents = vec![
            SearchDocument::new("/r", "p/Base.java", BASE),
            SearchDocument::new("/r", "p/Widget.java", source),
        ];
        let env = LookupEnvironment::build(&documents);
        let unit = lower(Path::new("/r/p/Widget.java"), Arc::from(source), ContainerMask::ALL).unwrap();
        let resolved = Binder::new(&env, &unit).bind();
        (unit, resolved)
    }

    fn sends<'u>(unit: &'u ParsedUnit, selector: &'u str) -> impl Iterator<Item = NodeId> + 'u {
        unit.ids()
            .filter(move |&id| matches!(unit.kind(id), NodeKind::MessageSend { selector: s, .. } if s == selector))
    }

    #[test]
    fn message_sends_bind_through_the_receiver_type() {
        let (unit, resolved) = bind(WIDGET);
        let declaring: Vec<Option<(String, Option<MethodProblem>)>> = sends(&unit, "foo")
            .map(|id| {
                resolved
                    .binding(id)
                    .and_then(Binding::as_method)
                    .map(|m| (m.declaring_class.clone(), m.problem))
            })
            .collect();
        assert_eq!(
            declaring,
            vec![
                Some(("p.Widget".to_string(), None)),
                Some(("p.Base".to_string(), None)),
                Some(("p.Widget".to_string(), None)),
                Some(("p.Widget".to_string(), Some(MethodProblem::ArityMismatch))),
                Some(("p.Widget".to_string(), None)),
            ]
        );
    }

    #[test]
    fn qualified_names_bind_each_segment() {
        let (unit, resolved) = bind(WIDGET);
        let chain = unit
            .ids()
            .find(|&id| matches!(unit.kind(id), NodeKind::QualifiedNameRef { tokens, .. } if tokens.len() == 3))
            .unwrap();
        assert!(matches!(resolved.token_binding(chain, 0), Some(Binding::Local(_))));
        assert!(matches!(resolved.token_binding(chain, 1), Some(Binding::Field(f)) if f.name == "next"));
        assert!(matches!(resolved.token_binding(chain, 2), Some(Binding::Field(f)) if f.declaring_class == "p.Base"));
        assert_eq!(resolved.expression_type(chain).map(|t| t.key()), Some("int".to_string()));
    }

    #[test]
    fn declarations_bind_to_environment_members() {
        let (unit, resolved) = bind(WIDGET);
        let foo = unit
            .ids()
            .find(|&id| matches!(unit.kind(id), NodeKind::Method(m) if m.name == "foo"))
            .unwrap();
        let method = resolved.binding(foo).and_then(Binding::as_method).unwrap();
        assert_eq!(method.declaring_class, "p.Widget");
        let default_ctor = unit
            .ids()
            .find(|&id| matches!(unit.kind(id), NodeKind::ExplicitConstructorCall { .. }))
            .unwrap();
        let called = resolved.binding(default_ctor).and_then(Binding::as_method).unwrap();
        assert!(called.is_default_constructor);
        assert_eq!(called.declaring_class, "p.Base");
    }
}
