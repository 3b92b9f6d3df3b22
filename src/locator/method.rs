// SPDX-License-Identifier: MIT OR Apache-2.0

//! Method declarations and message sends.

use std::collections::HashSet;
use std::sync::Arc;

use crate::ast::{ContainerMask, MethodDecl, NodeId, NodeKind, ParsedUnit, Receiver, Span};
use crate::binding::{Binding, MethodBinding, MethodProblem, TypeBinding};
use crate::level::{Level, MatchFlavor};
use crate::pattern::name::match_name_value;
use crate::pattern::{MatchRule, MethodPattern, TypeName};

use super::{
    parameters_level, parameters_match, qualification_matches, syntactic, type_level, type_rule, written_type,
    Candidate, ResolveContext,
};

#[derive(Debug, Clone)]
pub struct MethodLocator {
    pub(super) pattern: MethodPattern,
}

/// Where a method binding was met.
#[derive(Debug, Clone, Copy)]
enum Site {
    Declaration(NodeId),
    Call { send: NodeId, receiver: Receiver },
}

impl MethodLocator {
    pub fn new(pattern: MethodPattern) -> Self {
        Self { pattern }
    }

    pub fn containers(&self) -> ContainerMask {
        if self.pattern.directions.references {
            ContainerMask::ALL
        } else {
            ContainerMask::COMPILATION_UNIT | ContainerMask::CLASS
        }
    }

    pub fn candidates(&self, unit: &ParsedUnit, id: NodeId, ctx: Option<&ResolveContext<'_>>) -> Vec<Candidate> {
        let directions = self.pattern.directions;
        let node = unit.node(id);
        let candidate = match &node.kind {
            NodeKind::Method(decl) if directions.declarations => self.declaration(unit, id, decl, ctx),
            NodeKind::MessageSend {
                selector,
                selector_span,
                receiver,
                arguments,
                has_type_arguments,
            } if directions.references => {
                let span = Span::new(selector_span.start, node.span.end.max(selector_span.end));
                self.send(id, selector, span, *receiver, arguments.len(), *has_type_arguments, ctx)
            }
            _ => None,
        };
        candidate.into_iter().collect()
    }

    fn declaration(
        &self,
        unit: &ParsedUnit,
        id: NodeId,
        decl: &MethodDecl,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let pattern = &self.pattern;
        let name = match_name_value(pattern.selector.as_ref(), &decl.name, pattern.rule);
        if name.is_impossible() {
            return None;
        }
        if let Some(ctx) = ctx {
            let level = match ctx.binding(id) {
                Some(Binding::Method(m)) => self.method_level(ctx, m, Site::Declaration(id)),
                _ => Level::INACCURATE,
            };
            return Some(Candidate::new(decl.name_span, level).declaration());
        }

        if let Some(parameters) = &pattern.parameters {
            if !parameters_match(unit, parameters, &decl.parameters) {
                return None;
            }
        }
        let trule = type_rule(pattern.rule);
        if let Some(simple) = &pattern.return_type.simple_name {
            let written = match decl.return_type {
                Some(r) => written_type(unit, r).map(|(name, _)| name),
                None => Some("void".to_string()),
            };
            if written.is_some_and(|w| !crate::pattern::name::matches_name(Some(simple), &w, trule)) {
                return None;
            }
        }
        if pattern.declaring.is_specified() {
            let owner = unit.enclosing_type(id).and_then(|t| unit.type_decl(t));
            if let Some(owner) = owner.filter(|o| !o.local && !o.anonymous) {
                if !pattern.declaring.matches_simple_name(&owner.name, trule)
                    || !qualification_matches(
                        pattern.declaring.qualification.as_ref(),
                        &owner.qualification,
                        unit.package_name(),
                        trule,
                    )
                {
                    return None;
                }
            }
        }
        let generic = !decl.type_parameters.is_empty() || self.has_parameterized_types();
        Some(
            Candidate::new(decl.name_span, syntactic(name, pattern.must_resolve))
                .declaration()
                .forcing(generic),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn send(
        &self,
        id: NodeId,
        selector: &str,
        span: Span,
        receiver: Receiver,
        argument_count: usize,
        has_type_arguments: bool,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let pattern = &self.pattern;
        let name = match_name_value(pattern.selector.as_ref(), selector, pattern.rule);
        if name.is_impossible() {
            return None;
        }
        if pattern.parameter_count().is_some_and(|n| n != argument_count) {
            return None;
        }
        let Some(ctx) = ctx else {
            let generic = has_type_arguments || self.has_parameterized_types();
            return Some(Candidate::new(span, syntactic(name, pattern.must_resolve)).forcing(generic));
        };
        let level = match ctx.binding(id) {
            Some(Binding::Method(m)) => match m.problem {
                Some(MethodProblem::ArityMismatch) => Level::IMPOSSIBLE,
                Some(MethodProblem::NotFound) => Level::INACCURATE,
                None => self.method_level(ctx, m, Site::Call { send: id, receiver }),
            },
            _ => Level::INACCURATE,
        };
        Some(Candidate::new(span, level))
    }

    fn has_parameterized_types(&self) -> bool {
        self.pattern.return_type.is_parameterized()
            || self
                .pattern
                .parameters
                .as_ref()
                .is_some_and(|params| params.iter().any(TypeName::is_parameterized))
    }

    /// Grade a resolved method. Parameter and return types can only lower
    /// the level reached by the declaring type.
    fn method_level(&self, ctx: &ResolveContext<'_>, method: &MethodBinding, site: Site) -> Level {
        let pattern = &self.pattern;
        let name = match_name_value(pattern.selector.as_ref(), &method.selector, pattern.rule);
        if name.is_impossible() {
            return Level::IMPOSSIBLE;
        }
        if pattern.parameter_count().is_some_and(|n| n != method.parameters.len()) {
            return Level::IMPOSSIBLE;
        }
        let mut level = match site {
            Site::Declaration(id) => self.declared_on(ctx, id),
            Site::Call { send, receiver } => self.invoked_on(ctx, method, send, receiver),
        };
        if let Some(parameters) = &pattern.parameters {
            level = level.weaker(parameters_level(parameters, &method.parameters));
        }
        if pattern.return_type.is_specified() {
            let trule = type_rule(pattern.rule);
            let returned = match &method.return_type {
                Some(ty) => type_level(&pattern.return_type, Some(ty), trule),
                None => void_level(&pattern.return_type, trule),
            };
            level = level.weaker(returned);
        }
        if level.is_impossible() {
            return Level::IMPOSSIBLE;
        }
        level.with_flavor(name.flavor)
    }

    /// Declarations match their own type only.
    fn declared_on(&self, ctx: &ResolveContext<'_>, id: NodeId) -> Level {
        let declaring = &self.pattern.declaring;
        if !declaring.is_specified() {
            return Level::ACCURATE;
        }
        match ctx.enclosing_type(id) {
            Some(owner) => type_level(declaring, Some(&owner), type_rule(self.pattern.rule)),
            None => Level::INACCURATE,
        }
    }

    /// A call matches when the method it binds to can be the searched one at run time.
    fn invoked_on(&self, ctx: &ResolveContext<'_>, method: &MethodBinding, send: NodeId, receiver: Receiver) -> Level {
        let pattern = &self.pattern.declaring;
        let via_super = if receiver == Receiver::Super {
            MatchFlavor::SUPER_INVOCATION
        } else {
            MatchFlavor::empty()
        };
        if !pattern.is_specified() {
            return Level::ACCURATE.with_flavor(via_super);
        }
        let trule = type_rule(self.pattern.rule);
        let declaring = ctx.type_or_missing(&method.declaring_class);
        let exact = type_level(pattern, Some(&declaring), trule);
        if declaring.is_missing() {
            return exact.with_flavor(via_super);
        }
        let receiver_type = ctx.receiver_type(send, receiver);

        if exact.is_accurate() {
            let mut level = Level::ACCURATE.with_flavor(via_super);
            let typed_exactly = receiver_type.as_ref().is_some_and(|r| r.key() == declaring.key());
            if typed_exactly && overrides_super(ctx, &declaring, method) {
                level = level.with_flavor(MatchFlavor::OVERRIDDEN_METHOD);
            }
            return level;
        }
        if method.is_static() || method.is_private() {
            return Level::IMPOSSIBLE;
        }

        let named = ctx.types_named(pattern, trule);
        if let Some(receiver_type) = &receiver_type {
            if receiver_type.is_interface() && named.iter().any(|t| ctx.compiler.is_subtype_of(t, receiver_type)) {
                return Level::INACCURATE.with_flavor(MatchFlavor::POLYMORPHIC | via_super);
            }
            if named.iter().any(|t| ctx.compiler.is_subtype_of(receiver_type, t)) {
                return Level::ACCURATE.with_flavor(MatchFlavor::SUB_INVOCATION | via_super);
            }
        }
        if named.iter().any(|t| ctx.compiler.is_subtype_of(t, &declaring)) {
            return if declaring.is_interface() {
                Level::INACCURATE.with_flavor(MatchFlavor::POLYMORPHIC | via_super)
            } else {
                Level::ACCURATE.with_flavor(MatchFlavor::SUB_INVOCATION | via_super)
            };
        }
        Level::IMPOSSIBLE
    }
}

fn void_level(pattern: &TypeName, rule: MatchRule) -> Level {
    if pattern.qualification.is_none() && pattern.matches_simple_name("void", rule) {
        Level::ACCURATE
    } else {
        Level::IMPOSSIBLE
    }
}

/// Whether some supertype of `declaring` declares a method with the same signature.
fn overrides_super(ctx: &ResolveContext<'_>, declaring: &TypeBinding, method: &MethodBinding) -> bool {
    let compiler = ctx.compiler;
    let mut pending: Vec<Arc<TypeBinding>> = compiler.super_class(declaring).into_iter().collect();
    pending.extend(compiler.super_interfaces(declaring));
    let mut seen = HashSet::new();
    while let Some(ty) = pending.pop() {
        if ty.is_missing() || !seen.insert(ty.key()) {
            continue;
        }
        if compiler.declared_methods(&ty).iter().any(|m| m.has_signature_of(method)) {
            return true;
        }
        pending.extend(compiler.super_class(&ty));
        pending.extend(compiler.super_interfaces(&ty));
    }
    false
}
