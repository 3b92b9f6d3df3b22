// SPDX-License-Identifier: MIT OR Apache-2.0

//! Constructor declarations, allocations and `this(...)` / `super(...)` calls.

use std::sync::Arc;

use crate::ast::{
    ConstructorCallKind, ConstructorDecl, ContainerMask, NodeFlags, NodeId, NodeKind, ParsedUnit, Span, TypeDecl,
};
use crate::binding::{Binding, MethodBinding, MethodProblem, TypeBinding};
use crate::level::Level;
use crate::pattern::name::match_name_value;
use crate::pattern::{matches_qualification, ConstructorPattern, TypeName};

use super::{
    parameters_level, parameters_match, qualification_matches, syntactic, type_level, type_rule, written_type,
    Candidate, ResolveContext,
};

#[derive(Debug, Clone)]
pub struct ConstructorLocator {
    pub(super) pattern: ConstructorPattern,
}

impl ConstructorLocator {
    pub fn new(pattern: ConstructorPattern) -> Self {
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
            NodeKind::Constructor(decl) => self.constructor(unit, id, decl, ctx),
            NodeKind::Allocation {
                type_ref, arguments, ..
            } if directions.references => self.allocation(unit, id, *type_ref, arguments.len(), node.span, ctx),
            NodeKind::ExplicitConstructorCall { kind, arguments }
                if directions.references && !node.flags.contains(NodeFlags::IMPLICIT) =>
            {
                self.call(unit, id, *kind, arguments.len(), node.span, ctx)
            }
            _ => None,
        };
        candidate.into_iter().collect()
    }

    /// A declaration is both itself and, through an implicit `super()`, a
    /// reference to the superclass constructor. The stronger reading wins.
    fn constructor(
        &self,
        unit: &ParsedUnit,
        id: NodeId,
        decl: &ConstructorDecl,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let directions = self.pattern.directions;
        let declared = if directions.declarations && !decl.is_default {
            self.declaration(unit, id, decl, ctx)
        } else {
            None
        };
        let implicit_call = decl
            .constructor_call
            .filter(|&call| unit.node(call).flags.contains(NodeFlags::IMPLICIT));
        let referenced = match implicit_call {
            Some(call) if directions.references => {
                self.call(unit, call, ConstructorCallKind::ImplicitSuper, 0, decl.name_span, ctx)
            }
            _ => None,
        };
        match (declared, referenced) {
            (Some(d), Some(r)) if r.level.level > d.level.level => Some(r),
            (Some(d), Some(r)) => Some(Candidate {
                level: d.level.stronger(r.level),
                force_resolve: d.force_resolve || r.force_resolve,
                ..d
            }),
            (declared, referenced) => declared.or(referenced),
        }
    }

    fn declaration(
        &self,
        unit: &ParsedUnit,
        id: NodeId,
        decl: &ConstructorDecl,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let pattern = &self.pattern;
        let name = match_name_value(pattern.declaring.simple_name.as_ref(), &decl.name, pattern.rule);
        if name.is_impossible() {
            return None;
        }
        if let Some(ctx) = ctx {
            let level = match (ctx.binding(id), ctx.enclosing_type(id)) {
                (Some(Binding::Method(m)), Some(owner)) => self.constructor_level(m, &owner),
                _ => Level::INACCURATE,
            };
            return Some(Candidate::new(decl.name_span, level.with_flavor(name.flavor)).declaration());
        }
        if let Some(parameters) = &pattern.parameters {
            if !parameters_match(unit, parameters, &decl.parameters) {
                return None;
            }
        }
        if let Some(owner) = unit.enclosing_type(id).and_then(|t| unit.type_decl(t)) {
            if !owner.local
                && !qualification_matches(
                    pattern.declaring.qualification.as_ref(),
                    &owner.qualification,
                    unit.package_name(),
                    type_rule(pattern.rule),
                )
            {
                return None;
            }
        }
        Some(
            Candidate::new(decl.name_span, syntactic(name, pattern.must_resolve))
                .declaration()
                .forcing(self.has_parameterized_types() || !decl.type_parameters.is_empty()),
        )
    }

    fn allocation(
        &self,
        unit: &ParsedUnit,
        id: NodeId,
        type_ref: NodeId,
        argument_count: usize,
        span: Span,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let (simple, qualification) = written_type(unit, type_ref)?;
        let generic = matches!(unit.kind(type_ref), NodeKind::TypeRef { type_arguments, .. } if !type_arguments.is_empty());
        self.reference(id, &simple, &qualification, argument_count, span, generic, ctx)
    }

    fn call(
        &self,
        unit: &ParsedUnit,
        id: NodeId,
        kind: ConstructorCallKind,
        argument_count: usize,
        span: Span,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let owner = unit.enclosing_type(id).and_then(|t| unit.type_decl(t))?;
        let (simple, qualification) = match kind {
            ConstructorCallKind::This => (owner.name.clone(), owner.qualification.clone()),
            ConstructorCallKind::Super | ConstructorCallKind::ImplicitSuper => superclass_name(unit, owner),
        };
        self.reference(id, &simple, &qualification, argument_count, span, false, ctx)
    }

    #[allow(clippy::too_many_arguments)]
    fn reference(
        &self,
        id: NodeId,
        simple: &str,
        qualification: &str,
        argument_count: usize,
        span: Span,
        generic: bool,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let pattern = &self.pattern;
        let name = match_name_value(pattern.declaring.simple_name.as_ref(), simple, pattern.rule);
        if name.is_impossible() {
            return None;
        }
        if pattern.parameter_count().is_some_and(|n| n != argument_count) {
            return None;
        }
        let Some(ctx) = ctx else {
            if !qualification.is_empty()
                && !matches_qualification(pattern.declaring.qualification.as_ref(), qualification, type_rule(pattern.rule))
            {
                return None;
            }
            let generic = generic || self.has_parameterized_types();
            return Some(Candidate::new(span, syntactic(name, pattern.must_resolve)).forcing(generic));
        };
        let level = match ctx.binding(id) {
            Some(Binding::Method(m)) => match m.problem {
                Some(MethodProblem::ArityMismatch) => Level::IMPOSSIBLE,
                Some(MethodProblem::NotFound) => Level::INACCURATE,
                None => {
                    let owner = ctx.type_or_missing(&m.declaring_class);
                    self.constructor_level(m, &owner)
                }
            },
            _ => Level::INACCURATE,
        };
        Some(Candidate::new(span, level.with_flavor(name.flavor)))
    }

    /// Constructors are not inherited: the owning type must match exactly.
    fn constructor_level(&self, constructor: &MethodBinding, owner: &Arc<TypeBinding>) -> Level {
        let pattern = &self.pattern;
        if pattern.parameter_count().is_some_and(|n| n != constructor.parameters.len()) {
            return Level::IMPOSSIBLE;
        }
        let mut level = type_level(&pattern.declaring, Some(owner), type_rule(pattern.rule));
        if let Some(parameters) = &pattern.parameters {
            level = level.weaker(parameters_level(parameters, &constructor.parameters));
        }
        level
    }

    fn has_parameterized_types(&self) -> bool {
        self.pattern
            .parameters
            .as_ref()
            .is_some_and(|params| params.iter().any(TypeName::is_parameterized))
    }
}

/// Written superclass of a type, `java.lang.Object` when there is none.
fn superclass_name(unit: &ParsedUnit, owner: &TypeDecl) -> (String, String) {
    owner
        .superclass
        .and_then(|s| written_type(unit, s))
        .unwrap_or_else(|| ("Object".to_string(), "java.lang".to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::Locator;
    use super::*;
    use crate::level::MatchLevel;

    const SOURCE: &str = "package p;
class Base { Base() {} Base(int x) {} }
class Widget extends Base { Widget() { super(); } }
class Gadget extends Base { Gadget(int x) {} }
class Plain extends Base {}
class User { Object o = new Base(); Object q = new Base(1, 2); }
";

    #[test]
    fn every_route_to_a_constructor_is_a_reference() {
        let locator = Locator::new(&ConstructorPattern::builder("Base").references().build().unwrap());
        with_unit("p/Base.java", SOURCE, &[], locator.containers(), |unit, ctx| {
            let matched = matched(&locator, unit);
            // super(), Gadget's implicit super(), Plain's default constructor, two allocations
            assert_eq!(matched.len(), 5);
            let levels: Vec<MatchLevel> = matched
                .iter()
                .map(|(id, _)| locator.resolve_level(ctx, *id).level)
                .collect();
            assert_eq!(
                levels,
                vec![
                    MatchLevel::Accurate,
                    MatchLevel::Accurate,
                    MatchLevel::Accurate,
                    MatchLevel::Accurate,
                    MatchLevel::Impossible
                ]
            );
        });
    }

    #[test]
    fn implicit_super_is_reported_at_the_constructor_name() {
        let locator = Locator::new(&ConstructorPattern::builder("Base").references().build().unwrap());
        with_unit("p/Base.java", SOURCE, &[], locator.containers(), |unit, ctx| {
            let spans: Vec<String> = matched(&locator, unit)
                .iter()
                .flat_map(|(id, _)| locator.occurrences(unit, *id, Some(ctx)))
                .map(|c| text_of(unit, &c))
                .collect();
            assert_eq!(spans.len(), 4);
            assert!(spans[0].starts_with("super()"));
            assert_eq!(spans[1..], ["Gadget", "Plain", "new Base()"]);
        });
    }

    #[test]
    fn declarations_skip_default_constructors() {
        let locator = Locator::new(
            &ConstructorPattern::builder("*")
                .parameter_types(["int"])
                .declarations()
                .build()
                .unwrap(),
        );
        with_unit("p/Base.java", SOURCE, &[], locator.containers(), |unit, _| {
            let names: Vec<String> = matched(&locator, unit)
                .iter()
                .flat_map(|(id, _)| locator.occurrences(unit, *id, None))
                .map(|c| text_of(unit, &c))
                .collect();
            assert_eq!(names, vec!["Base", "Gadget"]);
        });
    }
}
