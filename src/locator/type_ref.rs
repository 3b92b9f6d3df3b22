// SPDX-License-Identifier: MIT OR Apache-2.0

//! Type declarations and type references in any position.

use crate::ast::{ContainerMask, NodeFlags, NodeId, NodeKind, ParsedUnit, Span, TypeDecl};
use crate::binding::Binding;
use crate::level::Level;
use crate::pattern::name::match_name_value;
use crate::pattern::{matches_qualification, MatchRule, TypeName, TypePattern};

use super::{
    qualification_matches, syntactic, type_argument_bits, type_level, written_arguments, Candidate, ResolveContext,
    RuleBits,
};

#[derive(Debug, Clone)]
pub struct TypeLocator {
    pub(super) pattern: TypePattern,
}

impl TypeLocator {
    pub fn new(pattern: TypePattern) -> Self {
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
        match &node.kind {
            NodeKind::Type(decl) if directions.declarations && !decl.anonymous => {
                self.declaration(unit, decl).into_iter().collect()
            }
            _ if !directions.references => Vec::new(),
            NodeKind::TypeRef {
                tokens,
                token_spans,
                type_arguments,
                ..
            } if !node.flags.contains(NodeFlags::IMPLICIT) => self.tokens(
                unit,
                id,
                tokens,
                token_spans,
                tokens.len().checked_sub(1),
                type_arguments,
                ctx,
            ),
            NodeKind::Import {
                tokens,
                token_spans,
                on_demand,
                is_static,
            } => {
                let type_index = match (*on_demand, *is_static) {
                    (true, _) => None,
                    (false, false) => tokens.len().checked_sub(1),
                    (false, true) => tokens.len().checked_sub(2),
                };
                self.tokens(unit, id, tokens, token_spans, type_index, &[], ctx)
            }
            NodeKind::QualifiedNameRef { tokens, token_spans } => {
                self.tokens(unit, id, tokens, token_spans, None, &[], ctx)
            }
            NodeKind::NameRef { name } => self.name_reference(id, name, node.span, ctx).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn declaration(&self, unit: &ParsedUnit, decl: &TypeDecl) -> Option<Candidate> {
        let name = &self.pattern.name;
        let rule = self.pattern.rule;
        let level = match_name_value(name.simple_name.as_ref(), &decl.name, rule);
        if level.is_impossible()
            || !qualification_matches(name.qualification.as_ref(), &decl.qualification, unit.package_name(), rule)
        {
            return None;
        }
        Some(Candidate::new(decl.name_span, syntactic(level, false)).declaration())
    }

    /// Graded tokens of a dotted reference.
    ///
    /// `type_index` is the token that names the referenced type, when the
    /// position tells; every other token is a qualifier that only bindings
    /// can classify.
    #[allow(clippy::too_many_arguments)]
    fn tokens(
        &self,
        unit: &ParsedUnit,
        id: NodeId,
        tokens: &[String],
        spans: &[Span],
        type_index: Option<usize>,
        arguments: &[NodeId],
        ctx: Option<&ResolveContext<'_>>,
    ) -> Vec<Candidate> {
        let name = &self.pattern.name;
        let rule = self.pattern.rule;
        let limit = type_index.map_or(tokens.len(), |i| i + 1);
        let bits = type_argument_bits(name, &written_arguments(unit, arguments));
        let generic = name.is_parameterized() || !arguments.is_empty();

        let mut found = Vec::new();
        for (i, (token, span)) in tokens.iter().zip(spans).enumerate().take(limit) {
            let name_level = match_name_value(name.simple_name.as_ref(), token, rule);
            if name_level.is_impossible() {
                continue;
            }
            let is_type = type_index == Some(i);
            let candidate = match ctx {
                None if is_type => {
                    let written = tokens[..i].join(".");
                    let needs = match &name.qualification {
                        None => false,
                        Some(q) => written.is_empty() || !matches_qualification(Some(q), &written, rule),
                    };
                    Candidate::new(*span, syntactic(name_level, needs)).forcing(needs || generic)
                }
                None => Candidate::new(*span, Level::POSSIBLE.with_flavor(name_level.flavor)).forcing(true),
                Some(ctx) => {
                    let binding = if is_type { ctx.binding(id) } else { ctx.token_binding(id, i) };
                    Candidate::new(*span, binding_level(name, binding, rule).with_flavor(name_level.flavor))
                }
            };
            found.push(candidate.with_rule(if is_type { bits } else { RuleBits::FULL }));
        }
        found
    }

    /// A plain name can denote a type only in expression position (`Widget.create()`).
    fn name_reference(&self, id: NodeId, text: &str, span: Span, ctx: Option<&ResolveContext<'_>>) -> Option<Candidate> {
        let name = &self.pattern.name;
        let name_level = match_name_value(name.simple_name.as_ref(), text, self.pattern.rule);
        if name_level.is_impossible() {
            return None;
        }
        Some(match ctx {
            None => Candidate::new(span, Level::POSSIBLE.with_flavor(name_level.flavor)).forcing(true),
            Some(ctx) => Candidate::new(
                span,
                binding_level(name, ctx.binding(id), self.pattern.rule).with_flavor(name_level.flavor),
            ),
        })
    }
}

pub(super) fn binding_level(name: &TypeName, binding: Option<&Binding>, rule: MatchRule) -> Level {
    match binding {
        None => Level::INACCURATE,
        Some(Binding::Type(ty)) => type_level(name, Some(ty.element.as_deref().unwrap_or(ty)), rule),
        Some(_) => Level::IMPOSSIBLE,
    }
}
