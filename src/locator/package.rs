// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package declarations and the package prefixes of dotted names.

use crate::ast::{ContainerMask, NodeFlags, NodeId, NodeKind, ParsedUnit, Span};
use crate::binding::Binding;
use crate::level::Level;
use crate::pattern::name::match_name_value;
use crate::pattern::PackagePattern;

use super::{Candidate, ResolveContext};

#[derive(Debug, Clone)]
pub struct PackageLocator {
    pub(super) pattern: PackagePattern,
}

impl PackageLocator {
    pub fn new(pattern: PackagePattern) -> Self {
        Self { pattern }
    }

    pub fn containers(&self) -> ContainerMask {
        if self.pattern.directions.references {
            ContainerMask::ALL
        } else {
            ContainerMask::COMPILATION_UNIT
        }
    }

    pub fn candidates(&self, unit: &ParsedUnit, id: NodeId, ctx: Option<&ResolveContext<'_>>) -> Vec<Candidate> {
        let directions = self.pattern.directions;
        let node = unit.node(id);
        let candidate = match &node.kind {
            NodeKind::Package { name, token_spans } if directions.declarations => {
                let level = match_name_value(self.pattern.name.as_ref(), name, self.pattern.rule);
                match (token_spans.first(), token_spans.last()) {
                    (Some(first), Some(last)) if !level.is_impossible() => {
                        Some(Candidate::new(Span::new(first.start, last.end), level).declaration())
                    }
                    _ => None,
                }
            }
            _ if !directions.references => None,
            NodeKind::Import {
                tokens,
                token_spans,
                on_demand,
                is_static,
            } => {
                // the package part stops before the type, or before `Type.member` for static imports
                let limit = match (*on_demand, *is_static) {
                    (true, false) => tokens.len(),
                    (false, true) => tokens.len().saturating_sub(2),
                    _ => tokens.len().saturating_sub(1),
                };
                self.prefix(id, tokens, token_spans, limit, ctx)
            }
            NodeKind::TypeRef {
                tokens, token_spans, ..
            } if !node.flags.contains(NodeFlags::IMPLICIT) => {
                self.prefix(id, tokens, token_spans, tokens.len().saturating_sub(1), ctx)
            }
            NodeKind::QualifiedNameRef { tokens, token_spans } => {
                self.prefix(id, tokens, token_spans, tokens.len().saturating_sub(1), ctx)
            }
            _ => None,
        };
        candidate.into_iter().collect()
    }

    /// The package prefix among the first `limit` tokens.
    ///
    /// Syntax alone cannot tell a package from an outer type or a variable,
    /// so the longest matching prefix is a possible match and the bindings
    /// settle where the package actually ends.
    fn prefix(
        &self,
        id: NodeId,
        tokens: &[String],
        spans: &[Span],
        limit: usize,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let first = spans.first()?;
        let graded = |k: usize| match_name_value(self.pattern.name.as_ref(), &tokens[..=k].join("."), self.pattern.rule);
        let Some(ctx) = ctx else {
            let k = (0..limit.min(tokens.len())).rev().find(|&k| !graded(k).is_impossible())?;
            let flavor = graded(k).flavor;
            return Some(
                Candidate::new(Span::new(first.start, spans[k].end), Level::POSSIBLE.with_flavor(flavor)).forcing(true),
            );
        };
        let is_package = |k: usize| matches!(ctx.token_binding(id, k), Some(Binding::Package(_)));
        let k = (0..limit.min(tokens.len())).take_while(|&k| is_package(k)).last()?;
        let name = graded(k);
        if name.is_impossible() {
            return None;
        }
        let level = match ctx.token_binding(id, k + 1) {
            None if k + 1 < tokens.len() => Level::INACCURATE,
            _ => Level::ACCURATE,
        };
        Some(Candidate::new(Span::new(first.start, spans[k].end), level.with_flavor(name.flavor)))
    }
}
