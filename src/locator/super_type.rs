// SPDX-License-Identifier: MIT OR Apache-2.0

//! Types named in `extends` and `implements` clauses.

use crate::ast::{NodeFlags, NodeId, NodeKind, ParsedUnit, Span, TypeRole};
use crate::index::codec::SuperKind;
use crate::pattern::name::match_name_value;
use crate::pattern::{matches_qualification, SuperTypeReferencePattern};

use super::type_ref::binding_level;
use super::{syntactic, type_rule, Candidate, ResolveContext};

#[derive(Debug, Clone)]
pub struct SuperTypeLocator {
    pub(super) pattern: SuperTypeReferencePattern,
}

impl SuperTypeLocator {
    pub fn new(pattern: SuperTypeReferencePattern) -> Self {
        Self { pattern }
    }

    pub fn candidates(&self, unit: &ParsedUnit, id: NodeId, ctx: Option<&ResolveContext<'_>>) -> Vec<Candidate> {
        let node = unit.node(id);
        let NodeKind::TypeRef {
            tokens, token_spans, role, ..
        } = &node.kind
        else {
            return Vec::new();
        };
        let kind = match role {
            TypeRole::SuperClass => SuperKind::Class,
            TypeRole::SuperInterface => SuperKind::Interface,
            TypeRole::Other => return Vec::new(),
        };
        if !self.pattern.kind.accepts(kind) || node.flags.contains(NodeFlags::IMPLICIT) {
            return Vec::new();
        }
        let (Some(last), Some(first_span), Some(last_span)) = (tokens.last(), token_spans.first(), token_spans.last())
        else {
            return Vec::new();
        };
        let rule = type_rule(self.pattern.rule);
        let super_type = &self.pattern.super_type;
        let name = match_name_value(super_type.simple_name.as_ref(), last, rule);
        if name.is_impossible() {
            return Vec::new();
        }
        let span = Span::new(first_span.start, last_span.end);
        let level = match ctx {
            Some(ctx) => binding_level(super_type, ctx.binding(id), rule).with_flavor(name.flavor),
            None => {
                let written = tokens[..tokens.len() - 1].join(".");
                if !written.is_empty() && !matches_qualification(super_type.qualification.as_ref(), &written, rule) {
                    return Vec::new();
                }
                syntactic(name, self.pattern.must_resolve)
            }
        };
        vec![Candidate::new(span, level)]
    }
}
