// SPDX-License-Identifier: MIT OR Apache-2.0

//! Disjunction of patterns.

use super::{MatchRule, Pattern};

/// A flat list of non-`Or` patterns sharing the union of their rules.
#[derive(Debug, Clone, PartialEq)]
pub struct OrPattern {
    patterns: Vec<Pattern>,
    pub(crate) rule: MatchRule,
}

impl OrPattern {
    pub fn new(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let mut flat = Vec::new();
        for pattern in patterns {
            match pattern {
                Pattern::Or(nested) => flat.extend(nested.patterns),
                other => flat.push(other),
            }
        }
        let rule = flat
            .iter()
            .map(Pattern::rule)
            .reduce(MatchRule::union)
            .unwrap_or_default();
        Self { patterns: flat, rule }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn must_resolve(&self) -> bool {
        self.patterns.iter().any(Pattern::must_resolve)
    }
}
