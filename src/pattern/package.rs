// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package declarations and package references.

use super::name::matches_name;
use super::{Directions, MatchMode, MatchRule, NamePattern, Pattern};
use crate::errors::{SearchError, SearchResult};
use crate::index::codec::DecodedKey;

#[derive(Debug, Clone, PartialEq)]
pub struct PackagePattern {
    /// Dotted package name; `None` matches every package.
    pub(crate) name: Option<NamePattern>,
    pub(crate) directions: Directions,
    pub(crate) rule: MatchRule,
    pub(crate) must_resolve: bool,
}

impl PackagePattern {
    pub fn new(name: &str, directions: Directions, rule: MatchRule) -> SearchResult<Pattern> {
        if !directions.declarations && !directions.references {
            return Err(SearchError::invalid_pattern(
                "package pattern must look for declarations or references",
            ));
        }
        let rule = rule.validate(Some(name))?;
        Ok(Pattern::Package(PackagePattern {
            name: NamePattern::optional(Some(name), rule)?,
            directions,
            rule,
            must_resolve: directions.references,
        }))
    }

    pub fn name(&self) -> Option<&NamePattern> {
        self.name.as_ref()
    }

    /// The last dotted segment, which is what reference keys record.
    pub(crate) fn last_segment(&self) -> Option<&str> {
        self.name
            .as_ref()
            .map(|n| n.as_str().rsplit('.').next().unwrap_or(n.as_str()))
    }

    pub(crate) fn matches_decoded_key(&self, key: &DecodedKey) -> bool {
        match key {
            DecodedKey::PackageDecl(name) => {
                self.directions.declarations && matches_name(self.name.as_ref(), name, self.rule)
            }
            DecodedKey::Ref(word) => {
                self.directions.references
                    && match self.last_segment() {
                        // only an exact name pins the segment; the locator checks the rest
                        Some(segment) if self.rule.mode == MatchMode::Exact => {
                            super::name::equals(segment, word, self.rule.is_case_sensitive())
                        }
                        _ => true,
                    }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_compare_full_name() {
        let p = PackagePattern::new("com.acme", Directions::DECLARATIONS, MatchRule::default()).unwrap();
        assert!(p.matches_decoded_key(&DecodedKey::PackageDecl("com.acme".into())));
        assert!(!p.matches_decoded_key(&DecodedKey::PackageDecl("com.acme.sub".into())));
        assert!(!p.must_resolve());
    }

    #[test]
    fn references_compare_last_segment() {
        let p = PackagePattern::new("com.acme", Directions::REFERENCES, MatchRule::default()).unwrap();
        assert!(p.must_resolve());
        assert!(p.matches_decoded_key(&DecodedKey::Ref("acme".into())));
        assert!(!p.matches_decoded_key(&DecodedKey::Ref("other".into())));
    }
}
