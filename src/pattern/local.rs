// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local variables and parameters.
//!
//! A local is identified by its name plus the document and offset of its
//! declaration, so this pattern never goes through the index: the declaring
//! document is the only candidate.

use std::path::{Path, PathBuf};

use super::{Directions, MatchRule, NamePattern, Pattern};
use crate::errors::{SearchError, SearchResult};
use crate::index::codec::DecodedKey;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariablePattern {
    pub(crate) name: NamePattern,
    pub(crate) declaring_path: PathBuf,
    /// Byte offset of the declared name.
    pub(crate) declaration_offset: usize,
    pub(crate) directions: Directions,
    pub(crate) rule: MatchRule,
}

impl LocalVariablePattern {
    pub fn new(
        name: &str,
        declaring_path: impl Into<PathBuf>,
        declaration_offset: usize,
        directions: Directions,
    ) -> SearchResult<Pattern> {
        let directions = directions.normalized();
        if !directions.declarations && !directions.references {
            return Err(SearchError::invalid_pattern(
                "local variable pattern must look for declarations or accesses",
            ));
        }
        if name.is_empty() || name.contains(['*', '?']) {
            return Err(SearchError::invalid_pattern(format!(
                "local variable name '{}' must be a plain identifier",
                name
            )));
        }
        let rule = MatchRule::default();
        Ok(Pattern::LocalVariable(LocalVariablePattern {
            name: NamePattern::new(name, rule)?,
            declaring_path: declaring_path.into(),
            declaration_offset,
            directions,
            rule,
        }))
    }

    pub fn name(&self) -> &NamePattern {
        &self.name
    }

    pub fn declaring_path(&self) -> &Path {
        &self.declaring_path
    }

    pub fn declaration_offset(&self) -> usize {
        self.declaration_offset
    }

    /// References need bindings to tell the local from a shadowing declaration.
    pub fn must_resolve(&self) -> bool {
        self.directions.references
    }

    pub(crate) fn matches_decoded_key(&self, _key: &DecodedKey) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_are_rejected() {
        assert!(LocalVariablePattern::new("i*", "A.java", 10, Directions::ALL).is_err());
        assert!(LocalVariablePattern::new("i", "A.java", 10, Directions::default()).is_err());
    }

    #[test]
    fn declarations_alone_do_not_resolve() {
        let p = LocalVariablePattern::new("count", "A.java", 10, Directions::DECLARATIONS).unwrap();
        assert!(!p.must_resolve());
        let p = LocalVariablePattern::new("count", "A.java", 10, Directions::accesses(false, true)).unwrap();
        assert!(p.must_resolve());
        assert!(!p.matches_decoded_key(&DecodedKey::Ref("count".into())));
    }
}
