// SPDX-License-Identifier: MIT OR Apache-2.0

//! Type declarations and type references.

use super::{Directions, MatchRule, Pattern, TypeName};
use crate::errors::{SearchError, SearchResult};
use crate::index::codec::DecodedKey;

#[derive(Debug, Clone, PartialEq)]
pub struct TypePattern {
    pub(crate) name: TypeName,
    pub(crate) directions: Directions,
    pub(crate) rule: MatchRule,
    pub(crate) must_resolve: bool,
}

impl TypePattern {
    /// `name` may be qualified (`com.acme.Widget`) and parameterized (`List<String>`).
    pub fn new(name: &str, directions: Directions, rule: MatchRule) -> SearchResult<Pattern> {
        if !directions.declarations && !directions.references {
            return Err(SearchError::invalid_pattern(
                "type pattern must look for declarations or references",
            ));
        }
        let simple_text = super::name::split_qualified(name.trim()).1.to_string();
        let rule = rule.validate(Some(&simple_text))?;
        let name = TypeName::parse(Some(name), rule)?;
        let must_resolve =
            directions.references && (name.qualification.is_some() || name.is_parameterized());
        Ok(Pattern::Type(TypePattern {
            name,
            directions,
            rule,
            must_resolve,
        }))
    }

    pub fn declarations(name: &str) -> SearchResult<Pattern> {
        Self::new(name, Directions::DECLARATIONS, MatchRule::default())
    }

    pub fn references(name: &str) -> SearchResult<Pattern> {
        Self::new(name, Directions::REFERENCES, MatchRule::default())
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn directions(&self) -> Directions {
        self.directions
    }

    pub(crate) fn matches_decoded_key(&self, key: &DecodedKey) -> bool {
        match key {
            DecodedKey::TypeDecl(k) => {
                self.directions.declarations
                    && self.name.matches(&k.simple_name, &k.qualification, self.rule)
            }
            DecodedKey::Ref(word) => {
                self.directions.references && self.name.matches_simple_name(word, self.rule)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::codec::TypeDeclKey;

    fn type_pattern(p: Pattern) -> TypePattern {
        match p {
            Pattern::Type(t) => t,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn references_with_qualification_must_resolve() {
        let p = type_pattern(TypePattern::references("com.acme.Widget").unwrap());
        assert!(p.must_resolve);
        let p = type_pattern(TypePattern::references("Widget").unwrap());
        assert!(!p.must_resolve);
        let p = type_pattern(TypePattern::declarations("com.acme.Widget").unwrap());
        assert!(!p.must_resolve);
    }

    #[test]
    fn decoded_declaration_keys_check_qualification() {
        let p = TypePattern::declarations("com.acme.Widget").unwrap();
        let matching = DecodedKey::TypeDecl(TypeDeclKey {
            simple_name: "Widget".into(),
            qualification: "com.acme".into(),
            ..TypeDeclKey::default()
        });
        let other_package = DecodedKey::TypeDecl(TypeDeclKey {
            simple_name: "Widget".into(),
            qualification: "org.other".into(),
            ..TypeDeclKey::default()
        });
        assert!(p.matches_decoded_key(&matching));
        assert!(!p.matches_decoded_key(&other_package));
        assert!(!p.matches_decoded_key(&DecodedKey::Ref("Widget".into())));
    }

    #[test]
    fn no_direction_is_invalid() {
        assert!(TypePattern::new("Widget", Directions::default(), MatchRule::default()).is_err());
    }
}
