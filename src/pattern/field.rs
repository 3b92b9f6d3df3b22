// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field declarations and field accesses.

use super::name::matches_name;
use super::{Directions, MatchRule, NamePattern, Pattern, RuleFlags, TypeName};
use crate::errors::{SearchError, SearchResult};
use crate::index::codec::DecodedKey;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPattern {
    pub(crate) name: Option<NamePattern>,
    pub(crate) declaring: TypeName,
    pub(crate) field_type: TypeName,
    pub(crate) directions: Directions,
    pub(crate) rule: MatchRule,
    pub(crate) must_resolve: bool,
}

impl FieldPattern {
    /// `declaring_type` and `field_type` may be qualified; `None` means any.
    pub fn new(
        name: &str,
        declaring_type: Option<&str>,
        field_type: Option<&str>,
        directions: Directions,
        rule: MatchRule,
    ) -> SearchResult<Pattern> {
        let directions = directions.normalized();
        if !directions.declarations && !directions.references {
            return Err(SearchError::invalid_pattern(
                "field pattern must look for declarations or accesses",
            ));
        }
        let rule = rule.validate(Some(name))?;
        let type_rule = rule.without(RuleFlags::CAMEL_CASE);
        let declaring = TypeName::parse(declaring_type, type_rule)?;
        let field_type = TypeName::parse(field_type, type_rule)?;

        // a reference can be an unqualified name whose target only bindings reveal
        let must_resolve =
            declaring.is_specified() || field_type.is_specified() || directions.references;

        Ok(Pattern::Field(FieldPattern {
            name: NamePattern::optional(Some(name), rule)?,
            declaring,
            field_type,
            directions,
            rule,
            must_resolve,
        }))
    }

    pub fn name(&self) -> Option<&NamePattern> {
        self.name.as_ref()
    }

    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring
    }

    pub fn field_type(&self) -> &TypeName {
        &self.field_type
    }

    pub(crate) fn matches_decoded_key(&self, key: &DecodedKey) -> bool {
        match key {
            DecodedKey::FieldDecl(k) => {
                self.directions.declarations && matches_name(self.name.as_ref(), &k.name, self.rule)
            }
            DecodedKey::Ref(word) => {
                self.directions.references && matches_name(self.name.as_ref(), word, self.rule)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::codec::FieldDeclKey;

    #[test]
    fn read_only_access_keeps_references() {
        let p = FieldPattern::new("count", None, None, Directions::accesses(true, false), MatchRule::default())
            .unwrap();
        let d = p.directions();
        assert!(d.references && d.read_access && !d.write_access);
        assert!(p.must_resolve());
    }

    #[test]
    fn declarations_only_resolve_when_types_are_pinned() {
        let plain = FieldPattern::new("count", None, None, Directions::DECLARATIONS, MatchRule::default())
            .unwrap();
        assert!(!plain.must_resolve());
        let typed = FieldPattern::new("count", Some("Counter"), None, Directions::DECLARATIONS, MatchRule::default())
            .unwrap();
        assert!(typed.must_resolve());
    }

    #[test]
    fn decoded_keys_compare_names() {
        let p = FieldPattern::new("count", None, None, Directions::ALL, MatchRule::default()).unwrap();
        let key = DecodedKey::FieldDecl(FieldDeclKey {
            name: "count".into(),
            declaring_type: "Counter".into(),
            field_type: "int".into(),
            ..FieldDeclKey::default()
        });
        assert!(p.matches_decoded_key(&key));
        assert!(p.matches_decoded_key(&DecodedKey::Ref("count".into())));
        assert!(!p.matches_decoded_key(&DecodedKey::Ref("counter".into())));
    }
}
