// SPDX-License-Identifier: MIT OR Apache-2.0

//! References to a type in `extends` / `implements` position.

use super::{matches_qualification, MatchRule, Pattern, TypeName};
use crate::errors::SearchResult;
use crate::index::codec::{DecodedKey, SuperKind};

/// Which super-type positions count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuperTypeKind {
    #[default]
    All,
    /// `extends` of a class.
    Classes,
    /// `implements`, and `extends` of an interface.
    Interfaces,
}

impl SuperTypeKind {
    pub fn accepts(self, kind: SuperKind) -> bool {
        match self {
            SuperTypeKind::All => true,
            SuperTypeKind::Classes => kind == SuperKind::Class,
            SuperTypeKind::Interfaces => kind == SuperKind::Interface,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperTypeReferencePattern {
    pub(crate) super_type: TypeName,
    pub(crate) kind: SuperTypeKind,
    pub(crate) rule: MatchRule,
    pub(crate) must_resolve: bool,
}

impl SuperTypeReferencePattern {
    pub fn new(super_type: &str, kind: SuperTypeKind, rule: MatchRule) -> SearchResult<Pattern> {
        let simple = super::name::split_qualified(super_type.trim()).1.to_string();
        let rule = rule.validate(Some(&simple))?;
        let super_type = TypeName::parse(Some(super_type), rule)?;
        let must_resolve = super_type.qualification.is_some();
        Ok(Pattern::SuperTypeReference(SuperTypeReferencePattern {
            super_type,
            kind,
            rule,
            must_resolve,
        }))
    }

    pub fn super_type(&self) -> &TypeName {
        &self.super_type
    }

    pub fn kind(&self) -> SuperTypeKind {
        self.kind
    }

    pub(crate) fn matches_decoded_key(&self, key: &DecodedKey) -> bool {
        let DecodedKey::SuperRef(k) = key else {
            return false;
        };
        if !self.kind.accepts(k.kind) {
            return false;
        }
        // keys only carry a qualification when the source wrote one
        if !k.super_qualification.is_empty()
            && !matches_qualification(self.super_type.qualification.as_ref(), &k.super_qualification, self.rule)
        {
            return false;
        }
        self.super_type.matches_simple_name(&k.super_simple_name, self.rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::codec::SuperRefKey;

    fn key(super_simple: &str, super_qual: &str, kind: SuperKind) -> DecodedKey {
        DecodedKey::SuperRef(SuperRefKey {
            super_simple_name: super_simple.into(),
            super_qualification: super_qual.into(),
            simple_name: "Impl".into(),
            qualification: "com.acme".into(),
            kind,
            ..SuperRefKey::default()
        })
    }

    #[test]
    fn kind_filters_keys() {
        let p = SuperTypeReferencePattern::new("Base", SuperTypeKind::Classes, MatchRule::default()).unwrap();
        assert!(p.matches_decoded_key(&key("Base", "", SuperKind::Class)));
        assert!(!p.matches_decoded_key(&key("Base", "", SuperKind::Interface)));
    }

    #[test]
    fn written_qualification_must_agree() {
        let p = SuperTypeReferencePattern::new("com.acme.Base", SuperTypeKind::All, MatchRule::default()).unwrap();
        assert!(p.must_resolve());
        assert!(p.matches_decoded_key(&key("Base", "com.acme", SuperKind::Class)));
        assert!(p.matches_decoded_key(&key("Base", "", SuperKind::Class)));
        assert!(!p.matches_decoded_key(&key("Base", "org.other", SuperKind::Class)));
    }
}
