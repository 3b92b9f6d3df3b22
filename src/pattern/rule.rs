// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match rules: how a name fragment of a pattern is compared against names.

use bitflags::bitflags;
use serde::Serialize;

use crate::errors::{SearchError, SearchResult};

/// How a pattern name is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    Prefix,
    /// `*` and `?` wildcards.
    Pattern,
    Regexp,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RuleFlags: u8 {
        const CASE_SENSITIVE = 1 << 0;
        const CAMEL_CASE = 1 << 1;
        /// Accept matches that agree only after type-argument erasure.
        const ERASURE = 1 << 2;
        /// Accept matches whose type arguments are compatible but not equal.
        const EQUIVALENT = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchRule {
    pub mode: MatchMode,
    pub flags: RuleFlags,
}

impl Default for MatchRule {
    fn default() -> Self {
        Self::exact().case_sensitive()
    }
}

impl MatchRule {
    pub const fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            flags: RuleFlags::ERASURE.union(RuleFlags::EQUIVALENT),
        }
    }

    pub const fn exact() -> Self {
        Self::new(MatchMode::Exact)
    }

    pub const fn prefix() -> Self {
        Self::new(MatchMode::Prefix)
    }

    pub const fn pattern() -> Self {
        Self::new(MatchMode::Pattern)
    }

    pub const fn regexp() -> Self {
        Self::new(MatchMode::Regexp)
    }

    pub fn camel_case() -> Self {
        Self::new(MatchMode::Exact).with(RuleFlags::CAMEL_CASE)
    }

    pub fn case_sensitive(self) -> Self {
        self.with(RuleFlags::CASE_SENSITIVE)
    }

    pub fn case_insensitive(mut self) -> Self {
        self.flags.remove(RuleFlags::CASE_SENSITIVE);
        self
    }

    pub fn with(mut self, flags: RuleFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn without(mut self, flags: RuleFlags) -> Self {
        self.flags.remove(flags);
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_case_sensitive(self) -> bool {
        self.flags.contains(RuleFlags::CASE_SENSITIVE)
    }

    pub fn is_camel_case(self) -> bool {
        self.flags.contains(RuleFlags::CAMEL_CASE)
    }

    pub fn accepts_erasure(self) -> bool {
        self.flags.contains(RuleFlags::ERASURE)
    }

    pub fn accepts_equivalent(self) -> bool {
        self.flags.contains(RuleFlags::EQUIVALENT)
    }

    /// Name fragments are stored lower-cased unless the comparison needs the original casing.
    pub fn keeps_case(self) -> bool {
        self.is_case_sensitive() || self.is_camel_case()
    }

    /// Normalize a rule against the text it will be applied to.
    ///
    /// Wildcards force pattern mode and turn off camel case and prefix. Camel case
    /// survives only for identifier-like text containing an upper-case letter;
    /// otherwise it degrades to a case sensitive prefix match. Regular expressions
    /// cannot be combined with any other mode.
    pub fn validate(self, text: Option<&str>) -> SearchResult<Self> {
        let mut rule = self;
        let text = text.unwrap_or("");

        if rule.mode == MatchMode::Regexp {
            if rule.is_camel_case() {
                return Err(SearchError::invalid_pattern(
                    "regular expression rule cannot be combined with camel case",
                ));
            }
            return Ok(rule);
        }

        if text.contains('*') || text.contains('?') {
            rule.mode = MatchMode::Pattern;
            rule.flags.remove(RuleFlags::CAMEL_CASE);
            return Ok(rule);
        }

        if rule.is_camel_case() && !is_camel_case_text(text) {
            rule.flags.remove(RuleFlags::CAMEL_CASE);
            if rule.mode != MatchMode::Prefix {
                rule.mode = MatchMode::Prefix;
                rule.flags |= RuleFlags::CASE_SENSITIVE;
            }
        }
        Ok(rule)
    }

    /// The rule that covers both `self` and `other`, used when combining patterns.
    pub fn union(self, other: MatchRule) -> MatchRule {
        let mode = self.mode.max(other.mode);
        let mut flags = self.flags | other.flags;
        if !(self.is_case_sensitive() && other.is_case_sensitive()) {
            flags.remove(RuleFlags::CASE_SENSITIVE);
        }
        if !(self.is_camel_case() && other.is_camel_case()) {
            flags.remove(RuleFlags::CAMEL_CASE);
        }
        MatchRule { mode, flags }
    }
}

fn is_camel_case_text(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && text.chars().any(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_force_pattern_mode() {
        let rule = MatchRule::prefix()
            .with(RuleFlags::CAMEL_CASE)
            .validate(Some("get*Name"))
            .expect("valid");
        assert_eq!(rule.mode, MatchMode::Pattern);
        assert!(!rule.is_camel_case());

        let rule = MatchRule::exact().validate(Some("fo?")).expect("valid");
        assert_eq!(rule.mode, MatchMode::Pattern);
    }

    #[test]
    fn camel_case_kept_for_identifier_with_upper_case() {
        let rule = MatchRule::camel_case().validate(Some("NPE")).expect("valid");
        assert!(rule.is_camel_case());
        assert_eq!(rule.mode, MatchMode::Exact);

        let rule = MatchRule::prefix()
            .with(RuleFlags::CAMEL_CASE)
            .validate(Some("NuPoEx"))
            .expect("valid");
        assert!(rule.is_camel_case());
        assert_eq!(rule.mode, MatchMode::Prefix);
    }

    #[test]
    fn camel_case_degrades_to_case_sensitive_prefix() {
        let rule = MatchRule::camel_case().validate(Some("widget")).expect("valid");
        assert!(!rule.is_camel_case());
        assert_eq!(rule.mode, MatchMode::Prefix);
        assert!(rule.is_case_sensitive());
    }

    #[test]
    fn camel_case_with_requested_prefix_keeps_case_setting() {
        let rule = MatchRule::prefix()
            .with(RuleFlags::CAMEL_CASE)
            .validate(Some("foo.bar"))
            .expect("valid");
        assert_eq!(rule.mode, MatchMode::Prefix);
        assert!(!rule.is_case_sensitive());
    }

    #[test]
    fn regexp_with_camel_case_is_rejected() {
        let err = MatchRule::regexp()
            .with(RuleFlags::CAMEL_CASE)
            .validate(Some("Foo.*"))
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern(_)));
    }

    #[test]
    fn regexp_ignores_wildcard_characters() {
        let rule = MatchRule::regexp().validate(Some("fo*")).expect("valid");
        assert_eq!(rule.mode, MatchMode::Regexp);
    }

    #[test]
    fn union_widens_mode_and_case() {
        let a = MatchRule::exact().case_sensitive();
        let b = MatchRule::pattern();
        let combined = a.union(b);
        assert_eq!(combined.mode, MatchMode::Pattern);
        assert!(!combined.is_case_sensitive());
    }
}
