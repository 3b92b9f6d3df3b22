// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name fragments of patterns and the comparisons that apply match rules to them.

use regex::{Regex, RegexBuilder};
use std::fmt;

use super::rule::{MatchMode, MatchRule};
use crate::errors::{SearchError, SearchResult};
use crate::level::{Level, MatchFlavor};

/// One name fragment of a pattern (a selector, a simple type name, a qualification).
///
/// The text is lower-cased at construction unless the rule keeps case.
#[derive(Clone)]
pub struct NamePattern {
    text: String,
    regex: Option<Regex>,
}

impl NamePattern {
    pub fn new(text: &str, rule: MatchRule) -> SearchResult<Self> {
        let text = if rule.keeps_case() {
            text.to_string()
        } else {
            text.to_lowercase()
        };
        let regex = if rule.mode == MatchMode::Regexp {
            let compiled = RegexBuilder::new(&format!("^(?:{})$", text))
                .case_insensitive(!rule.is_case_sensitive())
                .build()
                .map_err(|e| SearchError::invalid_pattern(format!("bad regular expression '{}': {}", text, e)))?;
            Some(compiled)
        } else {
            None
        };
        Ok(Self { text, regex })
    }

    /// Build an optional fragment; empty text and a lone `*` both mean "any".
    pub fn optional(text: Option<&str>, rule: MatchRule) -> SearchResult<Option<Self>> {
        match text {
            None => Ok(None),
            Some(t) if t.is_empty() || t == "*" => Ok(None),
            Some(t) => Ok(Some(Self::new(t, rule)?)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn has_wildcards(&self) -> bool {
        self.text.contains('*') || self.text.contains('?')
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for NamePattern {}

impl fmt::Debug for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.text)
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Boolean name comparison used during the syntactic pass.
pub fn matches_name(pattern: Option<&NamePattern>, name: &str, rule: MatchRule) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };
    name_match_flavor(pattern, name, rule).is_some()
}

/// Graded name comparison.
///
/// A missing pattern matches anything accurately. An empty name only matches an
/// empty pattern. Any other successful comparison is `possible`, flavored by how
/// it matched, because the name alone never proves the binding.
pub fn match_name_value(pattern: Option<&NamePattern>, name: &str, rule: MatchRule) -> Level {
    let Some(pattern) = pattern else {
        return Level::ACCURATE;
    };
    if name.is_empty() {
        return if pattern.as_str().is_empty() {
            Level::ACCURATE
        } else {
            Level::IMPOSSIBLE
        };
    }
    if pattern.as_str().is_empty() {
        return Level::IMPOSSIBLE;
    }
    match name_match_flavor(pattern, name, rule) {
        Some(flavor) => Level::POSSIBLE.with_flavor(flavor),
        None => Level::IMPOSSIBLE,
    }
}

fn name_match_flavor(pattern: &NamePattern, name: &str, rule: MatchRule) -> Option<MatchFlavor> {
    let case_sensitive = rule.is_case_sensitive();
    let text = pattern.as_str();

    if rule.is_camel_case() {
        if camel_case_match(text, name) {
            return Some(MatchFlavor::CAMEL_CASE);
        }
        if case_sensitive {
            return None;
        }
    }

    let matched = match rule.mode {
        MatchMode::Exact => equals(text, name, case_sensitive),
        MatchMode::Prefix => prefix_equals(text, name, case_sensitive),
        MatchMode::Pattern => wildcard_match(text, name, case_sensitive),
        MatchMode::Regexp => pattern
            .regex
            .as_ref()
            .map(|re| re.is_match(name))
            .unwrap_or(false),
    };
    if !matched {
        return None;
    }
    Some(match rule.mode {
        MatchMode::Exact => MatchFlavor::EXACT,
        MatchMode::Prefix => MatchFlavor::PREFIX,
        MatchMode::Pattern => MatchFlavor::PATTERN,
        MatchMode::Regexp => MatchFlavor::REGEXP,
    })
}

pub fn equals(pattern: &str, name: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        pattern == name
    } else {
        pattern.to_lowercase() == name.to_lowercase()
    }
}

pub fn prefix_equals(prefix: &str, name: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        name.starts_with(prefix)
    } else {
        name.to_lowercase().starts_with(&prefix.to_lowercase())
    }
}

/// `*` matches any run of characters, `?` exactly one.
pub fn wildcard_match(pattern: &str, name: &str, case_sensitive: bool) -> bool {
    let (pattern, name): (Vec<char>, Vec<char>) = if case_sensitive {
        (pattern.chars().collect(), name.chars().collect())
    } else {
        (
            pattern.to_lowercase().chars().collect(),
            name.to_lowercase().chars().collect(),
        )
    };

    let (mut p, mut n) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut resume = 0usize;
    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            p += 1;
            resume = n;
        } else if let Some(s) = star {
            p = s + 1;
            resume += 1;
            n = resume;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

/// Camel case comparison: `NPE` matches `NullPointerException`, `NuPoEx` too.
///
/// The first characters must be identical. A non upper-case pattern character
/// must match the next name character; an upper-case one skips lower-case,
/// digit and other non upper-case name characters until it meets an upper-case
/// character, which must be equal. The pattern may stop before the name does.
pub fn camel_case_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    if pattern.is_empty() {
        return true;
    }
    if name.is_empty() || pattern[0] != name[0] {
        return false;
    }

    let (mut ip, mut iname) = (0usize, 0usize);
    loop {
        ip += 1;
        iname += 1;
        if ip == pattern.len() {
            return true;
        }
        if iname == name.len() {
            return false;
        }
        let pattern_char = pattern[ip];
        if pattern_char == name[iname] {
            continue;
        }
        if !pattern_char.is_uppercase() {
            return false;
        }
        loop {
            if iname == name.len() {
                return false;
            }
            let name_char = name[iname];
            if !name_char.is_uppercase() {
                iname += 1;
            } else if name_char != pattern_char {
                return false;
            } else {
                break;
            }
        }
    }
}

/// Split `java.util.List<String>` into (`java.util.List`, [`String`]).
pub fn split_type_arguments(text: &str) -> (String, Vec<String>) {
    let text = text.trim();
    let Some(open) = text.find('<') else {
        return (text.to_string(), Vec::new());
    };
    let close = text.rfind('>').unwrap_or(text.len());
    let base = format!("{}{}", &text[..open], text.get(close + 1..).unwrap_or(""));
    let inner = if close > open { &text[open + 1..close] } else { "" };

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    (base.trim().to_string(), args)
}

/// Split a dotted name at its last dot: (`qualification`, `simple name`).
pub fn split_qualified(text: &str) -> (Option<&str>, &str) {
    match text.rfind('.') {
        Some(dot) => (Some(&text[..dot]), &text[dot + 1..]),
        None => (None, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::MatchLevel;
    use crate::pattern::rule::RuleFlags;

    fn name(text: &str, rule: MatchRule) -> NamePattern {
        NamePattern::new(text, rule).expect("name pattern")
    }

    #[test]
    fn camel_case_examples() {
        assert!(camel_case_match("NPE", "NullPointerException"));
        assert!(camel_case_match("NuPoEx", "NullPointerException"));
        assert!(camel_case_match("NPExc", "NullPointerException"));
        assert!(camel_case_match("NPE", "NPE"));
        assert!(!camel_case_match("NPE", "NullPointer"));
        assert!(!camel_case_match("npe", "NullPointerException"));
        assert!(!camel_case_match("NPF", "NullPointerException"));
        assert!(camel_case_match("HM", "HashMap"));
        assert!(camel_case_match("HaM", "HashMapEntry"));
    }

    #[test]
    fn camel_case_skips_digits_and_underscores() {
        assert!(camel_case_match("UTF8", "UTF8Decoder"));
        assert!(camel_case_match("SA", "Some_1Accessor"));
    }

    #[test]
    fn wildcard_matching() {
        assert!(wildcard_match("*Widget", "FancyWidget", true));
        assert!(wildcard_match("W?dget", "Widget", true));
        assert!(wildcard_match("*", "", true));
        assert!(wildcard_match("a*b*c", "axxbyyc", true));
        assert!(!wildcard_match("a*b*c", "axxbyy", true));
        assert!(wildcard_match("*widget", "FancyWidget", false));
        assert!(!wildcard_match("*widget", "FancyWidget", true));
    }

    #[test]
    fn lower_cases_fragments_unless_case_kept() {
        assert_eq!(name("Widget", MatchRule::exact()).as_str(), "widget");
        assert_eq!(name("Widget", MatchRule::exact().case_sensitive()).as_str(), "Widget");
        assert_eq!(name("WiD", MatchRule::camel_case()).as_str(), "WiD");
    }

    #[test]
    fn exact_match_is_possible_with_exact_flavor() {
        let rule = MatchRule::exact().case_sensitive();
        let level = match_name_value(Some(&name("foo", rule)), "foo", rule);
        assert_eq!(level.level, MatchLevel::Possible);
        assert!(level.flavor.contains(MatchFlavor::EXACT));
        assert!(match_name_value(Some(&name("foo", rule)), "food", rule).is_impossible());
    }

    #[test]
    fn missing_pattern_and_empty_names() {
        let rule = MatchRule::exact();
        assert_eq!(match_name_value(None, "anything", rule), Level::ACCURATE);
        assert!(match_name_value(Some(&name("a", rule)), "", rule).is_impossible());
    }

    #[test]
    fn case_insensitive_camel_case_falls_back_to_mode() {
        let rule = MatchRule::prefix().with(RuleFlags::CAMEL_CASE);
        let pattern = name("WiD", rule);
        assert!(matches_name(Some(&pattern), "WidgetData", rule));
        assert!(matches_name(Some(&pattern), "widgetdata", rule));
        let strict = rule.case_sensitive();
        assert!(!matches_name(Some(&name("WiD", strict)), "widgetdata", strict));
    }

    #[test]
    fn regexp_names_are_anchored() {
        let rule = MatchRule::regexp().case_sensitive();
        let pattern = name("get[A-Z].*", rule);
        assert!(matches_name(Some(&pattern), "getName", rule));
        assert!(!matches_name(Some(&pattern), "forgetName", rule));
    }

    #[test]
    fn bad_regexp_is_invalid_pattern() {
        assert!(NamePattern::new("(", MatchRule::regexp()).is_err());
    }

    #[test]
    fn splits_type_arguments() {
        let (base, args) = split_type_arguments("java.util.Map<String, List<Integer>>");
        assert_eq!(base, "java.util.Map");
        assert_eq!(args, vec!["String".to_string(), "List<Integer>".to_string()]);
        let (base, args) = split_type_arguments("int[]");
        assert_eq!(base, "int[]");
        assert!(args.is_empty());
        let (base, _) = split_type_arguments("List<String>[]");
        assert_eq!(base, "List[]");
    }

    #[test]
    fn splits_qualified_names() {
        assert_eq!(split_qualified("a.b.Widget"), (Some("a.b"), "Widget"));
        assert_eq!(split_qualified("Widget"), (None, "Widget"));
    }
}
