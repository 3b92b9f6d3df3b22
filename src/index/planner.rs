// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index query planning
//!
//! Turns a pattern into the lookups a textual index can answer. Keys are
//! composite (`name/...`), so an exact name becomes a prefix lookup on
//! `name/`, and fragments the pattern leaves open become `*` wildcards.
//! Camel case cannot be expressed as a key at all and falls back to an
//! unkeyed lookup of the categories.

use super::codec::{name_prefix, SEPARATOR};
use super::{EntryResult, IndexCategory, IndexStore};
use crate::errors::SearchResult;
use crate::pattern::{
    ConstructorPattern, FieldPattern, MatchMode, MatchRule, MethodPattern, NamePattern, PackagePattern,
    Pattern, SuperTypeReferencePattern, TypeName, TypePattern,
};

/// One lookup against an index store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub categories: Vec<IndexCategory>,
    /// `None` asks for every entry of the categories.
    pub key: Option<String>,
    pub rule: MatchRule,
}

impl IndexQuery {
    fn unkeyed(categories: Vec<IndexCategory>, rule: MatchRule) -> Self {
        Self {
            categories,
            key: None,
            rule,
        }
    }

    fn keyed(categories: Vec<IndexCategory>, key: String, mode: MatchMode, rule: MatchRule) -> Self {
        Self {
            categories,
            key: Some(key),
            rule: rule.with_mode(mode),
        }
    }
}

/// The lookups answering `pattern`. Regular expressions and local variables plan none.
pub fn plan(pattern: &Pattern) -> Vec<IndexQuery> {
    let mut queries = Vec::new();
    plan_into(pattern, &mut queries);
    queries
}

fn plan_into(pattern: &Pattern, queries: &mut Vec<IndexQuery>) {
    let rule = pattern.rule();
    if rule.mode == MatchMode::Regexp && !matches!(pattern, Pattern::Or(_)) {
        tracing::warn!(%pattern, "regular expressions cannot be answered by the index; no lookups issued");
        return;
    }
    match pattern {
        Pattern::Type(p) => plan_type(p, queries),
        Pattern::Method(p) => plan_method(p, queries),
        Pattern::Constructor(p) => plan_constructor(p, queries),
        Pattern::Field(p) => plan_field(p, queries),
        Pattern::LocalVariable(_) => {}
        Pattern::SuperTypeReference(p) => plan_super_type(p, queries),
        Pattern::Package(p) => plan_package(p, queries),
        Pattern::Or(p) => {
            for child in p.patterns() {
                plan_into(child, queries);
            }
        }
    }
}

/// Lookups for a composite key whose first field is `name`.
fn composite(categories: Vec<IndexCategory>, name: Option<&NamePattern>, rule: MatchRule) -> Vec<IndexQuery> {
    let Some(name) = name else {
        return vec![IndexQuery::unkeyed(categories, rule)];
    };
    if rule.is_camel_case() {
        return vec![IndexQuery::unkeyed(categories, rule)];
    }
    let text = name.as_str();
    let query = if name.has_wildcards() || rule.mode == MatchMode::Pattern {
        IndexQuery::keyed(categories, format!("{}{}*", text, SEPARATOR), MatchMode::Pattern, rule)
    } else if rule.mode == MatchMode::Prefix {
        IndexQuery::keyed(categories, text.to_string(), MatchMode::Prefix, rule)
    } else {
        IndexQuery::keyed(categories, name_prefix(text), MatchMode::Prefix, rule)
    };
    vec![query]
}

/// Lookups for a plain word key (`ref`, `packageDecl`).
fn simple(categories: Vec<IndexCategory>, name: Option<&str>, rule: MatchRule) -> Vec<IndexQuery> {
    let Some(text) = name else {
        return vec![IndexQuery::unkeyed(categories, rule)];
    };
    if rule.is_camel_case() {
        return vec![IndexQuery::unkeyed(categories, rule)];
    }
    let mode = if text.contains(['*', '?']) {
        MatchMode::Pattern
    } else {
        rule.mode
    };
    vec![IndexQuery::keyed(categories, text.to_string(), mode, rule)]
}

fn plan_type(p: &TypePattern, queries: &mut Vec<IndexQuery>) {
    let rule = p.rule;
    if p.directions.declarations {
        queries.extend(type_declaration_queries(&p.name, rule));
    }
    if p.directions.references {
        queries.extend(simple(vec![IndexCategory::Ref], p.name.simple_text(), rule));
    }
}

/// `simple/qualification/...` keys: the qualification narrows the lookup when it can.
fn type_declaration_queries(name: &TypeName, rule: MatchRule) -> Vec<IndexQuery> {
    let categories = vec![IndexCategory::TypeDecl];
    let (Some(simple), Some(qualification)) = (&name.simple_name, &name.qualification) else {
        return composite(categories, name.simple_name.as_ref(), rule);
    };
    if rule.is_camel_case() {
        return vec![IndexQuery::unkeyed(categories, rule)];
    }
    let wild = simple.has_wildcards() || qualification.has_wildcards();
    match rule.mode {
        MatchMode::Exact if !wild => vec![IndexQuery::keyed(
            categories,
            format!("{}{sep}{}{sep}", simple, qualification, sep = SEPARATOR),
            MatchMode::Prefix,
            rule,
        )],
        MatchMode::Prefix if !wild => vec![
            // entries recorded without the full qualification still share the simple name
            IndexQuery::keyed(categories.clone(), simple.as_str().to_string(), MatchMode::Prefix, rule),
            IndexQuery::keyed(
                categories,
                format!("{}*{sep}{}*", simple, qualification, sep = SEPARATOR),
                MatchMode::Pattern,
                rule,
            ),
        ],
        _ => vec![
            IndexQuery::keyed(
                categories.clone(),
                format!("{}{}*", simple, SEPARATOR),
                MatchMode::Pattern,
                rule,
            ),
            IndexQuery::keyed(
                categories,
                format!("{}{sep}{}{sep}*", simple, qualification, sep = SEPARATOR),
                MatchMode::Pattern,
                rule,
            ),
        ],
    }
}

fn plan_method(p: &MethodPattern, queries: &mut Vec<IndexQuery>) {
    if p.directions.declarations {
        queries.extend(composite(vec![IndexCategory::MethodDecl], p.selector.as_ref(), p.rule));
    }
    if p.directions.references {
        queries.extend(composite(vec![IndexCategory::MethodRef], p.selector.as_ref(), p.rule));
    }
}

fn plan_constructor(p: &ConstructorPattern, queries: &mut Vec<IndexQuery>) {
    let name = p.declaring.simple_name.as_ref();
    if p.directions.declarations {
        queries.extend(composite(vec![IndexCategory::ConstructorDecl], name, p.rule));
    }
    if p.directions.references {
        queries.extend(composite(vec![IndexCategory::ConstructorRef], name, p.rule));
    }
}

fn plan_field(p: &FieldPattern, queries: &mut Vec<IndexQuery>) {
    if p.directions.declarations {
        queries.extend(composite(vec![IndexCategory::FieldDecl], p.name.as_ref(), p.rule));
    }
    if p.directions.references {
        queries.extend(simple(
            vec![IndexCategory::Ref],
            p.name.as_ref().map(NamePattern::as_str),
            p.rule,
        ));
    }
}

fn plan_super_type(p: &SuperTypeReferencePattern, queries: &mut Vec<IndexQuery>) {
    queries.extend(composite(
        vec![IndexCategory::SuperRef],
        p.super_type.simple_name.as_ref(),
        p.rule,
    ));
}

fn plan_package(p: &PackagePattern, queries: &mut Vec<IndexQuery>) {
    if p.directions.declarations {
        queries.extend(simple(
            vec![IndexCategory::PackageDecl],
            p.name.as_ref().map(NamePattern::as_str),
            p.rule,
        ));
    }
    if p.directions.references {
        // a non-exact dotted name says nothing reliable about its last segment
        let segment = match p.rule.mode {
            MatchMode::Exact if !p.name.as_ref().is_some_and(NamePattern::has_wildcards) => p.last_segment(),
            _ => None,
        };
        queries.extend(simple(vec![IndexCategory::Ref], segment, p.rule.with_mode(MatchMode::Exact)));
    }
}

/// Run every planned lookup and drop hits whose word was already seen.
pub fn execute(store: &dyn IndexStore, queries: &[IndexQuery]) -> SearchResult<Vec<EntryResult>> {
    let mut results: Vec<EntryResult> = Vec::new();
    for query in queries {
        tracing::debug!(categories = ?query.categories, key = ?query.key, mode = ?query.rule.mode, "index lookup");
        for entry in store.query(&query.categories, query.key.as_deref(), query.rule)? {
            let seen = results
                .iter()
                .any(|r| r.category == entry.category && r.word == entry.word);
            if !seen {
                results.push(entry);
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryIndex;
    use crate::index::IndexSink;
    use crate::pattern::{Directions, LocalVariablePattern};

    #[test]
    fn exact_method_reference_becomes_prefix_on_separator() {
        let p = MethodPattern::builder("foo").references().build().unwrap();
        let queries = plan(&p);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].categories, vec![IndexCategory::MethodRef]);
        assert_eq!(queries[0].key.as_deref(), Some("foo/"));
        assert_eq!(queries[0].rule.mode, MatchMode::Prefix);
    }

    #[test]
    fn camel_case_falls_back_to_unkeyed_lookup() {
        let p = TypePattern::new("NPE", Directions::DECLARATIONS, MatchRule::camel_case()).unwrap();
        let queries = plan(&p);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].key, None);
    }

    #[test]
    fn regexp_plans_nothing() {
        let p = TypePattern::new("W.*", Directions::DECLARATIONS, MatchRule::regexp()).unwrap();
        assert!(plan(&p).is_empty());
    }

    #[test]
    fn local_variables_bypass_the_index() {
        let p = LocalVariablePattern::new("i", "A.java", 4, Directions::ALL).unwrap();
        assert!(plan(&p).is_empty());
    }

    #[test]
    fn qualified_type_declaration_narrows_key() {
        let p = TypePattern::declarations("com.acme.Widget").unwrap();
        let queries = plan(&p);
        assert_eq!(queries[0].key.as_deref(), Some("Widget/com.acme/"));
    }

    #[test]
    fn prefix_with_qualification_issues_two_lookups() {
        let p = TypePattern::new("com.acme.Wid", Directions::DECLARATIONS, MatchRule::prefix()).unwrap();
        let queries = plan(&p);
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].key.as_deref(), Some("wid"));
        assert_eq!(queries[1].key.as_deref(), Some("wid*/com.acme*"));
    }

    #[test]
    fn field_references_query_the_ref_category() {
        let p = FieldPattern::new("count", None, None, Directions::ALL, MatchRule::default()).unwrap();
        let queries = plan(&p);
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].categories, vec![IndexCategory::Ref]);
        assert_eq!(queries[1].key.as_deref(), Some("count"));
    }

    #[test]
    fn execute_drops_duplicate_words() {
        let mut index = MemoryIndex::new();
        index.add_entry(IndexCategory::Ref, "Widget", "A.java").unwrap();
        let p = Pattern::or([
            TypePattern::references("Widget").unwrap(),
            TypePattern::references("Widget").unwrap(),
        ]);
        let hits = execute(&index, &plan(&p)).unwrap();
        assert_eq!(hits.len(), 1);
    }
}
