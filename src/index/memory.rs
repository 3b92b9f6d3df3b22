// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory index store.
//!
//! Used for tests, for working copies indexed on the fly, and as the
//! reference behaviour the tantivy store has to agree with.

use regex::RegexBuilder;
use std::collections::{BTreeMap, BTreeSet};

use super::{EntryResult, IndexCategory, IndexSink, IndexStore};
use crate::errors::{SearchError, SearchResult};
use crate::pattern::name::{prefix_equals, wildcard_match};
use crate::pattern::{MatchMode, MatchRule};

#[derive(Debug, Default, Clone)]
pub struct MemoryIndex {
    entries: BTreeMap<(IndexCategory, String), BTreeSet<String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn documents(&self) -> BTreeSet<String> {
        self.entries.values().flatten().cloned().collect()
    }
}

impl IndexStore for MemoryIndex {
    fn query(
        &self,
        categories: &[IndexCategory],
        key: Option<&str>,
        rule: MatchRule,
    ) -> SearchResult<Vec<EntryResult>> {
        let case_sensitive = rule.is_case_sensitive();
        let regex = match (rule.mode, key) {
            (MatchMode::Regexp, Some(k)) => Some(
                RegexBuilder::new(&format!("^(?:{})$", k))
                    .case_insensitive(!case_sensitive)
                    .build()
                    .map_err(|e| SearchError::Index(e.to_string()))?,
            ),
            _ => None,
        };

        let mut results = Vec::new();
        for ((category, word), documents) in &self.entries {
            if !categories.contains(category) {
                continue;
            }
            let matched = match key {
                None => true,
                Some(k) => match rule.mode {
                    MatchMode::Exact => {
                        if case_sensitive {
                            word == k
                        } else {
                            word.to_lowercase() == k.to_lowercase()
                        }
                    }
                    MatchMode::Prefix => prefix_equals(k, word, case_sensitive),
                    MatchMode::Pattern => wildcard_match(k, word, case_sensitive),
                    MatchMode::Regexp => regex.as_ref().is_some_and(|re| re.is_match(word)),
                },
            };
            if matched && !documents.is_empty() {
                results.push(EntryResult {
                    category: *category,
                    word: word.clone(),
                    documents: documents.iter().cloned().collect(),
                });
            }
        }
        Ok(results)
    }
}

impl IndexSink for MemoryIndex {
    fn remove_document(&mut self, document: &str) -> SearchResult<()> {
        for documents in self.entries.values_mut() {
            documents.remove(document);
        }
        self.entries.retain(|_, documents| !documents.is_empty());
        Ok(())
    }

    fn add_entry(&mut self, category: IndexCategory, key: &str, document: &str) -> SearchResult<()> {
        self.entries
            .entry((category, key.to_string()))
            .or_default()
            .insert(document.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.add_entry(IndexCategory::MethodRef, "foo/1", "A.java").unwrap();
        index.add_entry(IndexCategory::MethodRef, "foo/1", "B.java").unwrap();
        index.add_entry(IndexCategory::MethodRef, "foobar/0", "B.java").unwrap();
        index.add_entry(IndexCategory::Ref, "Widget", "A.java").unwrap();
        index
    }

    #[test]
    fn prefix_query_respects_categories() {
        let hits = index()
            .query(&[IndexCategory::MethodRef], Some("foo/"), MatchRule::prefix().case_sensitive())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].documents, vec!["A.java".to_string(), "B.java".to_string()]);
    }

    #[test]
    fn pattern_and_case_insensitive_queries() {
        let idx = index();
        let hits = idx
            .query(&[IndexCategory::MethodRef], Some("foo*"), MatchRule::pattern())
            .unwrap();
        assert_eq!(hits.len(), 2);
        let hits = idx
            .query(&[IndexCategory::Ref], Some("widget"), MatchRule::exact())
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn unkeyed_query_returns_whole_category() {
        let hits = index().query(&[IndexCategory::MethodRef], None, MatchRule::exact()).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn removing_a_document_drops_empty_entries() {
        let mut idx = index();
        idx.remove_document("B.java").unwrap();
        let hits = idx
            .query(&[IndexCategory::MethodRef], None, MatchRule::exact())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].documents, vec!["A.java".to_string()]);
    }
}
