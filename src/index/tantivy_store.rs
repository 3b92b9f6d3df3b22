// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk index store backed by tantivy.
//!
//! One tantivy document per (category, key, path). Every field is a raw,
//! untokenized string: `key` keeps the original casing for case sensitive
//! lookups and `key_lower` serves the case insensitive ones.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tantivy::{
    collector::DocSetCollector,
    doc,
    query::{AllQuery, BooleanQuery, Occur, Query, RegexQuery, TermQuery},
    schema::{Field, IndexRecordOption, Schema, Value, STORED, STRING},
    Index, IndexWriter, ReloadPolicy, TantivyDocument, Term,
};

use super::{EntryResult, IndexCategory, IndexSink, IndexStore};
use crate::errors::{SearchError, SearchResult};
use crate::pattern::{MatchMode, MatchRule};

/// Index directory relative to a source root.
pub const INDEX_DIR: &str = ".codematch/index";

const WRITER_HEAP_BYTES: usize = 50_000_000;

#[derive(Debug, Clone, Copy)]
struct Fields {
    category: Field,
    key: Field,
    key_lower: Field,
    path: Field,
}

fn build_schema() -> (Schema, Fields) {
    let mut builder = Schema::builder();
    let category = builder.add_text_field("category", STRING | STORED);
    let key = builder.add_text_field("key", STRING | STORED);
    let key_lower = builder.add_text_field("key_lower", STRING);
    let path = builder.add_text_field("path", STRING | STORED);
    (
        builder.build(),
        Fields {
            category,
            key,
            key_lower,
            path,
        },
    )
}

fn resolve_fields(schema: &Schema) -> SearchResult<Fields> {
    let get = |name: &str| {
        schema
            .get_field(name)
            .map_err(|_| SearchError::Index(format!("index schema has no '{}' field", name)))
    };
    Ok(Fields {
        category: get("category")?,
        key: get("key")?,
        key_lower: get("key_lower")?,
        path: get("path")?,
    })
}

pub struct TantivyIndex {
    index: Index,
    fields: Fields,
    location: PathBuf,
    writer: Option<IndexWriter>,
}

impl TantivyIndex {
    pub fn index_path(root: &Path) -> PathBuf {
        root.join(INDEX_DIR)
    }

    pub fn exists(root: &Path) -> bool {
        Self::index_path(root).join("meta.json").exists()
    }

    /// Open the index of `root` for reading.
    pub fn open(root: &Path) -> SearchResult<Self> {
        let location = Self::index_path(root);
        let index = Index::open_in_dir(&location)?;
        let fields = resolve_fields(&index.schema())?;
        Ok(Self {
            index,
            fields,
            location,
            writer: None,
        })
    }

    /// Open the index of `root` for writing, creating it when missing or when `fresh`.
    pub fn open_for_writing(root: &Path, fresh: bool) -> SearchResult<Self> {
        let location = Self::index_path(root);
        if fresh && location.exists() {
            fs::remove_dir_all(&location)?;
        }
        let index = if Self::exists(root) {
            Index::open_in_dir(&location)?
        } else {
            fs::create_dir_all(&location)?;
            let (schema, _) = build_schema();
            Index::create_in_dir(&location, schema)?
        };
        let fields = resolve_fields(&index.schema())?;
        let writer: IndexWriter = index.writer(WRITER_HEAP_BYTES)?;
        Ok(Self {
            index,
            fields,
            location,
            writer: Some(writer),
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    fn writer(&mut self) -> SearchResult<&mut IndexWriter> {
        self.writer
            .as_mut()
            .ok_or_else(|| SearchError::Index("index was opened read-only".to_string()))
    }

    fn key_query(&self, key: &str, rule: MatchRule) -> SearchResult<Box<dyn Query>> {
        let case_sensitive = rule.is_case_sensitive();
        let (field, key) = if case_sensitive {
            (self.fields.key, key.to_string())
        } else {
            (self.fields.key_lower, key.to_lowercase())
        };
        let query: Box<dyn Query> = match rule.mode {
            MatchMode::Exact => Box::new(TermQuery::new(
                Term::from_field_text(field, &key),
                IndexRecordOption::Basic,
            )),
            MatchMode::Prefix => Box::new(RegexQuery::from_pattern(
                &format!("{}.*", regex::escape(&key)),
                field,
            )?),
            MatchMode::Pattern => Box::new(RegexQuery::from_pattern(&wildcard_to_regex(&key), field)?),
            MatchMode::Regexp => Box::new(RegexQuery::from_pattern(&key, field)?),
        };
        Ok(query)
    }
}

/// Translate `*` / `?` wildcards into an anchored-by-construction tantivy regex.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out
}

impl IndexStore for TantivyIndex {
    fn query(
        &self,
        categories: &[IndexCategory],
        key: Option<&str>,
        rule: MatchRule,
    ) -> SearchResult<Vec<EntryResult>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }
        let category_clauses: Vec<(Occur, Box<dyn Query>)> = categories
            .iter()
            .map(|category| {
                let term = Term::from_field_text(self.fields.category, category.as_str());
                let query: Box<dyn Query> = Box::new(TermQuery::new(term, IndexRecordOption::Basic));
                (Occur::Should, query)
            })
            .collect();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> =
            vec![(Occur::Must, Box::new(BooleanQuery::new(category_clauses)))];
        match key {
            Some(key) => clauses.push((Occur::Must, self.key_query(key, rule)?)),
            None => clauses.push((Occur::Must, Box::new(AllQuery))),
        }
        let query = BooleanQuery::new(clauses);

        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let searcher = reader.searcher();
        let docset = searcher.search(&query, &DocSetCollector)?;

        let mut grouped: BTreeMap<(IndexCategory, String), BTreeSet<String>> = BTreeMap::new();
        for address in docset {
            let doc: TantivyDocument = searcher.doc(address)?;
            let category = doc
                .get_first(self.fields.category)
                .and_then(|v| v.as_str())
                .and_then(IndexCategory::parse);
            let word = doc.get_first(self.fields.key).and_then(|v| v.as_str());
            let path = doc.get_first(self.fields.path).and_then(|v| v.as_str());
            if let (Some(category), Some(word), Some(path)) = (category, word, path) {
                grouped
                    .entry((category, word.to_string()))
                    .or_default()
                    .insert(path.to_string());
            }
        }

        Ok(grouped
            .into_iter()
            .map(|((category, word), documents)| EntryResult {
                category,
                word,
                documents: documents.into_iter().collect(),
            })
            .collect())
    }
}

impl IndexSink for TantivyIndex {
    fn remove_document(&mut self, document: &str) -> SearchResult<()> {
        let term = Term::from_field_text(self.fields.path, document);
        self.writer()?.delete_term(term);
        Ok(())
    }

    fn add_entry(&mut self, category: IndexCategory, key: &str, document: &str) -> SearchResult<()> {
        let fields = self.fields;
        let entry = doc!(
            fields.category => category.as_str(),
            fields.key => key,
            fields.key_lower => key.to_lowercase(),
            fields.path => document,
        );
        self.writer()?.add_document(entry)?;
        Ok(())
    }

    fn commit(&mut self) -> SearchResult<()> {
        self.writer()?.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated() -> (TempDir, TantivyIndex) {
        let dir = TempDir::new().unwrap();
        let mut index = TantivyIndex::open_for_writing(dir.path(), true).unwrap();
        index.add_entry(IndexCategory::MethodRef, "foo/1", "A.java").unwrap();
        index.add_entry(IndexCategory::MethodRef, "foo/1", "B.java").unwrap();
        index.add_entry(IndexCategory::MethodRef, "fooBar/0", "B.java").unwrap();
        index.add_entry(IndexCategory::Ref, "Widget", "A.java").unwrap();
        index.commit().unwrap();
        (dir, index)
    }

    #[test]
    fn prefix_lookup_groups_documents_by_word() {
        let (_dir, index) = populated();
        let hits = index
            .query(&[IndexCategory::MethodRef], Some("foo/"), MatchRule::prefix().case_sensitive())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].documents, vec!["A.java".to_string(), "B.java".to_string()]);
    }

    #[test]
    fn case_insensitive_exact_and_wildcards() {
        let (_dir, index) = populated();
        let hits = index
            .query(&[IndexCategory::Ref], Some("widget"), MatchRule::exact())
            .unwrap();
        assert_eq!(hits.len(), 1);
        let hits = index
            .query(&[IndexCategory::MethodRef], Some("foo*"), MatchRule::pattern())
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn removed_documents_disappear_after_commit() {
        let (dir, mut index) = populated();
        index.remove_document("B.java").unwrap();
        index.commit().unwrap();
        let reopened = TantivyIndex::open(dir.path()).unwrap();
        let hits = reopened
            .query(&[IndexCategory::MethodRef], None, MatchRule::exact())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].documents, vec!["A.java".to_string()]);
    }
}
