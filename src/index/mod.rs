// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index layer: key codec, query planning and the stores that answer lookups.

pub mod codec;
pub mod memory;
pub mod planner;
pub mod tantivy_store;
pub mod writer;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SearchResult;
use crate::pattern::MatchRule;

/// The posting-list family an index key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexCategory {
    TypeDecl,
    MethodDecl,
    MethodRef,
    ConstructorDecl,
    ConstructorRef,
    FieldDecl,
    SuperRef,
    PackageDecl,
    /// Simple-name references: types, fields and package segments.
    Ref,
}

impl IndexCategory {
    pub const ALL: [IndexCategory; 9] = [
        IndexCategory::TypeDecl,
        IndexCategory::MethodDecl,
        IndexCategory::MethodRef,
        IndexCategory::ConstructorDecl,
        IndexCategory::ConstructorRef,
        IndexCategory::FieldDecl,
        IndexCategory::SuperRef,
        IndexCategory::PackageDecl,
        IndexCategory::Ref,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndexCategory::TypeDecl => "typeDecl",
            IndexCategory::MethodDecl => "methodDecl",
            IndexCategory::MethodRef => "methodRef",
            IndexCategory::ConstructorDecl => "constructorDecl",
            IndexCategory::ConstructorRef => "constructorRef",
            IndexCategory::FieldDecl => "fieldDecl",
            IndexCategory::SuperRef => "superRef",
            IndexCategory::PackageDecl => "packageDecl",
            IndexCategory::Ref => "ref",
        }
    }

    pub fn parse(text: &str) -> Option<IndexCategory> {
        Self::ALL.iter().copied().find(|c| c.as_str() == text)
    }
}

impl fmt::Display for IndexCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw hit: a key of a category plus the documents that contain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryResult {
    pub category: IndexCategory,
    pub word: String,
    pub documents: Vec<String>,
}

/// Read side of an index.
///
/// `key == None` asks for every entry of the categories. The rule's mode
/// decides how the key is compared against stored words: exact, prefix,
/// wildcard pattern or regular expression, honouring case sensitivity.
pub trait IndexStore {
    fn query(
        &self,
        categories: &[IndexCategory],
        key: Option<&str>,
        rule: MatchRule,
    ) -> SearchResult<Vec<EntryResult>>;
}

/// Write side of an index, fed by the source indexer.
pub trait IndexSink {
    /// Drop every entry previously recorded for a document.
    fn remove_document(&mut self, document: &str) -> SearchResult<()>;

    fn add_entry(&mut self, category: IndexCategory, key: &str, document: &str) -> SearchResult<()>;

    fn commit(&mut self) -> SearchResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_round_trip_through_names() {
        for category in IndexCategory::ALL {
            assert_eq!(IndexCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(IndexCategory::parse("nope"), None);
    }
}
