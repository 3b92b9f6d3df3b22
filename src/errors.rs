// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types with helpful suggestions
//!
//! `SearchError` is what the engine returns to its caller. `CompileAbort` is the
//! per-file failure a compiler front end reports; the scheduler turns it into
//! "skip this file" instead of failing the query.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a search query.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The pattern could not be constructed (bad parameter arrays, bad rule, bad regexp).
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// The query was cancelled through its `CancellationToken`.
    #[error("search cancelled")]
    Cancelled,

    /// The index store failed to answer a lookup.
    #[error("index error: {0}")]
    Index(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SearchError {
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Self::InvalidPattern(message.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        Self::Index(err.to_string())
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

/// A compiler front end gave up on one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("compilation aborted for {}: {reason}", path.display())]
pub struct CompileAbort {
    pub path: PathBuf,
    pub reason: String,
}

impl CompileAbort {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// The lookup environment of a source root could not be created.
#[derive(Debug, Clone, Error)]
#[error("environment unavailable for {}: {reason}", root.display())]
pub struct EnvironmentError {
    pub root: PathBuf,
    pub reason: String,
}

/// Error indicating the search index was not found
#[derive(Debug)]
pub struct IndexNotFoundError {
    pub index_path: String,
}

impl fmt::Display for IndexNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index not found at '{}'\n\n\
             Suggestion: Run 'codematch index' to create the search index first.\n\
             Example: codematch index\n\
             Or with a specific path: codematch index /path/to/project",
            self.index_path
        )
    }
}

impl std::error::Error for IndexNotFoundError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_not_found_error() {
        let err = IndexNotFoundError {
            index_path: "/path/to/index".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Index not found"));
        assert!(msg.contains("codematch index"));
    }

    #[test]
    fn test_compile_abort_mentions_path() {
        let err = CompileAbort::new("src/A.java", "syntax error");
        assert!(err.to_string().contains("src/A.java"));
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn test_cancelled_is_detected() {
        assert!(SearchError::Cancelled.is_cancelled());
        assert!(!SearchError::invalid_pattern("x").is_cancelled());
    }
}
