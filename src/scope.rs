// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search documents, where they come from, and which of them a query may see.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pattern::name::wildcard_match;

/// One source file as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDocument {
    /// Root-relative path with `/` separators; this is the name the index records.
    pub name: String,
    pub root: PathBuf,
    pub contents: Arc<str>,
    /// An unsaved in-memory copy that shadows the file on disk.
    pub working_copy: bool,
}

impl SearchDocument {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, contents: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            contents: contents.into(),
            working_copy: false,
        }
    }

    pub fn working_copy(root: impl Into<PathBuf>, name: impl Into<String>, contents: impl Into<Arc<str>>) -> Self {
        Self {
            working_copy: true,
            ..Self::new(root, name, contents)
        }
    }

    /// File system location.
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    /// Package directory plus file stem: `com/acme/Widget`.
    pub fn compound_name(&self) -> &str {
        let name = self.name.strip_suffix(".java").unwrap_or(&self.name);
        match name.find('$') {
            Some(dollar) => &name[..dollar],
            None => name,
        }
    }
}

/// Maps index document names to documents.
pub trait DocumentProvider {
    fn document(&self, root: &Path, name: &str) -> Option<SearchDocument>;

    /// In-memory copies that may not be indexed yet.
    fn working_copies(&self) -> Vec<SearchDocument>;
}

/// Reads files from disk, preferring registered working copies.
#[derive(Debug, Default, Clone)]
pub struct FileSystemDocuments {
    working_copies: BTreeMap<(PathBuf, String), Arc<str>>,
}

impl FileSystemDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_working_copy(&mut self, root: impl Into<PathBuf>, name: impl Into<String>, contents: impl Into<Arc<str>>) {
        self.working_copies
            .insert((root.into(), name.into()), contents.into());
    }
}

impl DocumentProvider for FileSystemDocuments {
    fn document(&self, root: &Path, name: &str) -> Option<SearchDocument> {
        if let Some(contents) = self.working_copies.get(&(root.to_path_buf(), name.to_string())) {
            return Some(SearchDocument::working_copy(root, name, Arc::clone(contents)));
        }
        match std::fs::read_to_string(root.join(name)) {
            Ok(contents) => Some(SearchDocument::new(root, name, contents)),
            Err(err) => {
                tracing::debug!(document = name, error = %err, "indexed document is unreadable");
                None
            }
        }
    }

    fn working_copies(&self) -> Vec<SearchDocument> {
        self.working_copies
            .iter()
            .map(|((root, name), contents)| SearchDocument::working_copy(root, name, Arc::clone(contents)))
            .collect()
    }
}

/// Decides which documents a query may report from.
pub trait SearchScope {
    fn encloses(&self, document: &SearchDocument) -> bool;
}

/// Every document of every root.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceScope;

impl SearchScope for WorkspaceScope {
    fn encloses(&self, _document: &SearchDocument) -> bool {
        true
    }
}

/// Documents under some root-relative path prefixes, minus excluded ones.
///
/// Excludes containing `*` or `?` are wildcards over the document name;
/// anything else excludes names that contain it.
#[derive(Debug, Default, Clone)]
pub struct PathScope {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl PathScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().replace('\\', "/");
        let prefix = prefix.trim_start_matches("./").trim_end_matches('/').to_string();
        if !prefix.is_empty() && prefix != "." {
            self.include.push(prefix);
        }
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }
}

impl SearchScope for PathScope {
    fn encloses(&self, document: &SearchDocument) -> bool {
        let name = document.name.as_str();
        let included = self.include.is_empty()
            || self.include.iter().any(|prefix| {
                name == prefix
                    || name
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            });
        if !included {
            return false;
        }
        !self.exclude.iter().any(|pattern| {
            if pattern.contains(['*', '?']) {
                wildcard_match(pattern, name, true)
            } else {
                name.contains(pattern.as_str())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> SearchDocument {
        SearchDocument::new("/repo", name, "")
    }

    #[test]
    fn path_scope_includes_whole_directories_only() {
        let scope = PathScope::new().include("src/main");
        assert!(scope.encloses(&doc("src/main/A.java")));
        assert!(!scope.encloses(&doc("src/mainline/A.java")));
        assert!(!scope.encloses(&doc("test/A.java")));
    }

    #[test]
    fn path_scope_excludes() {
        let scope = PathScope::new().exclude("generated").exclude("*Test.java");
        assert!(!scope.encloses(&doc("src/generated/A.java")));
        assert!(!scope.encloses(&doc("src/WidgetTest.java")));
        assert!(scope.encloses(&doc("src/Widget.java")));
    }

    #[test]
    fn compound_names_strip_nested_suffixes() {
        assert_eq!(doc("com/acme/Widget.java").compound_name(), "com/acme/Widget");
        assert_eq!(doc("com/acme/Widget$Inner.java").compound_name(), "com/acme/Widget");
    }

    #[test]
    fn working_copies_shadow_disk() {
        let mut docs = FileSystemDocuments::new();
        docs.add_working_copy("/nowhere", "A.java", "class A {}");
        let found = docs.document(Path::new("/nowhere"), "A.java").unwrap();
        assert!(found.working_copy);
        assert_eq!(&*found.contents, "class A {}");
        assert!(docs.document(Path::new("/nowhere"), "B.java").is_none());
    }
}
