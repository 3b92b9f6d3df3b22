// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source root walking and document naming

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::errors::{SearchError, SearchResult};
use crate::index::tantivy_store::INDEX_DIR;

/// A Java file read during a scan.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Root-relative name with `/` separators.
    pub name: String,
    pub content: String,
}

/// Walks a source root for Java files, honouring ignore files and excludes.
pub struct FileScanner {
    root: PathBuf,
    exclude_patterns: Vec<String>,
}

/// Root-relative document name of `path`.
pub fn document_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn is_java_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("java"))
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_excludes(root, Vec::new())
    }

    /// Paths containing any of `excludes` are skipped.
    pub fn with_excludes(root: impl AsRef<Path>, excludes: Vec<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclude_patterns: excludes,
        }
    }

    fn walker(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.root);
        // .gitignore applies outside a checkout too
        builder.hidden(false).require_git(false);
        builder
    }

    /// Paths of every Java file under the root.
    pub fn list_files(&self) -> SearchResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(SearchError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            )));
        }
        let index_dir = INDEX_DIR.split('/').next().unwrap_or(".codematch").to_string();
        let walker = self
            .walker()
            .filter_entry(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| name != index_dir && name != ".git" && name != ".hg" && name != ".svn")
                    .unwrap_or(true)
            })
            .build_parallel();

        let (tx, rx) = mpsc::channel();
        let exclude_patterns = self.exclude_patterns.clone();
        walker.run(|| {
            let tx = tx.clone();
            let exclude_patterns = exclude_patterns.clone();
            Box::new(move |entry| {
                let Ok(entry) = entry else {
                    return ignore::WalkState::Continue;
                };
                let path = entry.path();
                let path_str = path.to_string_lossy();
                if exclude_patterns.iter().any(|pattern| path_str.contains(pattern.as_str())) {
                    return ignore::WalkState::Continue;
                }
                if path.is_file() && is_java_source(path) {
                    let _ = tx.send(path.to_path_buf());
                }
                ignore::WalkState::Continue
            })
        });
        drop(tx);

        let mut files: Vec<PathBuf> = rx.into_iter().collect();
        files.sort();
        Ok(files)
    }

    /// Every readable Java file with its content, sorted by path.
    pub fn scan(&self) -> SearchResult<Vec<ScannedFile>> {
        let files = self.list_files()?;
        Ok(files
            .into_iter()
            .filter_map(|path| match std::fs::read_to_string(&path) {
                Ok(content) => Some(ScannedFile {
                    name: document_name(&self.root, &path),
                    path,
                    content,
                }),
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collects_java_sources_only() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/com/acme")).unwrap();
        fs::create_dir_all(dir.path().join("generated")).unwrap();
        fs::write(dir.path().join("src/com/acme/Widget.java"), "class Widget {}").unwrap();
        fs::write(dir.path().join("src/com/acme/notes.txt"), "not java").unwrap();
        fs::write(dir.path().join("generated/Gen.java"), "class Gen {}").unwrap();

        let files = FileScanner::with_excludes(dir.path(), vec!["generated".to_string()])
            .scan()
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["src/com/acme/Widget.java"]);
    }

    #[test]
    fn respects_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/Out.java"), "class Out {}").unwrap();
        fs::write(dir.path().join("Main.java"), "class Main {}").unwrap();

        let files = FileScanner::new(dir.path()).list_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Main.java"));
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(FileScanner::new("/definitely/not/here").list_files().is_err());
    }
}
