// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared utility functions

use std::path::{Path, PathBuf};

use crate::index::tantivy_store::TantivyIndex;

/// The nearest directory at or above `start` that holds an index.
pub fn get_root_with_index(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| TantivyIndex::exists(dir))
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_the_index_of_an_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/main/java");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(get_root_with_index(&nested), None);

        std::fs::create_dir_all(TantivyIndex::index_path(dir.path())).unwrap();
        std::fs::write(TantivyIndex::index_path(dir.path()).join("meta.json"), "{}").unwrap();
        assert_eq!(get_root_with_index(&nested).as_deref(), Some(dir.path()));
    }
}
