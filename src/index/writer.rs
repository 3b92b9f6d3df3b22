// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source indexer
//!
//! Parses every Java file of a root with all containers lowered and records
//! the codec keys of each declaration and reference it finds. A manifest of
//! blake3 content hashes next to the index lets a refresh touch only the
//! files that were added, changed or deleted since the last run.

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::codec::{
    self, ConstructorDeclKey, ConstructorRefKey, FieldDeclKey, MethodDeclKey, MethodRefKey, SuperKind, SuperRefKey,
    TypeDeclKey,
};
use super::tantivy_store::TantivyIndex;
use super::{IndexCategory, IndexSink};
use crate::ast::{ConstructorCallKind, ContainerMask, NodeFlags, NodeId, NodeKind, ParsedUnit, TypeRole};
use crate::errors::{SearchError, SearchResult};
use crate::java::lower::lower;
use crate::scanner::FileScanner;

/// Manifest location relative to a source root.
pub const MANIFEST_FILE: &str = ".codematch/manifest.json";

pub type IndexKey = (IndexCategory, String);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Document name to blake3 hash of its contents.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn load(root: &Path) -> Option<Manifest> {
        let content = std::fs::read_to_string(root.join(MANIFEST_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn write(&self, root: &Path) -> SearchResult<()> {
        let path = root.join(MANIFEST_FILE);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| SearchError::Index(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// What one indexing run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub scanned: usize,
    pub indexed: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub failed: usize,
    pub keys: usize,
}

pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Every index key a unit contributes.
pub fn unit_keys(unit: &ParsedUnit) -> BTreeSet<IndexKey> {
    let mut keys = BTreeSet::new();
    for id in unit.ids() {
        let node = unit.node(id);
        match &node.kind {
            NodeKind::Package { name, .. } => {
                keys.insert((IndexCategory::PackageDecl, name.clone()));
            }
            NodeKind::Import { tokens, .. } | NodeKind::QualifiedNameRef { tokens, .. } => {
                keys.extend(tokens.iter().map(|t| (IndexCategory::Ref, t.clone())));
            }
            NodeKind::TypeRef { tokens, .. } if !node.flags.contains(NodeFlags::IMPLICIT) => {
                keys.extend(tokens.iter().map(|t| (IndexCategory::Ref, t.clone())));
            }
            NodeKind::NameRef { name } | NodeKind::FieldAccess { name, .. } => {
                keys.insert((IndexCategory::Ref, name.clone()));
            }
            NodeKind::Type(decl) => {
                type_keys(unit, id, &mut keys);
                if decl.anonymous {
                    continue;
                }
                let super_types = decl
                    .superclass
                    .iter()
                    .chain(decl.interfaces.iter())
                    .filter_map(|&t| last_token(unit, t))
                    .collect();
                let key = TypeDeclKey {
                    simple_name: decl.name.clone(),
                    qualification: decl.qualification.clone(),
                    super_types,
                    modifiers: decl.modifiers,
                };
                keys.insert((IndexCategory::TypeDecl, codec::encode_type_decl(&key)));
            }
            NodeKind::Method(decl) => {
                let key = MethodDeclKey {
                    selector: decl.name.clone(),
                    parameter_types: parameter_types(unit, &decl.parameters),
                    parameter_names: parameter_names(unit, &decl.parameters),
                    return_type: decl.return_type.map_or_else(|| "void".to_string(), |t| written_type(unit, t)),
                    declaring_type: owner_name(unit, id),
                    modifiers: decl.modifiers,
                };
                keys.insert((IndexCategory::MethodDecl, codec::encode_method_decl(&key)));
            }
            NodeKind::Constructor(decl) => {
                let qualification = unit
                    .enclosing_type(id)
                    .and_then(|t| unit.type_decl(t))
                    .map(|t| t.qualification.clone())
                    .unwrap_or_default();
                let key = ConstructorDeclKey {
                    type_name: decl.name.clone(),
                    qualification,
                    parameter_types: parameter_types(unit, &decl.parameters),
                    parameter_names: parameter_names(unit, &decl.parameters),
                    modifiers: decl.modifiers,
                };
                keys.insert((IndexCategory::ConstructorDecl, codec::encode_constructor_decl(&key)));
            }
            NodeKind::Field(decl) => {
                let key = FieldDeclKey {
                    name: decl.name.clone(),
                    declaring_type: owner_name(unit, id),
                    field_type: decl.type_ref.map_or_else(|| "var".to_string(), |t| written_type(unit, t)),
                    modifiers: decl.modifiers,
                };
                keys.insert((IndexCategory::FieldDecl, codec::encode_field_decl(&key)));
            }
            NodeKind::MessageSend {
                selector, arguments, ..
            } => {
                let key = MethodRefKey {
                    selector: selector.clone(),
                    arg_count: arguments.len(),
                };
                keys.insert((IndexCategory::MethodRef, codec::encode_method_ref(&key)));
            }
            NodeKind::Allocation {
                type_ref, arguments, ..
            } => {
                if let Some(type_name) = last_token(unit, *type_ref) {
                    let key = ConstructorRefKey {
                        type_name,
                        arg_count: arguments.len(),
                    };
                    keys.insert((IndexCategory::ConstructorRef, codec::encode_constructor_ref(&key)));
                }
            }
            NodeKind::ExplicitConstructorCall { kind, arguments } => {
                let owner = unit.enclosing_type(id).and_then(|t| unit.type_decl(t));
                let type_name = match (kind, owner) {
                    (ConstructorCallKind::This, Some(owner)) => Some(owner.name.clone()),
                    (_, Some(owner)) => Some(
                        owner
                            .superclass
                            .and_then(|t| last_token(unit, t))
                            .unwrap_or_else(|| "Object".to_string()),
                    ),
                    (_, None) => None,
                };
                if let Some(type_name) = type_name {
                    let key = ConstructorRefKey {
                        type_name,
                        arg_count: arguments.len(),
                    };
                    keys.insert((IndexCategory::ConstructorRef, codec::encode_constructor_ref(&key)));
                }
            }
            _ => {}
        }
    }
    keys
}

/// Super type references written in a type header.
fn type_keys(unit: &ParsedUnit, id: NodeId, keys: &mut BTreeSet<IndexKey>) {
    let Some(decl) = unit.type_decl(id) else {
        return;
    };
    for &reference in decl.superclass.iter().chain(decl.interfaces.iter()) {
        let node = unit.node(reference);
        let NodeKind::TypeRef { tokens, role, .. } = &node.kind else {
            continue;
        };
        if node.flags.contains(NodeFlags::IMPLICIT) {
            continue;
        }
        let kind = match role {
            TypeRole::SuperInterface => SuperKind::Interface,
            _ => SuperKind::Class,
        };
        let Some((simple, qualification)) = tokens.split_last() else {
            continue;
        };
        let key = SuperRefKey {
            super_simple_name: simple.clone(),
            super_qualification: qualification.join("."),
            simple_name: decl.name.clone(),
            qualification: decl.qualification.clone(),
            kind,
            modifiers: decl.modifiers,
        };
        keys.insert((IndexCategory::SuperRef, codec::encode_super_ref(&key)));
    }
}

fn last_token(unit: &ParsedUnit, type_ref: NodeId) -> Option<String> {
    match unit.kind(type_ref) {
        NodeKind::TypeRef { tokens, .. } => tokens.last().cloned(),
        _ => None,
    }
}

/// Dotted name plus dimensions, without type arguments.
fn written_type(unit: &ParsedUnit, type_ref: NodeId) -> String {
    match unit.kind(type_ref) {
        NodeKind::TypeRef { tokens, dims, .. } => format!("{}{}", tokens.join("."), "[]".repeat(*dims)),
        _ => unit.text(unit.node(type_ref).span).to_string(),
    }
}

fn parameter_types(unit: &ParsedUnit, parameters: &[NodeId]) -> Vec<String> {
    parameters
        .iter()
        .map(|&p| match unit.kind(p) {
            NodeKind::Local(decl) => decl.type_ref.map_or_else(|| "var".to_string(), |t| written_type(unit, t)),
            _ => "?".to_string(),
        })
        .collect()
}

fn parameter_names(unit: &ParsedUnit, parameters: &[NodeId]) -> Vec<String> {
    parameters
        .iter()
        .filter_map(|&p| match unit.kind(p) {
            NodeKind::Local(decl) => Some(decl.name.clone()),
            _ => None,
        })
        .collect()
}

fn owner_name(unit: &ParsedUnit, id: NodeId) -> String {
    unit.enclosing_type(id)
        .and_then(|t| unit.type_decl(t))
        .map(|t| t.name.clone())
        .unwrap_or_default()
}

/// Parse `source` and record its keys under `name`, replacing earlier entries.
pub fn index_source(sink: &mut dyn IndexSink, name: &str, source: &str) -> SearchResult<usize> {
    let unit = lower(Path::new(name), Arc::from(source), ContainerMask::ALL)
        .map_err(|abort| SearchError::Index(abort.to_string()))?;
    let keys = unit_keys(&unit);
    write_keys(sink, name, &keys)?;
    Ok(keys.len())
}

fn write_keys(sink: &mut dyn IndexSink, name: &str, keys: &BTreeSet<IndexKey>) -> SearchResult<()> {
    sink.remove_document(name)?;
    for (category, key) in keys {
        sink.add_entry(*category, key, name)?;
    }
    Ok(())
}

/// Builds and refreshes the on-disk index of one root.
pub struct SourceIndexer {
    root: PathBuf,
    exclude_patterns: Vec<String>,
    force: bool,
    show_progress: bool,
}

impl SourceIndexer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_patterns: Vec::new(),
            force: false,
            show_progress: false,
        }
    }

    pub fn with_excludes(mut self, exclude_patterns: Vec<String>) -> Self {
        self.exclude_patterns = exclude_patterns;
        self
    }

    /// Rebuild from scratch instead of refreshing.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Index the root into its tantivy store.
    #[tracing::instrument(level = "info", skip_all, fields(root = %self.root.display()))]
    pub fn run(&self) -> SearchResult<IndexStats> {
        let previous = if self.force || !TantivyIndex::exists(&self.root) {
            None
        } else {
            Manifest::load(&self.root)
        };
        let mut store = TantivyIndex::open_for_writing(&self.root, previous.is_none())?;
        let (stats, manifest) = self.index_into(&mut store, previous.as_ref())?;
        store.commit()?;
        manifest.write(&self.root)?;
        tracing::info!(
            indexed = stats.indexed,
            unchanged = stats.unchanged,
            removed = stats.removed,
            keys = stats.keys,
            "index updated"
        );
        Ok(stats)
    }

    /// Index changed files into `sink`; `previous` is the manifest of what the sink already holds.
    pub fn index_into(&self, sink: &mut dyn IndexSink, previous: Option<&Manifest>) -> SearchResult<(IndexStats, Manifest)> {
        let files = FileScanner::with_excludes(&self.root, self.exclude_patterns.clone()).scan()?;
        let mut stats = IndexStats {
            scanned: files.len(),
            ..IndexStats::default()
        };
        let empty = Manifest::default();
        let previous = previous.unwrap_or(&empty);

        let mut manifest = Manifest::default();
        let mut changed = Vec::new();
        for file in &files {
            let hash = content_hash(&file.content);
            if previous.entries.get(&file.name) == Some(&hash) {
                stats.unchanged += 1;
            } else {
                changed.push(file);
            }
            manifest.entries.insert(file.name.clone(), hash);
        }

        let progress = if self.show_progress {
            let bar = ProgressBar::new(changed.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{spinner} indexing [{bar:30}] {pos}/{len} files") {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let parsed: Vec<(&str, Result<BTreeSet<IndexKey>, String>)> = changed
            .par_iter()
            .progress_with(progress.clone())
            .map(|file| {
                let keys = lower(&file.path, Arc::from(file.content.as_str()), ContainerMask::ALL)
                    .map(|unit| unit_keys(&unit))
                    .map_err(|abort| abort.reason);
                (file.name.as_str(), keys)
            })
            .collect();
        progress.finish_and_clear();

        for (name, keys) in parsed {
            match keys {
                Ok(keys) => {
                    stats.keys += keys.len();
                    stats.indexed += 1;
                    write_keys(sink, name, &keys)?;
                }
                Err(reason) => {
                    tracing::warn!(document = name, %reason, "not indexed");
                    stats.failed += 1;
                    sink.remove_document(name)?;
                    // retried on the next run
                    manifest.entries.remove(name);
                }
            }
        }

        let present: BTreeSet<&str> = files.iter().map(|f| f.name.as_str()).collect();
        for name in previous.entries.keys() {
            if !present.contains(name.as_str()) {
                sink.remove_document(name)?;
                stats.removed += 1;
            }
        }
        Ok((stats, manifest))
    }
}
