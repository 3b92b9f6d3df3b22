// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search engine facade
//!
//! Runs one query end to end: plan index lookups, validate the raw hits
//! against the pattern, map surviving document names to documents the scope
//! encloses, then hand the candidates to the batch scheduler which parses,
//! resolves and reports them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cancel::CancellationToken;
use crate::compiler::CompilerFactory;
use crate::config::EngineConfig;
use crate::element::{DefaultHandleFactory, HandleFactory};
use crate::errors::{SearchError, SearchResult};
use crate::index::{codec, planner, IndexStore};
use crate::java::JavaCompilerFactory;
use crate::locator::Locator;
use crate::matching::{BatchScheduler, Completion, MatchRecord, MatchReporter, PossibleMatch, SearchRequestor};
use crate::pattern::Pattern;
use crate::scanner::document_name;
use crate::scope::{DocumentProvider, FileSystemDocuments, SearchDocument, SearchScope};

/// A source root and the index that describes it.
pub struct IndexedRoot {
    pub root: PathBuf,
    pub store: Box<dyn IndexStore>,
}

pub struct SearchEngine {
    config: EngineConfig,
    roots: Vec<IndexedRoot>,
    documents: Box<dyn DocumentProvider>,
    compilers: Box<dyn CompilerFactory>,
    handles: Box<dyn HandleFactory>,
    cancel: CancellationToken,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        let compilers = JavaCompilerFactory::with_excludes(config.exclude_patterns.clone());
        Self {
            config,
            roots: Vec::new(),
            documents: Box::new(FileSystemDocuments::new()),
            compilers: Box::new(compilers),
            handles: Box::new(DefaultHandleFactory),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>, store: Box<dyn IndexStore>) -> Self {
        self.add_root(root, store);
        self
    }

    pub fn add_root(&mut self, root: impl Into<PathBuf>, store: Box<dyn IndexStore>) {
        self.roots.push(IndexedRoot {
            root: root.into(),
            store,
        });
    }

    pub fn with_documents(mut self, documents: Box<dyn DocumentProvider>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_compiler_factory(mut self, compilers: Box<dyn CompilerFactory>) -> Self {
        self.compilers = compilers;
        self
    }

    pub fn with_handle_factory(mut self, handles: Box<dyn HandleFactory>) -> Self {
        self.handles = handles;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle other threads can use to cancel a running query.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stream the matches of `pattern` inside `scope` to `requestor`.
    ///
    /// The requestor always sees `end_reporting`, telling it whether the
    /// matches it received are final.
    #[tracing::instrument(level = "info", skip_all, fields(pattern = %pattern))]
    pub fn search(
        &self,
        pattern: &Pattern,
        scope: &dyn SearchScope,
        requestor: &mut dyn SearchRequestor,
    ) -> SearchResult<()> {
        requestor.begin_reporting();
        let outcome = self.run(pattern, scope, requestor);
        let completion = match &outcome {
            Ok(()) => Completion::Finished,
            Err(SearchError::Cancelled) => Completion::Cancelled,
            Err(_) => Completion::Failed,
        };
        requestor.end_reporting(completion);
        outcome
    }

    /// Collect every match of `pattern` inside `scope`.
    pub fn search_all(&self, pattern: &Pattern, scope: &dyn SearchScope) -> SearchResult<Vec<MatchRecord>> {
        let mut records: Vec<MatchRecord> = Vec::new();
        self.search(pattern, scope, &mut records)?;
        Ok(records)
    }

    fn run(&self, pattern: &Pattern, scope: &dyn SearchScope, requestor: &mut dyn SearchRequestor) -> SearchResult<()> {
        let locator = Locator::new(pattern);
        let candidates = self.candidates(pattern, &locator, scope)?;
        let mut reporter = MatchReporter::new(requestor, self.handles.as_ref());
        let scheduler = BatchScheduler::new(
            self.compilers.as_ref(),
            &locator,
            self.config.max_batch_size,
            &self.cancel,
        );
        let stats = scheduler.run(candidates, &mut reporter)?;
        tracing::info!(
            roots = stats.roots,
            files = stats.files,
            batches = stats.batches,
            resolved = stats.resolved,
            skipped = stats.skipped,
            degraded = stats.degraded_roots,
            matches = reporter.reported(),
            "search finished"
        );
        Ok(())
    }

    /// Documents that may hold a match, working copies first.
    fn candidates(&self, pattern: &Pattern, locator: &Locator, scope: &dyn SearchScope) -> SearchResult<Vec<PossibleMatch>> {
        let queries = planner::plan(pattern);
        let working_copies = self.documents.working_copies();
        let mut candidates = Vec::new();

        for indexed in &self.roots {
            self.cancel.check()?;
            let root = indexed.root.as_path();
            let mut names: BTreeSet<String> = BTreeSet::new();
            match locator.declaring_document() {
                Some(path) => {
                    names.insert(document_name(root, path));
                }
                None => {
                    names.extend(
                        working_copies
                            .iter()
                            .filter(|doc| doc.root == root)
                            .map(|doc| doc.name.clone()),
                    );
                    names.extend(self.indexed_names(indexed.store.as_ref(), pattern, &queries)?);
                }
            }
            tracing::debug!(root = %root.display(), documents = names.len(), "index candidates");
            candidates.extend(
                self.documents_named(root, names)
                    .into_iter()
                    .filter(|doc| scope.encloses(doc))
                    .map(PossibleMatch::new),
            );
        }
        Ok(candidates)
    }

    fn indexed_names(
        &self,
        store: &dyn IndexStore,
        pattern: &Pattern,
        queries: &[planner::IndexQuery],
    ) -> SearchResult<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in planner::execute(store, queries)? {
            self.cancel.check()?;
            if pattern.matches_decoded_key(&codec::decode(entry.category, &entry.word)) {
                names.extend(entry.documents);
            }
        }
        Ok(names)
    }

    /// Working copies come first so they win when a name is listed twice.
    fn documents_named(&self, root: &Path, names: BTreeSet<String>) -> Vec<SearchDocument> {
        let mut documents: Vec<SearchDocument> = names
            .iter()
            .filter_map(|name| self.documents.document(root, name))
            .collect();
        documents.sort_by_key(|doc| !doc.working_copy);
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryIndex;
    use crate::index::writer::index_source;
    use crate::matching::Accuracy;
    use crate::pattern::{Directions, MatchRule, MethodPattern, TypePattern};
    use crate::ast::{NodeId, ParsedUnit};
    use crate::binding::Binding;
    use crate::compiler::Compiler;
    use crate::element::ElementHandle;
    use crate::errors::EnvironmentError;
    use crate::scope::WorkspaceScope;

    const ROOT: &str = "/virtual/project";

    /// Indexed sources plus unsaved ones the index has never seen.
    #[derive(Default)]
    struct Sources {
        saved: Vec<SearchDocument>,
        unsaved: Vec<SearchDocument>,
    }

    impl DocumentProvider for Sources {
        fn document(&self, root: &Path, name: &str) -> Option<SearchDocument> {
            self.unsaved
                .iter()
                .chain(self.saved.iter())
                .find(|d| d.root == root && d.name == name)
                .cloned()
        }

        fn working_copies(&self) -> Vec<SearchDocument> {
            self.unsaved.clone()
        }
    }

    fn engine_with(files: &[(&str, &str)], unsaved: &[(&str, &str)]) -> SearchEngine {
        let mut index = MemoryIndex::new();
        let mut sources = Sources::default();
        for (name, source) in files {
            index_source(&mut index, name, source).unwrap();
            sources.saved.push(SearchDocument::new(ROOT, *name, *source));
        }
        for (name, source) in unsaved {
            sources.unsaved.push(SearchDocument::working_copy(ROOT, *name, *source));
        }
        SearchEngine::new(EngineConfig::default())
            .with_root(ROOT, Box::new(index))
            .with_documents(Box::new(sources))
    }

    fn engine(files: &[(&str, &str)]) -> SearchEngine {
        engine_with(files, &[])
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl SearchRequestor for Recorder {
        fn begin_reporting(&mut self) {
            self.events.push("begin".into());
        }

        fn accept_match(&mut self, record: MatchRecord) {
            self.events.push(format!("match {}", record.offset));
        }

        fn end_reporting(&mut self, completion: Completion) {
            self.events.push(format!("end {:?}", completion));
        }
    }

    #[test]
    fn requestor_sees_the_whole_lifecycle() {
        let engine = engine(&[("A.java", "class A { void foo() { foo(); } }")]);
        let pattern = MethodPattern::builder("foo").references().build().unwrap();
        let mut recorder = Recorder::default();
        engine.search(&pattern, &WorkspaceScope, &mut recorder).unwrap();
        assert_eq!(recorder.events.first().map(String::as_str), Some("begin"));
        assert_eq!(recorder.events.last().map(String::as_str), Some("end Finished"));
        assert_eq!(recorder.events.len(), 3);
    }

    #[test]
    fn cancelled_queries_say_so() {
        let token = CancellationToken::new();
        let engine = engine(&[("A.java", "class A { void foo() { foo(); } }")]).with_cancellation(token.clone());
        token.cancel();
        assert!(engine.cancellation_token().is_cancelled());
        let pattern = MethodPattern::builder("foo").references().build().unwrap();
        let mut recorder = Recorder::default();
        let err = engine.search(&pattern, &WorkspaceScope, &mut recorder).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(recorder.events, vec!["begin".to_string(), "end Cancelled".to_string()]);
    }

    #[test]
    fn parameter_counts_narrow_declarations() {
        let engine = engine(&[
            ("A.java", "class A { void foo(int a) {} }"),
            ("B.java", "class B { void foo() {} void foo(int a, int b) {} }"),
        ]);
        let pattern = MethodPattern::builder("foo")
            .parameter_types(["int"])
            .declarations()
            .build()
            .unwrap();
        let records = engine.search_all(&pattern, &WorkspaceScope).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].document, "A.java");
        assert!(records[0].is_declaration);
    }

    #[test]
    fn regular_expressions_only_see_working_copies() {
        let engine = engine_with(&[("A.java", "class Alpha {}")], &[("B.java", "class Alfa {} class Beta {}")]);
        let pattern = TypePattern::new("Al.*", Directions::DECLARATIONS, MatchRule::regexp()).unwrap();
        let records = engine.search_all(&pattern, &WorkspaceScope).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].document, "B.java");
        assert_eq!(records[0].accuracy, Accuracy::Accurate);
    }

    #[test]
    fn working_copies_shadow_indexed_contents() {
        let engine = engine_with(
            &[("A.java", "class A { void foo() {} }")],
            &[("A.java", "class A {\n  void foo() {}\n}")],
        );
        let pattern = MethodPattern::builder("foo").declarations().build().unwrap();
        let records = engine.search_all(&pattern, &WorkspaceScope).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 2);
    }

    #[test]
    fn local_variables_only_look_at_their_document() {
        let source = "class A { void run() { int total = 1; total++; } }";
        let engine = engine(&[("A.java", source), ("B.java", "class B { int total; }")]);
        let offset = source.find("total").unwrap();
        let pattern =
            crate::pattern::LocalVariablePattern::new("total", "A.java", offset, Directions::ALL).unwrap();
        let records = engine.search_all(&pattern, &WorkspaceScope).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.document == "A.java"));
    }

    /// No lookup environment for any root.
    struct Unavailable;

    impl CompilerFactory for Unavailable {
        fn create(&self, root: &Path, _documents: &[SearchDocument]) -> Result<Box<dyn Compiler>, EnvironmentError> {
            Err(EnvironmentError {
                root: root.to_path_buf(),
                reason: "offline".into(),
            })
        }

        fn degraded(&self, root: &Path) -> Box<dyn Compiler> {
            JavaCompilerFactory::new().degraded(root)
        }
    }

    struct NoHandles;

    impl HandleFactory for NoHandles {
        fn declared(&self, _unit: &ParsedUnit, _id: NodeId) -> Option<ElementHandle> {
            None
        }

        fn resolved(&self, _binding: &Binding) -> Option<ElementHandle> {
            None
        }
    }

    const WIDGET_FILES: [(&str, &str); 2] = [
        ("p/Widget.java", "package p; class Widget { void foo(int x) {} }"),
        ("p/A.java", "package p; class A { void a(Widget w) { w.foo(1); } }"),
    ];

    fn foo_on_widget() -> Pattern {
        MethodPattern::builder("foo").declaring_type("Widget").references().build().unwrap()
    }

    #[test]
    fn unavailable_environments_downgrade_accuracy() {
        let accurate = engine(&WIDGET_FILES).search_all(&foo_on_widget(), &WorkspaceScope).unwrap();
        assert_eq!(accurate.len(), 1);
        assert!(accurate[0].is_accurate());

        let degraded = engine(&WIDGET_FILES)
            .with_compiler_factory(Box::new(Unavailable))
            .search_all(&foo_on_widget(), &WorkspaceScope)
            .unwrap();
        assert_eq!(degraded.len(), 1);
        assert_eq!(degraded[0].accuracy, Accuracy::Inaccurate);
    }

    #[test]
    fn generic_references_are_never_accurate_without_bindings() {
        let source = "import java.util.List;\nclass A { List<String> xs; }";
        let at = source.rfind("List").unwrap();
        let pattern = TypePattern::references("List").unwrap();

        let resolved = engine(&[("A.java", source)]).search_all(&pattern, &WorkspaceScope).unwrap();
        let field = resolved.iter().find(|r| r.offset == at).expect("field type reported");
        assert_eq!(field.accuracy, Accuracy::Accurate);

        let degraded = engine(&[("A.java", source)])
            .with_compiler_factory(Box::new(Unavailable))
            .search_all(&pattern, &WorkspaceScope)
            .unwrap();
        let field = degraded.iter().find(|r| r.offset == at).expect("field type reported");
        assert_eq!(field.accuracy, Accuracy::Inaccurate);
    }

    #[test]
    fn handle_factory_names_the_elements() {
        let pattern = MethodPattern::builder("foo").declarations().build().unwrap();
        let named = engine(&WIDGET_FILES).search_all(&pattern, &WorkspaceScope).unwrap();
        assert_eq!(named.len(), 1);
        let element = named[0].element.as_ref().expect("declared element");
        assert_eq!(element.qualified_name, "p.Widget.foo");
        assert_eq!(element.signature.as_deref(), Some("(int)"));

        let anonymous = engine(&WIDGET_FILES)
            .with_handle_factory(Box::new(NoHandles))
            .search_all(&pattern, &WorkspaceScope)
            .unwrap();
        assert_eq!(anonymous.len(), 1);
        assert!(anonymous[0].element.is_none());
    }
}
