// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch scheduling of candidate units
//!
//! Candidates are bucketed by source root so one lookup environment serves
//! every file of a root. Within a root they are processed in batches of at
//! most `max_batch_size`: the whole batch is parsed and matched first, then
//! each unit is resolved (when it has to be), reported and released.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::cancel::CancellationToken;
use crate::compiler::{Compiler, CompilerFactory};
use crate::errors::SearchResult;
use crate::locator::{Locator, ResolveContext};

use super::possible_match::PossibleMatch;
use super::report::MatchReporter;

/// Counters of one scheduled query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleStats {
    pub roots: usize,
    pub degraded_roots: usize,
    pub files: usize,
    pub batches: usize,
    pub resolved: usize,
    pub skipped: usize,
}

pub struct BatchScheduler<'a> {
    compilers: &'a dyn CompilerFactory,
    locator: &'a Locator,
    max_batch_size: usize,
    cancel: &'a CancellationToken,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(
        compilers: &'a dyn CompilerFactory,
        locator: &'a Locator,
        max_batch_size: usize,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            compilers,
            locator,
            max_batch_size: max_batch_size.max(1),
            cancel,
        }
    }

    /// Group candidates by root, sorted by name, duplicates dropped.
    pub fn bucket(candidates: Vec<PossibleMatch>) -> BTreeMap<PathBuf, Vec<PossibleMatch>> {
        let mut buckets: BTreeMap<PathBuf, Vec<PossibleMatch>> = BTreeMap::new();
        for candidate in candidates {
            buckets
                .entry(candidate.root().to_path_buf())
                .or_default()
                .push(candidate);
        }
        for bucket in buckets.values_mut() {
            bucket.sort_by(|a, b| a.document.name.cmp(&b.document.name));
            let mut seen = HashSet::new();
            bucket.retain(|c| seen.insert(c.compound_name().to_string()));
        }
        buckets
    }

    pub fn run(&self, candidates: Vec<PossibleMatch>, reporter: &mut MatchReporter<'_>) -> SearchResult<ScheduleStats> {
        let mut stats = ScheduleStats::default();
        for (root, mut bucket) in Self::bucket(candidates) {
            self.cancel.check()?;
            stats.roots += 1;
            stats.files += bucket.len();
            let documents: Vec<_> = bucket.iter().map(|c| c.document.clone()).collect();
            let (compiler, degraded) = match self.compilers.create(&root, &documents) {
                Ok(compiler) => (compiler, false),
                Err(err) => {
                    tracing::warn!(root = %root.display(), error = %err, "lookup environment unavailable; reporting without bindings");
                    stats.degraded_roots += 1;
                    (self.compilers.degraded(&root), true)
                }
            };
            for batch in bucket.chunks_mut(self.max_batch_size) {
                stats.batches += 1;
                self.process_batch(compiler.as_ref(), degraded, batch, reporter, &mut stats)?;
            }
        }
        Ok(stats)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(files = batch.len()))]
    fn process_batch(
        &self,
        compiler: &dyn Compiler,
        degraded: bool,
        batch: &mut [PossibleMatch],
        reporter: &mut MatchReporter<'_>,
        stats: &mut ScheduleStats,
    ) -> SearchResult<()> {
        for candidate in batch.iter_mut() {
            self.cancel.check()?;
            if let Err(abort) = candidate.parse(compiler, self.locator) {
                tracing::warn!(document = %candidate.document.name, reason = %abort.reason, "skipping file");
                stats.skipped += 1;
            }
        }

        for candidate in batch.iter_mut() {
            self.cancel.check()?;
            let resolve = !degraded && candidate.needs_resolution();
            let document = candidate.document.clone();
            let Some((unit, nodes)) = candidate.parts() else {
                continue;
            };
            if !resolve {
                reporter.report_unit(&document, unit, self.locator, nodes, None);
            } else {
                match compiler.build_bindings(unit) {
                    Ok(resolved) => {
                        stats.resolved += 1;
                        let ctx = ResolveContext::new(unit, &resolved, compiler);
                        reporter.report_unit(&document, unit, self.locator, nodes, Some(&ctx));
                    }
                    Err(abort) => {
                        tracing::warn!(document = %document.name, reason = %abort.reason, "compilation aborted; skipping file");
                        stats.skipped += 1;
                    }
                }
            }
            candidate.clean_up();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ContainerMask, ParsedUnit};
    use crate::binding::{MethodBinding, ResolvedUnit, TypeBinding};
    use crate::element::DefaultHandleFactory;
    use crate::errors::{CompileAbort, EnvironmentError};
    use crate::java::JavaCompilerFactory;
    use crate::matching::report::{Accuracy, MatchRecord};
    use crate::pattern::{MethodPattern, TypePattern};
    use crate::scope::SearchDocument;
    use std::path::Path;
    use std::sync::Arc;

    /// Delegates to the Java front end, failing where told to.
    struct Flaky {
        inner: JavaCompilerFactory,
        no_environment: bool,
        abort_binding_of: Option<&'static str>,
    }

    struct FlakyCompiler {
        inner: Box<dyn Compiler>,
        abort_binding_of: Option<&'static str>,
    }

    impl Compiler for FlakyCompiler {
        fn parse(&self, document: &SearchDocument, containers: ContainerMask) -> Result<ParsedUnit, CompileAbort> {
            self.inner.parse(document, containers)
        }

        fn build_bindings(&self, unit: &ParsedUnit) -> Result<ResolvedUnit, CompileAbort> {
            if self.abort_binding_of.is_some_and(|name| unit.path().ends_with(name)) {
                return Err(CompileAbort::new(unit.path(), "told to"));
            }
            self.inner.build_bindings(unit)
        }

        fn lookup_type(&self, qualified_name: &str) -> Option<Arc<TypeBinding>> {
            self.inner.lookup_type(qualified_name)
        }

        fn super_class(&self, ty: &TypeBinding) -> Option<Arc<TypeBinding>> {
            self.inner.super_class(ty)
        }

        fn super_interfaces(&self, ty: &TypeBinding) -> Vec<Arc<TypeBinding>> {
            self.inner.super_interfaces(ty)
        }

        fn all_types(&self) -> Vec<Arc<TypeBinding>> {
            self.inner.all_types()
        }

        fn declared_methods(&self, ty: &TypeBinding) -> Vec<Arc<MethodBinding>> {
            self.inner.declared_methods(ty)
        }
    }

    impl CompilerFactory for Flaky {
        fn create(&self, root: &Path, documents: &[SearchDocument]) -> Result<Box<dyn Compiler>, EnvironmentError> {
            if self.no_environment {
                return Err(EnvironmentError {
                    root: root.to_path_buf(),
                    reason: "told to".into(),
                });
            }
            Ok(Box::new(FlakyCompiler {
                inner: self.inner.create(root, documents)?,
                abort_binding_of: self.abort_binding_of,
            }))
        }

        fn degraded(&self, root: &Path) -> Box<dyn Compiler> {
            self.inner.degraded(root)
        }
    }

    fn candidates() -> Vec<PossibleMatch> {
        let root = "/virtual";
        vec![
            PossibleMatch::new(SearchDocument::new(root, "p/Widget.java", "package p; class Widget { void foo(int x) {} }")),
            PossibleMatch::new(SearchDocument::new(root, "p/A.java", "package p; class A { void a(Widget w) { w.foo(1); } }")),
            PossibleMatch::new(SearchDocument::new(root, "p/B.java", "package p; class B { void b(Widget w) { w.foo(2); } }")),
            PossibleMatch::new(SearchDocument::new(root, "p/A.java", "package p; class A { void a(Widget w) { w.foo(1); } }")),
        ]
    }

    fn run(factory: &dyn CompilerFactory, pattern: &crate::pattern::Pattern, batch: usize) -> (ScheduleStats, Vec<MatchRecord>) {
        let locator = Locator::new(pattern);
        let cancel = CancellationToken::new();
        let handles = DefaultHandleFactory;
        let mut records: Vec<MatchRecord> = Vec::new();
        let stats = {
            let mut reporter = MatchReporter::new(&mut records, &handles);
            BatchScheduler::new(factory, &locator, batch, &cancel)
                .run(candidates(), &mut reporter)
                .unwrap()
        };
        (stats, records)
    }

    fn foo_on_widget() -> crate::pattern::Pattern {
        MethodPattern::builder("foo").declaring_type("Widget").references().build().unwrap()
    }

    #[test]
    fn duplicates_collapse_and_batches_are_bounded() {
        let (stats, records) = run(&JavaCompilerFactory::new(), &foo_on_widget(), 2);
        assert_eq!(stats.files, 3);
        assert_eq!(stats.batches, 2);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.accuracy == Accuracy::Accurate));
        assert_eq!(records[0].document, "p/A.java");
    }

    #[test]
    fn one_unit_per_compound_name_even_when_names_interleave() {
        let root = "/virtual";
        let source = "package p; class A {}";
        let bucketed = BatchScheduler::bucket(vec![
            PossibleMatch::new(SearchDocument::new(root, "p/A.java", source)),
            PossibleMatch::new(SearchDocument::new(root, "p/A-copy.java", source)),
            PossibleMatch::new(SearchDocument::new(root, "p/A$Inner.java", source)),
        ]);
        let names: Vec<&str> = bucketed[Path::new(root)]
            .iter()
            .map(|c| c.document.name.as_str())
            .collect();
        assert_eq!(names, ["p/A$Inner.java", "p/A-copy.java"]);
    }

    #[test]
    fn syntactic_matches_skip_binding() {
        let pattern = TypePattern::declarations("Widget").unwrap();
        let (stats, records) = run(&JavaCompilerFactory::new(), &pattern, 10);
        assert_eq!(stats.resolved, 0);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_declaration);
    }

    #[test]
    fn missing_environment_degrades_to_inaccurate() {
        let factory = Flaky {
            inner: JavaCompilerFactory::new(),
            no_environment: true,
            abort_binding_of: None,
        };
        let (stats, records) = run(&factory, &foo_on_widget(), 10);
        assert_eq!(stats.degraded_roots, 1);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.accuracy == Accuracy::Inaccurate));
    }

    #[test]
    fn aborted_compilation_skips_only_that_file() {
        let factory = Flaky {
            inner: JavaCompilerFactory::new(),
            no_environment: false,
            abort_binding_of: Some("A.java"),
        };
        let (stats, records) = run(&factory, &foo_on_widget(), 10);
        assert_eq!(stats.skipped, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].document, "p/B.java");
    }

    #[test]
    fn cancellation_stops_the_run() {
        let locator = Locator::new(&foo_on_widget());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let handles = DefaultHandleFactory;
        let mut records: Vec<MatchRecord> = Vec::new();
        let mut reporter = MatchReporter::new(&mut records, &handles);
        let factory = JavaCompilerFactory::new();
        let err = BatchScheduler::new(&factory, &locator, 10, &cancel)
            .run(candidates(), &mut reporter)
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
