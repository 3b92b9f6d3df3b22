// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match records and the reporter that turns graded nodes into them.

use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::ast::{ContainerMask, NodeFlags, NodeId, NodeKind, ParsedUnit, Span};
use crate::binding::Binding;
use crate::element::{ElementHandle, HandleFactory};
use crate::level::{MatchFlavor, MatchLevel};
use crate::locator::{Candidate, Locator, NodeSet, ResolveContext, RuleBits};
use crate::scope::SearchDocument;

/// Accuracy of a reported match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Inaccurate,
    Accurate,
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accuracy::Accurate => write!(f, "accurate"),
            Accuracy::Inaccurate => write!(f, "inaccurate"),
        }
    }
}

/// One confirmed match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// File system location of the document.
    pub path: PathBuf,
    /// Root-relative document name.
    pub document: String,
    /// The declared element for a declaration, the enclosing element for a reference.
    pub element: Option<ElementHandle>,
    /// What a reference resolved to, when bindings were built.
    pub target: Option<ElementHandle>,
    pub accuracy: Accuracy,
    pub rule: RuleBits,
    pub flavor: MatchFlavor,
    pub offset: usize,
    pub length: usize,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
    pub is_declaration: bool,
    pub is_read_access: bool,
    pub is_write_access: bool,
    pub is_inside_doc_comment: bool,
}

impl MatchRecord {
    pub fn is_accurate(&self) -> bool {
        self.accuracy == Accuracy::Accurate
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for (bit, name) in [
            (RuleBits::EXACT, "exact"),
            (RuleBits::EQUIVALENT, "equivalent"),
            (RuleBits::ERASURE, "erasure"),
        ] {
            if self.rule.contains(bit) {
                names.push(name);
            }
        }
        names
    }

    /// Dispatch flavors only; name flavors stay internal.
    pub fn flavor_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for (bit, name) in [
            (MatchFlavor::SUPER_INVOCATION, "super_invocation"),
            (MatchFlavor::SUB_INVOCATION, "sub_invocation"),
            (MatchFlavor::OVERRIDDEN_METHOD, "overridden"),
            (MatchFlavor::POLYMORPHIC, "polymorphic"),
        ] {
            if self.flavor.contains(bit) {
                names.push(name);
            }
        }
        names
    }
}

/// How a query ended, as told to the requestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Finished,
    /// Matches streamed so far are not final.
    Cancelled,
    Failed,
}

/// Receives matches as they are confirmed.
pub trait SearchRequestor {
    fn begin_reporting(&mut self) {}

    fn accept_match(&mut self, record: MatchRecord);

    fn end_reporting(&mut self, _completion: Completion) {}
}

impl SearchRequestor for Vec<MatchRecord> {
    fn accept_match(&mut self, record: MatchRecord) {
        self.push(record);
    }
}

/// Bindings never confirmed this candidate, so it reports as inaccurate at best.
fn unverified(mut candidate: Candidate) -> Candidate {
    candidate.level = candidate.level.capped_at_possible();
    candidate
}

/// Container a node lives in, judged by its innermost enclosing member.
pub fn container_of(unit: &ParsedUnit, id: NodeId) -> ContainerMask {
    match unit.enclosing_member(id).map(|m| unit.kind(m)) {
        None => ContainerMask::COMPILATION_UNIT,
        Some(NodeKind::Type(_)) => ContainerMask::CLASS,
        Some(NodeKind::Field(_)) => ContainerMask::FIELD,
        Some(_) => ContainerMask::METHOD,
    }
}

/// Turns the graded nodes of each unit into records for a requestor.
pub struct MatchReporter<'a> {
    requestor: &'a mut dyn SearchRequestor,
    handles: &'a dyn HandleFactory,
    reported: usize,
}

impl<'a> MatchReporter<'a> {
    pub fn new(requestor: &'a mut dyn SearchRequestor, handles: &'a dyn HandleFactory) -> Self {
        Self {
            requestor,
            handles,
            reported: 0,
        }
    }

    /// Records handed to the requestor so far.
    pub fn reported(&self) -> usize {
        self.reported
    }

    /// Report every match of one unit.
    ///
    /// Nodes settled by syntax are reported as they stand. Possible nodes are
    /// graded against `ctx`; without one they can only be inaccurate.
    pub fn report_unit(
        &mut self,
        document: &SearchDocument,
        unit: &ParsedUnit,
        locator: &Locator,
        nodes: &mut NodeSet,
        ctx: Option<&ResolveContext<'_>>,
    ) {
        let containers = locator.containers();
        let mut found: Vec<(NodeId, Candidate)> = Vec::new();

        for (id, _) in nodes.matching_nodes() {
            nodes.remove(id);
            found.extend(
                locator
                    .occurrences(unit, id, None)
                    .into_iter()
                    .map(|c| (id, if c.force_resolve { unverified(c) } else { c })),
            );
        }
        for (id, _) in nodes.possible_nodes() {
            match ctx {
                Some(ctx) => {
                    let level = locator.resolve_level(ctx, id);
                    nodes.settle(id, level);
                    if level.is_impossible() {
                        continue;
                    }
                    found.extend(locator.occurrences(unit, id, Some(ctx)).into_iter().map(|c| (id, c)));
                }
                None => found.extend(locator.occurrences(unit, id, None).into_iter().map(|c| (id, unverified(c)))),
            }
            nodes.remove(id);
        }

        found.sort_by_key(|(_, c)| (c.span.start, c.span.end));
        let mut seen: HashSet<Span> = HashSet::new();
        for (id, candidate) in found {
            if !containers.contains(container_of(unit, id)) || !seen.insert(candidate.span) {
                continue;
            }
            let record = self.record(document, unit, id, &candidate, ctx);
            self.requestor.accept_match(record);
            self.reported += 1;
        }
    }

    fn record(
        &self,
        document: &SearchDocument,
        unit: &ParsedUnit,
        id: NodeId,
        candidate: &Candidate,
        ctx: Option<&ResolveContext<'_>>,
    ) -> MatchRecord {
        let accuracy = match candidate.level.level {
            MatchLevel::Accurate => Accuracy::Accurate,
            _ => Accuracy::Inaccurate,
        };
        let element = self
            .handles
            .declared(unit, id)
            .or_else(|| self.handles.enclosing(unit, id));
        let target = match ctx {
            Some(ctx) if !candidate.declaration => {
                target_binding(ctx, unit, id, candidate.span).and_then(|b| self.handles.resolved(b))
            }
            _ => None,
        };
        let (line, column) = unit.line_column(candidate.span.start);
        MatchRecord {
            path: document.path(),
            document: document.name.clone(),
            element,
            target,
            accuracy,
            rule: candidate.rule,
            flavor: candidate.level.flavor,
            offset: candidate.span.start,
            length: candidate.span.len(),
            line,
            column,
            is_declaration: candidate.declaration,
            is_read_access: candidate.read,
            is_write_access: candidate.write,
            is_inside_doc_comment: unit.node(id).flags.contains(NodeFlags::IN_DOC_COMMENT),
        }
    }
}

/// Binding of the token a candidate covers, or of the whole node.
fn target_binding<'c>(ctx: &'c ResolveContext<'_>, unit: &ParsedUnit, id: NodeId, span: Span) -> Option<&'c Binding> {
    let spans = match unit.kind(id) {
        NodeKind::QualifiedNameRef { token_spans, .. }
        | NodeKind::Import { token_spans, .. }
        | NodeKind::TypeRef { token_spans, .. } => token_spans.as_slice(),
        _ => &[],
    };
    if spans.len() > 1 {
        if let Some(i) = spans.iter().position(|s| s.end == span.end) {
            return ctx.token_binding(id, i);
        }
    }
    ctx.binding(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::DefaultHandleFactory;
    use crate::locator::test_support::with_unit;
    use crate::pattern::{Directions, FieldPattern, MatchRule, MethodPattern};

    const SOURCE: &str = "package p;
class Widget {
  int count;
  void foo(int x) { count = x; }
  void use(Widget w) { w.foo(1); int n = w.count; }
}
";

    fn report(locator: &Locator, resolve: bool) -> Vec<MatchRecord> {
        let mut records: Vec<MatchRecord> = Vec::new();
        with_unit("p/Widget.java", SOURCE, &[], locator.containers(), |unit, ctx| {
            let mut nodes = NodeSet::new(unit.len(), locator.must_resolve());
            for id in unit.ids() {
                locator.match_node(unit, id, &mut nodes);
            }
            let document = SearchDocument::new("/virtual", "p/Widget.java", SOURCE);
            let handles = DefaultHandleFactory;
            let mut reporter = MatchReporter::new(&mut records, &handles);
            reporter.report_unit(&document, unit, locator, &mut nodes, resolve.then_some(ctx));
            assert!(nodes.is_empty());
        });
        records
    }

    #[test]
    fn records_carry_position_and_enclosing_element() {
        let pattern = MethodPattern::builder("foo").declaring_type("Widget").references().build().unwrap();
        let records = report(&Locator::new(&pattern), true);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.accuracy, Accuracy::Accurate);
        assert_eq!(record.line, 5);
        assert_eq!(&SOURCE[record.offset..record.offset + record.length], "foo(1)");
        assert_eq!(record.element.as_ref().unwrap().qualified_name, "p.Widget.use");
        assert_eq!(record.target.as_ref().unwrap().to_string(), "p.Widget.foo(int)");
        assert!(!record.is_declaration);
    }

    #[test]
    fn unresolved_possible_nodes_are_inaccurate() {
        let pattern = MethodPattern::builder("foo").declaring_type("Widget").references().build().unwrap();
        let records = report(&Locator::new(&pattern), false);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].accuracy, Accuracy::Inaccurate);
        assert!(records[0].target.is_none());
    }

    #[test]
    fn access_flags_reach_the_record() {
        let pattern = FieldPattern::new("count", None, None, Directions::ALL, MatchRule::default()).unwrap();
        let records = report(&Locator::new(&pattern), true);
        let summary: Vec<(bool, bool, bool)> = records
            .iter()
            .map(|r| (r.is_declaration, r.is_read_access, r.is_write_access))
            .collect();
        assert_eq!(summary, vec![(true, false, false), (false, false, true), (false, true, false)]);
        assert_eq!(records[0].element.as_ref().unwrap().qualified_name, "p.Widget.count");
    }
}
