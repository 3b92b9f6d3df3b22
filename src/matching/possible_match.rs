// SPDX-License-Identifier: MIT OR Apache-2.0

//! One candidate compilation unit and its parse/resolve lifecycle.

use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::ast::ParsedUnit;
use crate::compiler::Compiler;
use crate::errors::CompileAbort;
use crate::locator::{Locator, NodeSet};
use crate::scope::SearchDocument;

/// A document the index pointed at, plus what parsing it produced.
///
/// Equality is by root and compound name, so `Widget.java` and artifacts
/// named after its nested types collapse to one candidate.
#[derive(Debug, Clone)]
pub struct PossibleMatch {
    pub document: SearchDocument,
    unit: Option<ParsedUnit>,
    nodes: Option<NodeSet>,
}

impl PossibleMatch {
    pub fn new(document: SearchDocument) -> Self {
        Self {
            document,
            unit: None,
            nodes: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.document.root
    }

    pub fn compound_name(&self) -> &str {
        self.document.compound_name()
    }

    /// Lower the document for the locator's containers and grade every node.
    pub fn parse(&mut self, compiler: &dyn Compiler, locator: &Locator) -> Result<(), CompileAbort> {
        let unit = compiler.parse(&self.document, locator.containers())?;
        let mut nodes = NodeSet::new(unit.len(), locator.must_resolve());
        for id in unit.ids() {
            locator.match_node(&unit, id, &mut nodes);
        }
        tracing::debug!(
            document = %self.document.name,
            nodes = unit.len(),
            matching = nodes.matching_nodes().len(),
            possible = nodes.possible_nodes().len(),
            "parsed candidate"
        );
        self.unit = Some(unit);
        self.nodes = Some(nodes);
        Ok(())
    }

    pub fn is_parsed(&self) -> bool {
        self.unit.is_some()
    }

    /// Parsed and holding possible nodes that only bindings can settle.
    pub fn needs_resolution(&self) -> bool {
        self.nodes
            .as_ref()
            .is_some_and(|n| n.must_resolve() && n.has_possible_nodes())
    }

    /// The parsed unit and its node set, while they are alive.
    pub fn parts(&mut self) -> Option<(&ParsedUnit, &mut NodeSet)> {
        match (&self.unit, &mut self.nodes) {
            (Some(unit), Some(nodes)) => Some((unit, nodes)),
            _ => None,
        }
    }

    /// Drop the tree and node set.
    pub fn clean_up(&mut self) {
        self.unit = None;
        self.nodes = None;
    }
}

impl PartialEq for PossibleMatch {
    fn eq(&self, other: &Self) -> bool {
        self.root() == other.root() && self.compound_name() == other.compound_name()
    }
}

impl Eq for PossibleMatch {}

impl Hash for PossibleMatch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root().hash(state);
        self.compound_name().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompilerFactory;
    use crate::java::JavaCompilerFactory;
    use crate::pattern::TypePattern;

    #[test]
    fn nested_artifacts_collapse() {
        let a = PossibleMatch::new(SearchDocument::new("/r", "p/Widget.java", ""));
        let b = PossibleMatch::new(SearchDocument::new("/r", "p/Widget$Inner.java", ""));
        let c = PossibleMatch::new(SearchDocument::new("/other", "p/Widget.java", ""));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn clean_up_releases_the_tree() {
        let document = SearchDocument::new("/r", "A.java", "class A { A next; }");
        let compiler = JavaCompilerFactory::new().create(std::path::Path::new("/r"), &[document.clone()]).unwrap();
        let locator = Locator::new(&TypePattern::references("p.A").unwrap());
        let mut candidate = PossibleMatch::new(document);
        candidate.parse(compiler.as_ref(), &locator).unwrap();
        assert!(candidate.is_parsed());
        assert!(candidate.needs_resolution());
        candidate.clean_up();
        assert!(!candidate.is_parsed());
        assert!(candidate.parts().is_none());
    }
}
