// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local variables and parameters of one declaring document.

use crate::ast::{NodeId, NodeKind, ParsedUnit, Span};
use crate::binding::Binding;
use crate::level::Level;
use crate::pattern::name::match_name_value;
use crate::pattern::LocalVariablePattern;

use super::{access_allowed, access_of, Candidate, ResolveContext};

#[derive(Debug, Clone)]
pub struct LocalLocator {
    pub(super) pattern: LocalVariablePattern,
}

impl LocalLocator {
    pub fn new(pattern: LocalVariablePattern) -> Self {
        Self { pattern }
    }

    pub fn candidates(&self, unit: &ParsedUnit, id: NodeId, ctx: Option<&ResolveContext<'_>>) -> Vec<Candidate> {
        let directions = self.pattern.directions;
        let node = unit.node(id);
        let candidate = match &node.kind {
            NodeKind::Local(decl) if decl.name_span.start == self.pattern.declaration_offset => {
                if directions.declarations {
                    Some(Candidate::new(decl.name_span, Level::ACCURATE).declaration())
                } else if directions.write_access && decl.has_initializer {
                    Some(Candidate::new(decl.name_span, Level::ACCURATE).access(false, true))
                } else {
                    None
                }
            }
            NodeKind::NameRef { name } if directions.references => {
                let (read, write) = access_of(unit, id);
                self.reference(name, node.span, read, write, ctx.map(|c| c.binding(id)))
            }
            // only the head of `a.b.c` can be a local
            NodeKind::QualifiedNameRef { tokens, token_spans } if directions.references => {
                match (tokens.first(), token_spans.first()) {
                    (Some(head), Some(span)) => {
                        self.reference(head, *span, true, false, ctx.map(|c| c.token_binding(id, 0)))
                    }
                    _ => None,
                }
            }
            _ => None,
        };
        candidate.into_iter().collect()
    }

    fn reference(
        &self,
        text: &str,
        span: Span,
        read: bool,
        write: bool,
        binding: Option<Option<&Binding>>,
    ) -> Option<Candidate> {
        if !access_allowed(self.pattern.directions, read, write) {
            return None;
        }
        if match_name_value(Some(&self.pattern.name), text, self.pattern.rule).is_impossible() {
            return None;
        }
        let level = match binding {
            None => Level::POSSIBLE,
            Some(None) => Level::INACCURATE,
            Some(Some(Binding::Local(local))) if local.declaration.start == self.pattern.declaration_offset => {
                Level::ACCURATE
            }
            Some(Some(_)) => Level::IMPOSSIBLE,
        };
        Some(Candidate::new(span, level).access(read, write))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::Locator;
    use super::*;
    use crate::ast::ContainerMask;
    use crate::pattern::Directions;

    const SOURCE: &str = "class A {
  int total;
  void run(int n) {
    int total = n;
    total += 1;
    print(total);
  }
  void other() { int total = 0; print(total); }
  void print(int x) {}
}
";

    fn offset_of(needle: &str, nth: usize) -> usize {
        SOURCE.match_indices(needle).nth(nth).map(|(i, _)| i).unwrap()
    }

    #[test]
    fn only_the_declared_local_is_matched() {
        // the second `total` is the local in run()
        let declaration = offset_of("total", 1);
        let pattern = LocalVariablePattern::new("total", "A.java", declaration, Directions::ALL).unwrap();
        let locator = Locator::new(&pattern);
        assert_eq!(locator.declaring_document(), Some(std::path::Path::new("A.java")));
        with_unit("A.java", SOURCE, &[], ContainerMask::ALL, |unit, ctx| {
            let matched = matched(&locator, unit);
            // declaration, `total += 1`, `print(total)` and the other method's read
            assert_eq!(matched.len(), 4);
            let mut accurate: Vec<usize> = matched
                .iter()
                .flat_map(|(id, _)| locator.occurrences(unit, *id, Some(ctx)))
                .map(|c| c.span.start)
                .collect();
            accurate.sort_unstable();
            assert_eq!(accurate, vec![declaration, offset_of("total", 2), offset_of("total", 3)]);
        });
    }

    #[test]
    fn parameters_are_locals_too() {
        let declaration = offset_of("n)", 0);
        let pattern = LocalVariablePattern::new("n", "A.java", declaration, Directions::REFERENCES).unwrap();
        let locator = Locator::new(&pattern);
        with_unit("A.java", SOURCE, &[], ContainerMask::ALL, |unit, ctx| {
            let matched = matched(&locator, unit);
            assert_eq!(matched.len(), 1);
            assert!(locator.resolve_level(ctx, matched[0].0).is_accurate());
        });
    }
}
