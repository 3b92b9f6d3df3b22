// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field declarations and field accesses.

use crate::ast::{ContainerMask, NodeId, NodeKind, ParsedUnit, Span, VariableDecl};
use crate::binding::{Binding, FieldBinding};
use crate::level::Level;
use crate::pattern::name::{match_name_value, matches_name};
use crate::pattern::FieldPattern;

use super::{
    access_allowed, access_of, qualification_matches, syntactic, type_level, type_rule, written_type, Candidate,
    ResolveContext,
};

#[derive(Debug, Clone)]
pub struct FieldLocator {
    pub(super) pattern: FieldPattern,
}

impl FieldLocator {
    pub fn new(pattern: FieldPattern) -> Self {
        Self { pattern }
    }

    pub fn containers(&self) -> ContainerMask {
        if self.pattern.directions.references {
            ContainerMask::ALL
        } else {
            ContainerMask::COMPILATION_UNIT | ContainerMask::CLASS
        }
    }

    pub fn candidates(&self, unit: &ParsedUnit, id: NodeId, ctx: Option<&ResolveContext<'_>>) -> Vec<Candidate> {
        let directions = self.pattern.directions;
        let node = unit.node(id);
        match &node.kind {
            NodeKind::Field(decl) => self.declaration(unit, id, decl, ctx).into_iter().collect(),
            _ if !directions.references => Vec::new(),
            NodeKind::NameRef { name } => {
                let (read, write) = access_of(unit, id);
                self.reference(name, node.span, read, write, ctx.map(|c| (c, c.binding(id))))
                    .into_iter()
                    .collect()
            }
            NodeKind::FieldAccess { name, name_span, .. } => {
                let (read, write) = access_of(unit, id);
                self.reference(name, *name_span, read, write, ctx.map(|c| (c, c.binding(id))))
                    .into_iter()
                    .collect()
            }
            NodeKind::QualifiedNameRef { tokens, token_spans } => {
                let (read, write) = access_of(unit, id);
                let last = tokens.len().saturating_sub(1);
                tokens
                    .iter()
                    .zip(token_spans)
                    .enumerate()
                    .filter_map(|(i, (token, span))| {
                        // only the last segment is written to
                        let (read, write) = if i == last { (read, write) } else { (true, false) };
                        self.reference(token, *span, read, write, ctx.map(|c| (c, c.token_binding(id, i))))
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// A declaration, or a write reference when only writes are sought and
    /// the field has an initializer.
    fn declaration(
        &self,
        unit: &ParsedUnit,
        id: NodeId,
        decl: &VariableDecl,
        ctx: Option<&ResolveContext<'_>>,
    ) -> Option<Candidate> {
        let pattern = &self.pattern;
        let directions = pattern.directions;
        let as_declaration = directions.declarations;
        let as_write = !as_declaration && directions.write_access && decl.has_initializer;
        if !as_declaration && !as_write {
            return None;
        }
        let name = match_name_value(pattern.name.as_ref(), &decl.name, pattern.rule);
        if name.is_impossible() {
            return None;
        }
        let candidate = match ctx {
            Some(ctx) => {
                let level = match ctx.binding(id) {
                    Some(Binding::Field(field)) => self.field_level(ctx, field),
                    _ => Level::INACCURATE,
                };
                Candidate::new(decl.name_span, level.with_flavor(name.flavor))
            }
            None => {
                if !self.declaration_fits(unit, id, decl) {
                    return None;
                }
                let needs = pattern.declaring.is_specified() || pattern.field_type.is_specified();
                Candidate::new(decl.name_span, syntactic(name, needs)).forcing(needs && self.field_type_is_generic(unit, decl))
            }
        };
        Some(if as_declaration {
            candidate.declaration()
        } else {
            candidate.access(false, true)
        })
    }

    /// Written declaring type and field type agree with the pattern.
    fn declaration_fits(&self, unit: &ParsedUnit, id: NodeId, decl: &VariableDecl) -> bool {
        let pattern = &self.pattern;
        let trule = type_rule(pattern.rule);
        if let Some(simple) = &pattern.field_type.simple_name {
            let written = decl.type_ref.and_then(|r| written_type(unit, r));
            if written.is_some_and(|(name, _)| !matches_name(Some(simple), &name, trule)) {
                return false;
            }
        }
        if pattern.declaring.is_specified() {
            let owner = unit.enclosing_type(id).and_then(|t| unit.type_decl(t));
            if let Some(owner) = owner.filter(|o| !o.local && !o.anonymous) {
                return pattern.declaring.matches_simple_name(&owner.name, trule)
                    && qualification_matches(
                        pattern.declaring.qualification.as_ref(),
                        &owner.qualification,
                        unit.package_name(),
                        trule,
                    );
            }
        }
        true
    }

    fn field_type_is_generic(&self, unit: &ParsedUnit, decl: &VariableDecl) -> bool {
        self.pattern.field_type.is_parameterized()
            || decl.type_ref.is_some_and(|r| {
                matches!(unit.kind(r), NodeKind::TypeRef { type_arguments, .. } if !type_arguments.is_empty())
            })
    }

    /// Without a context the reference is graded on its name alone.
    fn reference(
        &self,
        text: &str,
        span: Span,
        read: bool,
        write: bool,
        resolved: Option<(&ResolveContext<'_>, Option<&Binding>)>,
    ) -> Option<Candidate> {
        let pattern = &self.pattern;
        if !access_allowed(pattern.directions, read, write) {
            return None;
        }
        let name = match_name_value(pattern.name.as_ref(), text, pattern.rule);
        if name.is_impossible() {
            return None;
        }
        let level = match resolved {
            None => syntactic(name, true),
            Some((_, None)) => Level::INACCURATE,
            Some((ctx, Some(Binding::Field(field)))) => self.field_level(ctx, field),
            Some((_, Some(_))) => Level::IMPOSSIBLE,
        };
        Some(Candidate::new(span, level.with_flavor(name.flavor)).access(read, write))
    }

    /// Fields are not dispatched: the declaring type must match exactly.
    fn field_level(&self, ctx: &ResolveContext<'_>, field: &FieldBinding) -> Level {
        let pattern = &self.pattern;
        if match_name_value(pattern.name.as_ref(), &field.name, pattern.rule).is_impossible() {
            return Level::IMPOSSIBLE;
        }
        let declaring = if pattern.declaring.is_specified() {
            let owner = ctx.type_or_missing(&field.declaring_class);
            type_level(&pattern.declaring, Some(&owner), type_rule(pattern.rule))
        } else {
            Level::ACCURATE
        };
        declaring.weaker(self.field_type_level(field))
    }

    fn field_type_level(&self, field: &FieldBinding) -> Level {
        if !self.pattern.field_type.is_specified() {
            return Level::ACCURATE;
        }
        type_level(&self.pattern.field_type, field.field_type.as_deref(), type_rule(self.pattern.rule))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::Locator;
    use super::*;
    use crate::level::MatchLevel;
    use crate::pattern::{Directions, MatchRule};

    const SOURCE: &str = "package p;
class Base { int size; }
class Widget extends Base {
  Widget next;
  int count = 1;
  void use(Widget w) {
    count = 2;
    int n = w.next.count;
    this.count++;
    int size = 3;
    n = size;
  }
}
";

    fn locator(name: &str, directions: Directions) -> Locator {
        Locator::new(&FieldPattern::new(name, None, None, directions, MatchRule::default()).unwrap())
    }

    #[test]
    fn references_cover_every_access_form() {
        let locator = locator("count", Directions::REFERENCES);
        with_unit("p/Widget.java", SOURCE, &[], locator.containers(), |unit, ctx| {
            let matched = matched(&locator, unit);
            assert_eq!(matched.len(), 4);
            let occurrences: Vec<Candidate> = matched
                .iter()
                .flat_map(|(id, _)| locator.occurrences(unit, *id, Some(ctx)))
                .collect();
            assert!(occurrences.iter().all(|c| c.level.level == MatchLevel::Accurate));
            assert!(occurrences.iter().all(|c| text_of(unit, c) == "count"));
            let writes = occurrences.iter().filter(|c| c.write).count();
            assert_eq!(writes, 3);
        });
    }

    #[test]
    fn read_access_skips_pure_writes() {
        let locator = locator("count", Directions::accesses(true, false));
        with_unit("p/Widget.java", SOURCE, &[], locator.containers(), |unit, _| {
            assert_eq!(matched(&locator, unit).len(), 2);
        });
    }

    #[test]
    fn shadowing_locals_are_not_field_references() {
        let locator = locator("size", Directions::REFERENCES);
        with_unit("p/Widget.java", SOURCE, &[], locator.containers(), |unit, ctx| {
            let matched = matched(&locator, unit);
            assert_eq!(matched.len(), 1);
            assert!(locator.resolve_level(ctx, matched[0].0).is_impossible());
        });
    }

    #[test]
    fn declaring_type_pins_declarations() {
        let pattern = FieldPattern::new("size", Some("Widget"), None, Directions::DECLARATIONS, MatchRule::default()).unwrap();
        let locator = Locator::new(&pattern);
        with_unit("p/Widget.java", SOURCE, &[], locator.containers(), |unit, _| {
            assert!(matched(&locator, unit).is_empty());
        });
        let pattern = FieldPattern::new("size", Some("p.Base"), Some("int"), Directions::DECLARATIONS, MatchRule::default()).unwrap();
        let locator = Locator::new(&pattern);
        with_unit("p/Widget.java", SOURCE, &[], locator.containers(), |unit, ctx| {
            let matched = matched(&locator, unit);
            assert_eq!(matched.len(), 1);
            assert!(locator.resolve_level(ctx, matched[0].0).is_accurate());
        });
    }
}
