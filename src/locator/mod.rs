// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern locators
//!
//! A locator is picked once per query from the pattern kind. It answers three
//! questions about a syntax node: how well does the node match on syntax alone
//! (`match_node`), how well does it match once bindings are known
//! (`resolve_level`), and which source ranges inside it should be reported
//! (`occurrences`). A single node can yield several occurrences, e.g. each
//! matching segment of `a.b.c`.
//!
//! Every per-kind locator works through one function, `candidates`, that
//! returns the graded sub-ranges of a node. Without a `ResolveContext` the
//! grades come from names alone; with one they come from bindings.

mod constructor;
mod field;
mod local;
mod method;
pub mod node_set;
mod package;
mod super_type;
mod type_ref;

pub use node_set::NodeSet;

use bitflags::bitflags;
use std::path::Path;
use std::sync::Arc;

use crate::ast::{ContainerMask, NodeFlags, NodeId, NodeKind, ParsedUnit, Receiver, Span};
use crate::binding::{Binding, ResolvedUnit, TypeBinding, TypeBindingKind};
use crate::compiler::Compiler;
use crate::level::Level;
use crate::pattern::name::matches_name;
use crate::pattern::{matches_qualification, Directions, MatchMode, MatchRule, NamePattern, Pattern, RuleFlags, TypeName};

use constructor::ConstructorLocator;
use field::FieldLocator;
use local::LocalLocator;
use method::MethodLocator;
use package::PackageLocator;
use super_type::SuperTypeLocator;
use type_ref::TypeLocator;

bitflags! {
    /// How a reported record relates to the pattern's type arguments.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RuleBits: u8 {
        const EXACT = 1 << 0;
        const EQUIVALENT = 1 << 1;
        const ERASURE = 1 << 2;
    }
}

impl RuleBits {
    pub const FULL: RuleBits = RuleBits::all();

    /// Whether a record carrying these bits may be reported under `rule`.
    pub fn accepted_by(self, rule: MatchRule) -> bool {
        self.contains(RuleBits::EXACT)
            || (rule.accepts_erasure() && self.contains(RuleBits::ERASURE))
            || (rule.accepts_equivalent() && self.contains(RuleBits::EQUIVALENT))
    }
}

/// What a locator needs to grade a node semantically.
pub struct ResolveContext<'a> {
    pub unit: &'a ParsedUnit,
    pub resolved: &'a ResolvedUnit,
    pub compiler: &'a dyn Compiler,
}

impl<'a> ResolveContext<'a> {
    pub fn new(unit: &'a ParsedUnit, resolved: &'a ResolvedUnit, compiler: &'a dyn Compiler) -> Self {
        Self {
            unit,
            resolved,
            compiler,
        }
    }

    pub fn binding(&self, id: NodeId) -> Option<&Binding> {
        self.resolved.binding(id)
    }

    pub fn token_binding(&self, id: NodeId, token: usize) -> Option<&Binding> {
        self.resolved.token_binding(id, token)
    }

    /// Binding of the innermost type declaration around `id`.
    pub fn enclosing_type(&self, id: NodeId) -> Option<Arc<TypeBinding>> {
        let owner = self.unit.enclosing_type(id)?;
        self.resolved.binding(owner)?.as_type().cloned()
    }

    /// Static type of a message send's receiver.
    pub fn receiver_type(&self, send: NodeId, receiver: Receiver) -> Option<Arc<TypeBinding>> {
        match receiver {
            Receiver::Expression(expression) => self.resolved.expression_type(expression).cloned(),
            Receiver::Implicit => self.enclosing_type(send),
            Receiver::Super => {
                let owner = self.enclosing_type(send)?;
                self.compiler.super_class(&owner)
            }
        }
    }

    /// Look a type up by key, falling back to a missing binding.
    pub fn type_or_missing(&self, key: &str) -> Arc<TypeBinding> {
        self.compiler
            .lookup_type(key)
            .unwrap_or_else(|| TypeBinding::missing(key))
    }

    /// Every type known to the compiler that `pattern` names accurately.
    pub fn types_named(&self, pattern: &TypeName, rule: MatchRule) -> Vec<Arc<TypeBinding>> {
        let mut found: Vec<Arc<TypeBinding>> = self
            .compiler
            .all_types()
            .into_iter()
            .filter(|t| type_level(pattern, Some(t), rule).is_accurate())
            .collect();
        let wildcard = pattern.simple_name.as_ref().is_some_and(NamePattern::has_wildcards);
        if let Some(simple) = pattern.simple_text().filter(|_| !wildcard) {
            let key = match pattern.qualification_text() {
                Some(q) => format!("{}.{}", q, simple),
                None => format!("java.lang.{}", simple),
            };
            if let Some(ty) = self.compiler.lookup_type(&key) {
                if !found.iter().any(|t| t.key() == ty.key()) {
                    found.push(ty);
                }
            }
        }
        found
    }
}

/// A graded sub-range of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub span: Span,
    pub level: Level,
    pub rule: RuleBits,
    pub declaration: bool,
    pub read: bool,
    pub write: bool,
    /// Syntax cannot settle this candidate; bindings are needed.
    pub force_resolve: bool,
}

impl Candidate {
    pub fn new(span: Span, level: Level) -> Self {
        Self {
            span,
            level,
            rule: RuleBits::FULL,
            declaration: false,
            read: false,
            write: false,
            force_resolve: false,
        }
    }

    pub fn declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    pub fn access(mut self, read: bool, write: bool) -> Self {
        self.read = read;
        self.write = write;
        self
    }

    pub fn forcing(mut self, force: bool) -> Self {
        self.force_resolve |= force;
        self
    }

    pub fn with_rule(mut self, rule: RuleBits) -> Self {
        self.rule = rule;
        self
    }
}

/// Kind-specific matcher selected from a pattern.
#[derive(Debug, Clone)]
pub enum Locator {
    Type(TypeLocator),
    Method(MethodLocator),
    Constructor(ConstructorLocator),
    Field(FieldLocator),
    Local(LocalLocator),
    SuperType(SuperTypeLocator),
    Package(PackageLocator),
    Or(Vec<Locator>),
}

impl Locator {
    pub fn new(pattern: &Pattern) -> Locator {
        match pattern {
            Pattern::Type(p) => Locator::Type(TypeLocator::new(p.clone())),
            Pattern::Method(p) => Locator::Method(MethodLocator::new(p.clone())),
            Pattern::Constructor(p) => Locator::Constructor(ConstructorLocator::new(p.clone())),
            Pattern::Field(p) => Locator::Field(FieldLocator::new(p.clone())),
            Pattern::LocalVariable(p) => Locator::Local(LocalLocator::new(p.clone())),
            Pattern::SuperTypeReference(p) => Locator::SuperType(SuperTypeLocator::new(p.clone())),
            Pattern::Package(p) => Locator::Package(PackageLocator::new(p.clone())),
            Pattern::Or(p) => Locator::Or(p.patterns().iter().map(Locator::new).collect()),
        }
    }

    /// Containers that must be lowered for this locator to see its nodes.
    pub fn containers(&self) -> ContainerMask {
        match self {
            Locator::Type(l) => l.containers(),
            Locator::Method(l) => l.containers(),
            Locator::Constructor(l) => l.containers(),
            Locator::Field(l) => l.containers(),
            Locator::Local(_) => ContainerMask::ALL,
            Locator::SuperType(_) => ContainerMask::COMPILATION_UNIT | ContainerMask::CLASS,
            Locator::Package(l) => l.containers(),
            Locator::Or(children) => children
                .iter()
                .fold(ContainerMask::empty(), |mask, child| mask | child.containers()),
        }
    }

    pub fn must_resolve(&self) -> bool {
        match self {
            Locator::Type(l) => l.pattern.must_resolve,
            Locator::Method(l) => l.pattern.must_resolve,
            Locator::Constructor(l) => l.pattern.must_resolve,
            Locator::Field(l) => l.pattern.must_resolve,
            Locator::Local(l) => l.pattern.must_resolve(),
            Locator::SuperType(l) => l.pattern.must_resolve,
            Locator::Package(l) => l.pattern.must_resolve,
            Locator::Or(children) => children.iter().any(Locator::must_resolve),
        }
    }

    /// The only document a local variable search looks at.
    pub fn declaring_document(&self) -> Option<&Path> {
        match self {
            Locator::Local(l) => Some(l.pattern.declaring_path()),
            _ => None,
        }
    }

    fn candidates(&self, unit: &ParsedUnit, id: NodeId, ctx: Option<&ResolveContext<'_>>) -> Vec<Candidate> {
        match self {
            Locator::Type(l) => l.candidates(unit, id, ctx),
            Locator::Method(l) => l.candidates(unit, id, ctx),
            Locator::Constructor(l) => l.candidates(unit, id, ctx),
            Locator::Field(l) => l.candidates(unit, id, ctx),
            Locator::Local(l) => l.candidates(unit, id, ctx),
            Locator::SuperType(l) => l.candidates(unit, id, ctx),
            Locator::Package(l) => l.candidates(unit, id, ctx),
            Locator::Or(children) => {
                let mut merged: Vec<Candidate> = Vec::new();
                for child in children {
                    for candidate in child.candidates(unit, id, ctx) {
                        merge_candidate(&mut merged, candidate);
                    }
                }
                merged
            }
        }
    }

    /// Syntactic level of one node, without touching the node set.
    fn syntactic_level(&self, unit: &ParsedUnit, id: NodeId, set: &mut NodeSet) -> Level {
        if let Locator::Or(children) = self {
            let mut best = Level::IMPOSSIBLE;
            for child in children {
                best = best.stronger(child.syntactic_level(unit, id, set));
                if best.is_accurate() {
                    break;
                }
            }
            return best;
        }
        let mut level = Level::IMPOSSIBLE;
        let mut force = false;
        for candidate in self.candidates(unit, id, None) {
            if candidate.level.is_impossible() {
                continue;
            }
            level = level.stronger(candidate.level);
            force |= candidate.force_resolve;
        }
        if force && !level.is_impossible() {
            set.set_must_resolve(true);
            level = level.capped_at_possible();
        }
        level
    }

    /// Grade `id` on syntax and record it in `set` when it is not impossible.
    pub fn match_node(&self, unit: &ParsedUnit, id: NodeId, set: &mut NodeSet) -> Level {
        let level = self.syntactic_level(unit, id, set);
        if level.is_impossible() {
            return level;
        }
        set.add_match(id, level)
    }

    /// Grade a possible node against its bindings.
    pub fn resolve_level(&self, ctx: &ResolveContext<'_>, id: NodeId) -> Level {
        if let Locator::Or(children) = self {
            let mut best = Level::IMPOSSIBLE;
            for child in children {
                best = best.stronger(child.resolve_level(ctx, id));
                if best.is_accurate() {
                    break;
                }
            }
            return best;
        }
        self.candidates(ctx.unit, id, Some(ctx))
            .into_iter()
            .fold(Level::IMPOSSIBLE, |best, c| best.stronger(c.level))
    }

    /// Reportable sub-ranges of a matched node, filtered by the rule bits each
    /// pattern accepts. Impossible candidates are dropped.
    pub fn occurrences(&self, unit: &ParsedUnit, id: NodeId, ctx: Option<&ResolveContext<'_>>) -> Vec<Candidate> {
        let rule = match self {
            Locator::Type(l) => l.pattern.rule,
            Locator::Method(l) => l.pattern.rule,
            Locator::Constructor(l) => l.pattern.rule,
            Locator::Field(l) => l.pattern.rule,
            Locator::Local(l) => l.pattern.rule,
            Locator::SuperType(l) => l.pattern.rule,
            Locator::Package(l) => l.pattern.rule,
            Locator::Or(children) => {
                let mut merged: Vec<Candidate> = Vec::new();
                for child in children {
                    for candidate in child.occurrences(unit, id, ctx) {
                        merge_candidate(&mut merged, candidate);
                    }
                }
                merged.sort_by_key(|c| c.span);
                return merged;
            }
        };
        self.candidates(unit, id, ctx)
            .into_iter()
            .filter(|c| !c.level.is_impossible() && c.rule.accepted_by(rule))
            .collect()
    }
}

/// Keep one candidate per span; the stronger level wins.
fn merge_candidate(merged: &mut Vec<Candidate>, candidate: Candidate) {
    match merged.iter_mut().find(|c| c.span == candidate.span) {
        Some(existing) => {
            if candidate.level.level > existing.level.level {
                *existing = candidate;
            } else if candidate.level.level == existing.level.level {
                existing.level = existing.level.stronger(candidate.level);
                existing.declaration |= candidate.declaration;
            }
        }
        None => merged.push(candidate),
    }
}

/// Level of a node whose name matched as `name`: accurate unless bindings are needed.
pub(crate) fn syntactic(name: Level, must_resolve: bool) -> Level {
    if name.is_impossible() {
        return Level::IMPOSSIBLE;
    }
    let base = if must_resolve { Level::POSSIBLE } else { Level::ACCURATE };
    base.with_flavor(name.flavor)
}

/// Rule used for type names inside a pattern: no camel case.
pub(crate) fn type_rule(rule: MatchRule) -> MatchRule {
    rule.without(RuleFlags::CAMEL_CASE)
}

/// Parameter type names always compare case sensitively, with wildcards when present.
pub(crate) fn parameter_rule(parameter: &TypeName) -> MatchRule {
    let rule = MatchRule::exact().case_sensitive();
    if parameter.simple_name.as_ref().is_some_and(NamePattern::has_wildcards) {
        rule.with_mode(MatchMode::Pattern)
    } else {
        rule
    }
}

/// A qualification matches either in full or without its package, so
/// `Outer.Inner` finds `com.acme.Outer.Inner`.
fn qualification_matches(pattern: Option<&NamePattern>, qualification: &str, package: &str, rule: MatchRule) -> bool {
    if matches_qualification(pattern, qualification, rule) {
        return true;
    }
    match qualification.strip_prefix(package).and_then(|rest| rest.strip_prefix('.')) {
        Some(enclosing) if !package.is_empty() => matches_qualification(pattern, enclosing, rule),
        _ => false,
    }
}

/// Compare a resolved type against a type name fragment.
///
/// An unknown type whose name still matches is `inaccurate`; a type variable
/// matches on its name alone.
pub(crate) fn type_level(pattern: &TypeName, ty: Option<&TypeBinding>, rule: MatchRule) -> Level {
    if !pattern.is_specified() {
        return Level::ACCURATE;
    }
    let Some(ty) = ty else {
        return Level::INACCURATE;
    };
    let (name, qualification, package, kind) = match &ty.element {
        Some(element) => (
            format!("{}{}", element.name, "[]".repeat(ty.dims)),
            element.qualification.as_str(),
            element.package.as_str(),
            element.kind,
        ),
        None => (ty.name.clone(), ty.qualification.as_str(), ty.package.as_str(), ty.kind),
    };
    if !pattern.matches_simple_name(&name, rule) {
        return Level::IMPOSSIBLE;
    }
    match kind {
        TypeBindingKind::TypeVariable => Level::ACCURATE,
        TypeBindingKind::Missing => {
            if qualification.is_empty() || matches_qualification(pattern.qualification.as_ref(), qualification, rule) {
                Level::INACCURATE
            } else {
                Level::IMPOSSIBLE
            }
        }
        _ if qualification_matches(pattern.qualification.as_ref(), qualification, package, rule) => Level::ACCURATE,
        _ => Level::IMPOSSIBLE,
    }
}

/// Written form of a type reference: simple name with array brackets, and the
/// qualification as written (empty when unqualified).
pub(crate) fn written_type(unit: &ParsedUnit, reference: NodeId) -> Option<(String, String)> {
    let NodeKind::TypeRef { tokens, dims, .. } = unit.kind(reference) else {
        return None;
    };
    let (last, qualification) = tokens.split_last()?;
    Some((format!("{}{}", last, "[]".repeat(*dims)), qualification.join(".")))
}

/// Syntactic comparison of declared parameters with the pattern's parameter types.
pub(crate) fn parameters_match(unit: &ParsedUnit, patterns: &[TypeName], parameters: &[NodeId]) -> bool {
    if patterns.len() != parameters.len() {
        return false;
    }
    patterns.iter().zip(parameters).all(|(pattern, &parameter)| {
        let Some(simple) = pattern.simple_name.as_ref() else {
            return true;
        };
        let written = match unit.kind(parameter) {
            NodeKind::Local(decl) => decl.type_ref.and_then(|r| written_type(unit, r)),
            _ => None,
        };
        let Some((name, qualification)) = written else {
            return true;
        };
        let rule = parameter_rule(pattern);
        matches_name(Some(simple), &name, rule)
            && (qualification.is_empty() || matches_qualification(pattern.qualification.as_ref(), &qualification, rule))
    })
}

/// Resolved comparison of parameter types, combined with `weaker`.
pub(crate) fn parameters_level(patterns: &[TypeName], parameters: &[Arc<TypeBinding>]) -> Level {
    if patterns.len() != parameters.len() {
        return Level::IMPOSSIBLE;
    }
    patterns
        .iter()
        .zip(parameters)
        .fold(Level::ACCURATE, |level, (pattern, ty)| {
            level.weaker(type_level(pattern, Some(ty), parameter_rule(pattern)))
        })
}

/// Simple names of the written type arguments of a reference.
pub(crate) fn written_arguments(unit: &ParsedUnit, arguments: &[NodeId]) -> Vec<String> {
    arguments
        .iter()
        .filter_map(|&a| written_type(unit, a).map(|(name, _)| name))
        .collect()
}

/// Rule bits of a reference carrying `written` type arguments.
pub(crate) fn type_argument_bits(pattern: &TypeName, written: &[String]) -> RuleBits {
    if pattern.type_arguments.is_empty() {
        return RuleBits::FULL;
    }
    if written.is_empty() {
        return RuleBits::EQUIVALENT | RuleBits::ERASURE;
    }
    let agree = pattern.type_arguments.len() == written.len()
        && pattern.type_arguments.iter().zip(written).all(|(wanted, got)| {
            let wanted = wanted.trim();
            let simple = wanted.rsplit('.').next().unwrap_or(wanted);
            wanted == "?" || simple == got
        });
    if agree {
        RuleBits::FULL
    } else {
        RuleBits::ERASURE
    }
}

/// Read/write position of a reference; a reference in neither is a read.
pub(crate) fn access_of(unit: &ParsedUnit, id: NodeId) -> (bool, bool) {
    let flags = unit.node(id).flags;
    let read = flags.contains(NodeFlags::READ);
    let write = flags.contains(NodeFlags::WRITE);
    if !read && !write {
        (true, false)
    } else {
        (read, write)
    }
}

pub(crate) fn access_allowed(directions: Directions, read: bool, write: bool) -> bool {
    (read && directions.read_access) || (write && directions.write_access)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::compiler::CompilerFactory;
    use crate::java::JavaCompilerFactory;
    use crate::scope::SearchDocument;

    /// Parse and bind `source` as `name` among `others`, then run `check`.
    pub fn with_unit<R>(
        name: &str,
        source: &str,
        others: &[(&str, &str)],
        containers: ContainerMask,
        check: impl FnOnce(&ParsedUnit, &ResolveContext<'_>) -> R,
    ) -> R {
        let root = Path::new("/virtual");
        let mut documents = vec![SearchDocument::new(root, name, source)];
        documents.extend(others.iter().map(|(n, s)| SearchDocument::new(root, *n, *s)));
        let compiler = JavaCompilerFactory::new().create(root, &documents).unwrap();
        let unit = compiler.parse(&documents[0], containers).unwrap();
        let resolved = compiler.build_bindings(&unit).unwrap();
        let ctx = ResolveContext::new(&unit, &resolved, compiler.as_ref());
        check(&unit, &ctx)
    }

    /// Syntactic level of every node that matched, in arena order.
    pub fn matched(locator: &Locator, unit: &ParsedUnit) -> Vec<(NodeId, Level)> {
        let mut set = NodeSet::new(unit.len(), locator.must_resolve());
        for id in unit.ids() {
            locator.match_node(unit, id, &mut set);
        }
        let mut all = set.matching_nodes();
        all.extend(set.possible_nodes());
        all.sort_by_key(|(id, _)| *id);
        all
    }

    pub fn text_of(unit: &ParsedUnit, candidate: &Candidate) -> String {
        unit.text(candidate.span).to_string()
    }
}
