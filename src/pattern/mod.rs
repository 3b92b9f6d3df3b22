// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern model
//!
//! A `Pattern` describes what to look for: one entity kind, the name fragments
//! that identify it, the match rule used to compare those fragments and which
//! occurrences (declarations, references, reads, writes) count.
//!
//! Patterns are immutable once built. Construction normalizes name case and
//! computes `must_resolve`, the flag that tells the scheduler whether syntax
//! alone can confirm a match.

pub mod constructor;
pub mod field;
pub mod local;
pub mod method;
pub mod name;
pub mod or;
pub mod package;
pub mod rule;
pub mod super_type;
pub mod type_pattern;

pub use constructor::ConstructorPattern;
pub use field::FieldPattern;
pub use local::LocalVariablePattern;
pub use method::MethodPattern;
pub use name::NamePattern;
pub use or::OrPattern;
pub use package::PackagePattern;
pub use rule::{MatchMode, MatchRule, RuleFlags};
pub use super_type::{SuperTypeKind, SuperTypeReferencePattern};
pub use type_pattern::TypePattern;

use std::fmt;

use crate::errors::SearchResult;
use crate::index::codec::DecodedKey;
use name::{matches_name, prefix_equals, split_qualified, split_type_arguments, wildcard_match};

/// Which occurrences of an entity a pattern asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Directions {
    pub declarations: bool,
    pub references: bool,
    /// Field and local references only: reads.
    pub read_access: bool,
    /// Field and local references only: writes.
    pub write_access: bool,
}

impl Directions {
    pub const DECLARATIONS: Directions = Directions {
        declarations: true,
        references: false,
        read_access: false,
        write_access: false,
    };
    pub const REFERENCES: Directions = Directions {
        declarations: false,
        references: true,
        read_access: true,
        write_access: true,
    };
    pub const ALL: Directions = Directions {
        declarations: true,
        references: true,
        read_access: true,
        write_access: true,
    };

    /// Reference directions restricted to reads and/or writes.
    pub fn accesses(read: bool, write: bool) -> Directions {
        Directions {
            declarations: false,
            references: read || write,
            read_access: read,
            write_access: write,
        }
    }

    pub fn with_declarations(mut self) -> Directions {
        self.declarations = true;
        self
    }

    /// A reference direction with neither access flag set means both.
    pub(crate) fn normalized(mut self) -> Directions {
        if self.references && !self.read_access && !self.write_access {
            self.read_access = true;
            self.write_access = true;
        }
        if self.read_access || self.write_access {
            self.references = true;
        }
        self
    }
}

/// A possibly qualified, possibly parameterized type name fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeName {
    pub qualification: Option<NamePattern>,
    pub simple_name: Option<NamePattern>,
    pub type_arguments: Vec<String>,
}

impl TypeName {
    pub fn any() -> TypeName {
        TypeName::default()
    }

    /// Parse `pkg.Outer.Name<Arg>`; `None`, empty text and `*` mean any type.
    pub fn parse(text: Option<&str>, rule: MatchRule) -> SearchResult<TypeName> {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty() && *t != "*") else {
            return Ok(TypeName::any());
        };
        if rule.mode == MatchMode::Regexp {
            // dots belong to the expression
            return Ok(TypeName {
                qualification: None,
                simple_name: NamePattern::optional(Some(text), rule)?,
                type_arguments: Vec::new(),
            });
        }
        let (base, type_arguments) = split_type_arguments(text);
        let (qualification, simple) = split_qualified(&base);
        Ok(TypeName {
            qualification: NamePattern::optional(qualification, rule)?,
            simple_name: NamePattern::optional(Some(simple), rule)?,
            type_arguments,
        })
    }

    /// Build from separate fragments, as index decoders and callers with split arrays do.
    pub fn from_parts(
        qualification: Option<&str>,
        simple_name: Option<&str>,
        rule: MatchRule,
    ) -> SearchResult<TypeName> {
        let (simple, type_arguments) = match simple_name {
            Some(s) => {
                let (base, args) = split_type_arguments(s);
                (Some(base), args)
            }
            None => (None, Vec::new()),
        };
        Ok(TypeName {
            qualification: NamePattern::optional(qualification, rule)?,
            simple_name: NamePattern::optional(simple.as_deref(), rule)?,
            type_arguments,
        })
    }

    pub fn is_specified(&self) -> bool {
        self.qualification.is_some() || self.simple_name.is_some()
    }

    pub fn is_parameterized(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    pub fn matches_simple_name(&self, name: &str, rule: MatchRule) -> bool {
        matches_name(self.simple_name.as_ref(), name, rule)
    }

    /// Syntactic check of a simple name plus its known qualification.
    pub fn matches(&self, simple_name: &str, qualification: &str, rule: MatchRule) -> bool {
        self.matches_simple_name(simple_name, rule)
            && matches_qualification(self.qualification.as_ref(), qualification, rule)
    }

    /// The simple name text used to build index keys, if it can serve as one.
    pub fn simple_text(&self) -> Option<&str> {
        self.simple_name.as_ref().map(NamePattern::as_str)
    }

    pub fn qualification_text(&self) -> Option<&str> {
        self.qualification.as_ref().map(NamePattern::as_str)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(q) = &self.qualification {
            write!(f, "{}.", q)?;
        }
        match &self.simple_name {
            Some(s) => write!(f, "{}", s)?,
            None => f.write_str("*")?,
        }
        if !self.type_arguments.is_empty() {
            write!(f, "<{}>", self.type_arguments.join(", "))?;
        }
        Ok(())
    }
}

/// Compare a qualification (package plus enclosing types) against a pattern fragment.
///
/// Qualifications are matched as a whole: wildcards apply when present, prefix
/// mode allows a leading part, anything else requires equality.
pub fn matches_qualification(pattern: Option<&NamePattern>, qualification: &str, rule: MatchRule) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };
    let case_sensitive = rule.is_case_sensitive();
    match rule.mode {
        MatchMode::Regexp => matches_name(Some(pattern), qualification, rule),
        _ if pattern.has_wildcards() => wildcard_match(pattern.as_str(), qualification, case_sensitive),
        MatchMode::Prefix => prefix_equals(pattern.as_str(), qualification, case_sensitive),
        _ => name::equals(pattern.as_str(), qualification, case_sensitive),
    }
}

/// The entity kind a pattern targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Type,
    Method,
    Constructor,
    Field,
    LocalVariable,
    SuperTypeReference,
    Package,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Type(TypePattern),
    Method(MethodPattern),
    Constructor(ConstructorPattern),
    Field(FieldPattern),
    LocalVariable(LocalVariablePattern),
    SuperTypeReference(SuperTypeReferencePattern),
    Package(PackagePattern),
    Or(OrPattern),
}

impl Pattern {
    /// Combine patterns; nested `Or`s are flattened.
    pub fn or(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
        Pattern::Or(OrPattern::new(patterns))
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::Type(_) => PatternKind::Type,
            Pattern::Method(_) => PatternKind::Method,
            Pattern::Constructor(_) => PatternKind::Constructor,
            Pattern::Field(_) => PatternKind::Field,
            Pattern::LocalVariable(_) => PatternKind::LocalVariable,
            Pattern::SuperTypeReference(_) => PatternKind::SuperTypeReference,
            Pattern::Package(_) => PatternKind::Package,
            Pattern::Or(_) => PatternKind::Or,
        }
    }

    pub fn rule(&self) -> MatchRule {
        match self {
            Pattern::Type(p) => p.rule,
            Pattern::Method(p) => p.rule,
            Pattern::Constructor(p) => p.rule,
            Pattern::Field(p) => p.rule,
            Pattern::LocalVariable(p) => p.rule,
            Pattern::SuperTypeReference(p) => p.rule,
            Pattern::Package(p) => p.rule,
            Pattern::Or(p) => p.rule,
        }
    }

    /// True when syntax alone cannot confirm a match of this pattern.
    pub fn must_resolve(&self) -> bool {
        match self {
            Pattern::Type(p) => p.must_resolve,
            Pattern::Method(p) => p.must_resolve,
            Pattern::Constructor(p) => p.must_resolve,
            Pattern::Field(p) => p.must_resolve,
            Pattern::LocalVariable(p) => p.must_resolve(),
            Pattern::SuperTypeReference(p) => p.must_resolve,
            Pattern::Package(p) => p.must_resolve,
            Pattern::Or(p) => p.must_resolve(),
        }
    }

    pub fn directions(&self) -> Directions {
        match self {
            Pattern::Type(p) => p.directions,
            Pattern::Method(p) => p.directions,
            Pattern::Constructor(p) => p.directions,
            Pattern::Field(p) => p.directions,
            Pattern::LocalVariable(p) => p.directions,
            Pattern::SuperTypeReference(_) => Directions::REFERENCES,
            Pattern::Package(p) => p.directions,
            Pattern::Or(p) => p.patterns().iter().fold(Directions::default(), |acc, child| {
                let d = child.directions();
                Directions {
                    declarations: acc.declarations || d.declarations,
                    references: acc.references || d.references,
                    read_access: acc.read_access || d.read_access,
                    write_access: acc.write_access || d.write_access,
                }
            }),
        }
    }

    /// Validate a raw index hit decoded into its fields against this pattern.
    ///
    /// Only what the key can tell is checked; anything that needs bindings is
    /// left to the locators. An `Or` accepts a key any child accepts.
    pub fn matches_decoded_key(&self, key: &DecodedKey) -> bool {
        match self {
            Pattern::Type(p) => p.matches_decoded_key(key),
            Pattern::Method(p) => p.matches_decoded_key(key),
            Pattern::Constructor(p) => p.matches_decoded_key(key),
            Pattern::Field(p) => p.matches_decoded_key(key),
            Pattern::LocalVariable(p) => p.matches_decoded_key(key),
            Pattern::SuperTypeReference(p) => p.matches_decoded_key(key),
            Pattern::Package(p) => p.matches_decoded_key(key),
            Pattern::Or(p) => p.patterns().iter().any(|child| child.matches_decoded_key(key)),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Type(p) => write!(f, "type {}", p.name),
            Pattern::Method(p) => {
                write!(f, "method ")?;
                if p.declaring.is_specified() {
                    write!(f, "{}.", p.declaring)?;
                }
                match &p.selector {
                    Some(s) => write!(f, "{}", s)?,
                    None => f.write_str("*")?,
                }
                match &p.parameters {
                    Some(params) => {
                        let rendered: Vec<String> = params.iter().map(|t| t.to_string()).collect();
                        write!(f, "({})", rendered.join(", "))
                    }
                    None => f.write_str("(..)"),
                }
            }
            Pattern::Constructor(p) => write!(f, "constructor {}", p.declaring),
            Pattern::Field(p) => {
                write!(f, "field ")?;
                if p.declaring.is_specified() {
                    write!(f, "{}.", p.declaring)?;
                }
                match &p.name {
                    Some(n) => write!(f, "{}", n),
                    None => f.write_str("*"),
                }
            }
            Pattern::LocalVariable(p) => write!(f, "local {}", p.name),
            Pattern::SuperTypeReference(p) => write!(f, "supertype {}", p.super_type),
            Pattern::Package(p) => match &p.name {
                Some(n) => write!(f, "package {}", n),
                None => f.write_str("package *"),
            },
            Pattern::Or(p) => {
                let rendered: Vec<String> = p.patterns().iter().map(|c| c.to_string()).collect();
                write!(f, "({})", rendered.join(" | "))
            }
        }
    }
}

/// Validate the parallel arrays describing parameter types and names.
///
/// Qualifications and simple names must have the same length, and when names
/// are given they must describe the same number of parameters.
pub(crate) fn build_parameters(
    qualifications: Option<Vec<Option<String>>>,
    simple_names: Option<Vec<String>>,
    parameter_names: Option<&Vec<String>>,
    rule: MatchRule,
) -> SearchResult<Option<Vec<TypeName>>> {
    use crate::errors::SearchError;

    let Some(simple_names) = simple_names else {
        if qualifications.is_some() {
            return Err(SearchError::invalid_pattern(
                "parameter qualifications given without parameter type names",
            ));
        }
        return Ok(None);
    };
    let qualifications = qualifications.unwrap_or_else(|| vec![None; simple_names.len()]);
    if qualifications.len() != simple_names.len() {
        return Err(SearchError::invalid_pattern(format!(
            "{} parameter qualifications for {} parameter types",
            qualifications.len(),
            simple_names.len()
        )));
    }
    if let Some(names) = parameter_names {
        if names.len() != simple_names.len() {
            return Err(SearchError::invalid_pattern(format!(
                "{} parameter names for {} parameter types",
                names.len(),
                simple_names.len()
            )));
        }
    }
    let mut parameters = Vec::with_capacity(simple_names.len());
    for (qualification, simple) in qualifications.iter().zip(simple_names.iter()) {
        // parameter type names always compare case sensitively
        let rule = rule.case_sensitive().without(RuleFlags::CAMEL_CASE).with_mode(MatchMode::Exact);
        let rule = if simple.contains('*') || simple.contains('?') {
            rule.with_mode(MatchMode::Pattern)
        } else {
            rule
        };
        parameters.push(TypeName::from_parts(qualification.as_deref(), Some(simple), rule)?);
    }
    Ok(Some(parameters))
}

/// Split a written type list (`int, java.util.List<String>`) into qualification and simple-name arrays.
pub(crate) fn split_parameter_types(types: &[String]) -> (Vec<Option<String>>, Vec<String>) {
    let mut qualifications = Vec::with_capacity(types.len());
    let mut simple_names = Vec::with_capacity(types.len());
    for written in types {
        let (base, args) = split_type_arguments(written);
        let (qualification, simple) = split_qualified(&base);
        qualifications.push(qualification.map(str::to_string));
        if args.is_empty() {
            simple_names.push(simple.to_string());
        } else {
            simple_names.push(format!("{}<{}>", simple, args.join(",")));
        }
    }
    (qualifications, simple_names)
}
