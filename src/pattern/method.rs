// SPDX-License-Identifier: MIT OR Apache-2.0

//! Method declarations and method invocations.

use super::name::matches_name;
use super::{build_parameters, split_parameter_types, Directions, MatchRule, NamePattern, Pattern, TypeName};
use crate::errors::{SearchError, SearchResult};
use crate::index::codec::DecodedKey;

#[derive(Debug, Clone, PartialEq)]
pub struct MethodPattern {
    pub(crate) selector: Option<NamePattern>,
    pub(crate) declaring: TypeName,
    pub(crate) return_type: TypeName,
    /// `None` means any parameter list.
    pub(crate) parameters: Option<Vec<TypeName>>,
    pub(crate) parameter_names: Option<Vec<String>>,
    pub(crate) directions: Directions,
    pub(crate) rule: MatchRule,
    pub(crate) must_resolve: bool,
}

impl MethodPattern {
    pub fn builder(selector: impl Into<String>) -> MethodPatternBuilder {
        MethodPatternBuilder {
            selector: Some(selector.into()),
            ..MethodPatternBuilder::default()
        }
    }

    pub fn selector(&self) -> Option<&NamePattern> {
        self.selector.as_ref()
    }

    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring
    }

    pub fn parameter_count(&self) -> Option<usize> {
        self.parameters.as_ref().map(Vec::len)
    }

    pub(crate) fn matches_decoded_key(&self, key: &DecodedKey) -> bool {
        match key {
            DecodedKey::MethodDecl(k) => {
                self.directions.declarations
                    && self.parameter_count().map_or(true, |n| n == k.parameter_types.len())
                    && matches_name(self.selector.as_ref(), &k.selector, self.rule)
            }
            DecodedKey::MethodRef(k) => {
                self.directions.references
                    && self.parameter_count().map_or(true, |n| n == k.arg_count)
                    && matches_name(self.selector.as_ref(), &k.selector, self.rule)
            }
            _ => false,
        }
    }
}

/// Builder for method patterns.
///
/// Parameter types can be given written out (`parameter_types`) or as the
/// parallel qualification and simple-name arrays (`parameter_type_parts`);
/// array lengths are checked by `build`.
#[derive(Debug, Default, Clone)]
pub struct MethodPatternBuilder {
    selector: Option<String>,
    declaring_type: Option<String>,
    return_type: Option<String>,
    parameter_qualifications: Option<Vec<Option<String>>>,
    parameter_simple_names: Option<Vec<String>>,
    parameter_names: Option<Vec<String>>,
    declarations: bool,
    references: bool,
    rule: Option<MatchRule>,
}

impl MethodPatternBuilder {
    pub fn declaring_type(mut self, name: impl Into<String>) -> Self {
        self.declaring_type = Some(name.into());
        self
    }

    pub fn return_type(mut self, name: impl Into<String>) -> Self {
        self.return_type = Some(name.into());
        self
    }

    pub fn parameter_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let written: Vec<String> = types.into_iter().map(Into::into).collect();
        let (qualifications, simple_names) = split_parameter_types(&written);
        self.parameter_qualifications = Some(qualifications);
        self.parameter_simple_names = Some(simple_names);
        self
    }

    pub fn parameter_type_parts(
        mut self,
        qualifications: Vec<Option<String>>,
        simple_names: Vec<String>,
    ) -> Self {
        self.parameter_qualifications = Some(qualifications);
        self.parameter_simple_names = Some(simple_names);
        self
    }

    pub fn parameter_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn declarations(mut self) -> Self {
        self.declarations = true;
        self
    }

    pub fn references(mut self) -> Self {
        self.references = true;
        self
    }

    pub fn rule(mut self, rule: MatchRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn build(self) -> SearchResult<Pattern> {
        if !self.declarations && !self.references {
            return Err(SearchError::invalid_pattern(
                "method pattern must look for declarations or references",
            ));
        }
        let rule = self
            .rule
            .unwrap_or_default()
            .validate(self.selector.as_deref())?;
        let type_rule = rule.without(super::RuleFlags::CAMEL_CASE);
        let declaring = TypeName::parse(self.declaring_type.as_deref(), type_rule)?;
        let return_type = TypeName::parse(self.return_type.as_deref(), type_rule)?;
        let parameters = build_parameters(
            self.parameter_qualifications,
            self.parameter_simple_names,
            self.parameter_names.as_ref(),
            rule,
        )?;

        // any pinned declaring type, return type or qualified parameter needs bindings
        let must_resolve = declaring.is_specified()
            || return_type.is_specified()
            || parameters
                .as_ref()
                .is_some_and(|params| params.iter().any(|p| p.qualification.is_some()));

        Ok(Pattern::Method(MethodPattern {
            selector: NamePattern::optional(self.selector.as_deref(), rule)?,
            declaring,
            return_type,
            parameters,
            parameter_names: self.parameter_names,
            directions: Directions {
                declarations: self.declarations,
                references: self.references,
                read_access: false,
                write_access: false,
            },
            rule,
            must_resolve,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::codec::{MethodDeclKey, MethodRefKey};

    fn method(p: Pattern) -> MethodPattern {
        match p {
            Pattern::Method(m) => m,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn declaring_type_forces_resolution() {
        let p = method(
            MethodPattern::builder("foo")
                .declaring_type("Widget")
                .references()
                .build()
                .unwrap(),
        );
        assert!(p.must_resolve);
        let p = method(MethodPattern::builder("foo").references().build().unwrap());
        assert!(!p.must_resolve);
        let p = method(
            MethodPattern::builder("foo")
                .parameter_types(["java.lang.String"])
                .declarations()
                .build()
                .unwrap(),
        );
        assert!(p.must_resolve);
    }

    #[test]
    fn parameter_name_count_must_agree() {
        let result = MethodPattern::builder("foo")
            .parameter_types(["int", "int"])
            .parameter_names(["a"])
            .declarations()
            .build();
        assert!(matches!(result, Err(SearchError::InvalidPattern(_))));
        let result = MethodPattern::builder("foo")
            .parameter_type_parts(vec![None], vec!["int".into(), "long".into()])
            .declarations()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn decoded_keys_compare_selector_and_arity() {
        let p = MethodPattern::builder("foo")
            .parameter_types(["int"])
            .declarations()
            .references()
            .build()
            .unwrap();
        let decl = DecodedKey::MethodDecl(MethodDeclKey {
            selector: "foo".into(),
            parameter_types: vec!["int".into()],
            parameter_names: vec!["x".into()],
            ..MethodDeclKey::default()
        });
        assert!(p.matches_decoded_key(&decl));
        let two_args = DecodedKey::MethodRef(MethodRefKey {
            selector: "foo".into(),
            arg_count: 2,
        });
        assert!(!p.matches_decoded_key(&two_args));
        let other = DecodedKey::MethodRef(MethodRefKey {
            selector: "food".into(),
            arg_count: 1,
        });
        assert!(!p.matches_decoded_key(&other));
    }

    #[test]
    fn prefix_selector_matches_longer_keys() {
        let p = MethodPattern::builder("get")
            .rule(MatchRule::prefix())
            .references()
            .build()
            .unwrap();
        let key = DecodedKey::MethodRef(MethodRefKey {
            selector: "getName".into(),
            arg_count: 0,
        });
        assert!(p.matches_decoded_key(&key));
    }
}
