// SPDX-License-Identifier: MIT OR Apache-2.0

//! Constructor declarations, allocations and explicit constructor calls.

use super::{build_parameters, split_parameter_types, Directions, MatchRule, Pattern, TypeName};
use crate::errors::{SearchError, SearchResult};
use crate::index::codec::DecodedKey;

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorPattern {
    /// The constructed type.
    pub(crate) declaring: TypeName,
    pub(crate) parameters: Option<Vec<TypeName>>,
    pub(crate) parameter_names: Option<Vec<String>>,
    pub(crate) directions: Directions,
    pub(crate) rule: MatchRule,
    pub(crate) must_resolve: bool,
}

impl ConstructorPattern {
    pub fn builder(type_name: impl Into<String>) -> ConstructorPatternBuilder {
        ConstructorPatternBuilder {
            type_name: type_name.into(),
            ..ConstructorPatternBuilder::default()
        }
    }

    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring
    }

    pub fn parameter_count(&self) -> Option<usize> {
        self.parameters.as_ref().map(Vec::len)
    }

    pub(crate) fn matches_decoded_key(&self, key: &DecodedKey) -> bool {
        match key {
            DecodedKey::ConstructorDecl(k) => {
                self.directions.declarations
                    && self.parameter_count().map_or(true, |n| n == k.parameter_types.len())
                    && self.declaring.matches_simple_name(&k.type_name, self.rule)
            }
            DecodedKey::ConstructorRef(k) => {
                self.directions.references
                    && self.parameter_count().map_or(true, |n| n == k.arg_count)
                    && self.declaring.matches_simple_name(&k.type_name, self.rule)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConstructorPatternBuilder {
    type_name: String,
    parameter_qualifications: Option<Vec<Option<String>>>,
    parameter_simple_names: Option<Vec<String>>,
    parameter_names: Option<Vec<String>>,
    declarations: bool,
    references: bool,
    rule: Option<MatchRule>,
}

impl ConstructorPatternBuilder {
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
                "constructor pattern must look for declarations or references",
            ));
        }
        let simple = super::name::split_qualified(self.type_name.trim()).1.to_string();
        let rule = self.rule.unwrap_or_default().validate(Some(&simple))?;
        let declaring = TypeName::parse(Some(&self.type_name), rule)?;
        let parameters = build_parameters(
            self.parameter_qualifications,
            self.parameter_simple_names,
            self.parameter_names.as_ref(),
            rule,
        )?;

        // references always resolve: implicit super calls and default constructors
        // only show up through bindings
        let must_resolve = declaring.qualification.is_some()
            || parameters
                .as_ref()
                .is_some_and(|params| params.iter().any(|p| p.qualification.is_some()))
            || self.references;

        Ok(Pattern::Constructor(ConstructorPattern {
            declaring,
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
    use crate::index::codec::{ConstructorDeclKey, ConstructorRefKey};

    #[test]
    fn references_must_resolve_declarations_do_not() {
        let refs = ConstructorPattern::builder("Widget").references().build().unwrap();
        assert!(refs.must_resolve());
        let decls = ConstructorPattern::builder("Widget").declarations().build().unwrap();
        assert!(!decls.must_resolve());
        let qualified = ConstructorPattern::builder("com.acme.Widget").declarations().build().unwrap();
        assert!(qualified.must_resolve());
    }

    #[test]
    fn decoded_keys_check_type_and_arity() {
        let p = ConstructorPattern::builder("Widget")
            .parameter_types(["int"])
            .declarations()
            .references()
            .build()
            .unwrap();
        assert!(p.matches_decoded_key(&DecodedKey::ConstructorRef(ConstructorRefKey {
            type_name: "Widget".into(),
            arg_count: 1,
        })));
        assert!(!p.matches_decoded_key(&DecodedKey::ConstructorRef(ConstructorRefKey {
            type_name: "Widget".into(),
            arg_count: 0,
        })));
        assert!(p.matches_decoded_key(&DecodedKey::ConstructorDecl(ConstructorDeclKey {
            type_name: "Widget".into(),
            parameter_types: vec!["int".into()],
            parameter_names: vec!["size".into()],
            ..ConstructorDeclKey::default()
        })));
    }
}
