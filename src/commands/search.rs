// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run a search against the index of the enclosing root

use anyhow::{bail, Context, Result};

use crate::cli::{CliMatchMode, CliSuperKind, OutputFormat, SearchKind};
use codematch::config::Config;
use codematch::engine::SearchEngine;
use codematch::errors::IndexNotFoundError;
use codematch::index::tantivy_store::TantivyIndex;
use codematch::output::{matched_text, print_json, print_text, MatchView};
use codematch::pattern::{
    ConstructorPattern, Directions, FieldPattern, LocalVariablePattern, MatchRule, MethodPattern, PackagePattern,
    Pattern, SuperTypeKind, SuperTypeReferencePattern, TypePattern,
};
use codematch::scope::PathScope;
use codematch::utils::get_root_with_index;

/// Search options after config defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub kind: Option<SearchKind>,
    pub name: String,
    pub declaring: Option<String>,
    pub params: Option<Vec<String>>,
    pub returns: Option<String>,
    pub field_type: Option<String>,
    pub decls: bool,
    pub refs: bool,
    pub read: bool,
    pub write: bool,
    pub mode: CliMatchMode,
    pub case_sensitive: bool,
    pub super_kind: CliSuperKind,
    pub file: Option<String>,
    pub offset: Option<usize>,
    pub paths: Vec<String>,
    pub exclude: Vec<String>,
    pub limit: Option<usize>,
    pub batch_size: Option<usize>,
    pub accurate_only: bool,
}

impl SearchArgs {
    fn rule(&self) -> MatchRule {
        let rule = match self.mode {
            CliMatchMode::Exact => MatchRule::exact(),
            CliMatchMode::Prefix => MatchRule::prefix(),
            CliMatchMode::Pattern => MatchRule::pattern(),
            CliMatchMode::Regexp => MatchRule::regexp(),
            CliMatchMode::Camel => MatchRule::camel_case(),
        };
        if self.case_sensitive {
            rule.case_sensitive()
        } else {
            rule.case_insensitive()
        }
    }

    /// Neither `--decls` nor any reference flag means both.
    fn directions(&self) -> Directions {
        if !self.decls && !self.refs && !self.read && !self.write {
            return Directions::ALL;
        }
        let references = if self.refs {
            Directions::REFERENCES
        } else {
            Directions::accesses(self.read, self.write)
        };
        if self.decls {
            references.with_declarations()
        } else {
            references
        }
    }
}

pub fn build_pattern(args: &SearchArgs) -> Result<Pattern> {
    let Some(kind) = args.kind else {
        bail!("no search kind given");
    };
    let rule = args.rule();
    let directions = args.directions();
    let pattern = match kind {
        SearchKind::Type => TypePattern::new(&args.name, directions, rule)?,
        SearchKind::Method => {
            let mut builder = MethodPattern::builder(args.name.as_str()).rule(rule);
            if let Some(declaring) = &args.declaring {
                builder = builder.declaring_type(declaring.as_str());
            }
            if let Some(returns) = &args.returns {
                builder = builder.return_type(returns.as_str());
            }
            if let Some(params) = &args.params {
                builder = builder.parameter_types(params.iter().map(String::as_str));
            }
            if directions.declarations {
                builder = builder.declarations();
            }
            if directions.references {
                builder = builder.references();
            }
            builder.build()?
        }
        SearchKind::Constructor => {
            let mut builder = ConstructorPattern::builder(args.name.as_str()).rule(rule);
            if let Some(params) = &args.params {
                builder = builder.parameter_types(params.iter().map(String::as_str));
            }
            if directions.declarations {
                builder = builder.declarations();
            }
            if directions.references {
                builder = builder.references();
            }
            builder.build()?
        }
        SearchKind::Field => FieldPattern::new(
            &args.name,
            args.declaring.as_deref(),
            args.field_type.as_deref(),
            directions,
            rule,
        )?,
        SearchKind::Local => {
            let (Some(file), Some(offset)) = (&args.file, args.offset) else {
                bail!(
                    "a local variable is identified by its declaration\n\n\
                     Example: codematch search local total --file src/A.java --offset 120"
                );
            };
            LocalVariablePattern::new(&args.name, file.as_str(), offset, directions)?
        }
        SearchKind::SuperType => {
            let kind = match args.super_kind {
                CliSuperKind::All => SuperTypeKind::All,
                CliSuperKind::Classes => SuperTypeKind::Classes,
                CliSuperKind::Interfaces => SuperTypeKind::Interfaces,
            };
            SuperTypeReferencePattern::new(&args.name, kind, rule)?
        }
        SearchKind::Package => PackagePattern::new(&args.name, directions, rule)?,
    };
    Ok(pattern)
}

pub fn run(args: &SearchArgs, config: &Config, format: OutputFormat, compact: bool) -> Result<()> {
    let pattern = build_pattern(args)?;
    let cwd = std::env::current_dir()?.canonicalize()?;
    let Some(root) = get_root_with_index(&cwd) else {
        return Err(IndexNotFoundError {
            index_path: TantivyIndex::index_path(&cwd).display().to_string(),
        }
        .into());
    };
    let store = TantivyIndex::open(&root).with_context(|| format!("failed to open index under {}", root.display()))?;

    let engine = SearchEngine::new(config.engine(args.batch_size)).with_root(&root, Box::new(store));
    let scope = args
        .paths
        .iter()
        .fold(PathScope::new(), |scope, p| scope.include(p.as_str()))
        .excludes(config.exclude_patterns.iter().cloned())
        .excludes(args.exclude.iter().cloned());

    let mut records = engine.search_all(&pattern, &scope)?;
    if args.accurate_only {
        records.retain(|r| r.is_accurate());
    }
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            let views: Vec<MatchView<'_>> = records
                .iter()
                .map(|record| MatchView::new(record, matched_text(record)))
                .collect();
            print_json(&views, compact)?;
        }
        OutputFormat::Text => print_text(&pattern.to_string(), &records),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codematch::pattern::PatternKind;

    fn args(kind: SearchKind, name: &str) -> SearchArgs {
        SearchArgs {
            kind: Some(kind),
            name: name.to_string(),
            case_sensitive: true,
            ..SearchArgs::default()
        }
    }

    #[test]
    fn no_direction_flags_means_everything() {
        let a = args(SearchKind::Field, "count");
        assert_eq!(a.directions(), Directions::ALL);
        let reads = SearchArgs {
            read: true,
            ..args(SearchKind::Field, "count")
        };
        let d = reads.directions();
        assert!(d.read_access && !d.write_access && !d.declarations);
    }

    #[test]
    fn every_kind_builds() {
        for (kind, expected) in [
            (SearchKind::Type, PatternKind::Type),
            (SearchKind::Method, PatternKind::Method),
            (SearchKind::Constructor, PatternKind::Constructor),
            (SearchKind::Field, PatternKind::Field),
            (SearchKind::SuperType, PatternKind::SuperTypeReference),
            (SearchKind::Package, PatternKind::Package),
        ] {
            assert_eq!(build_pattern(&args(kind, "Widget")).unwrap().kind(), expected);
        }
    }

    #[test]
    fn locals_need_their_declaration() {
        assert!(build_pattern(&args(SearchKind::Local, "total")).is_err());
        let located = SearchArgs {
            file: Some("A.java".into()),
            offset: Some(12),
            ..args(SearchKind::Local, "total")
        };
        assert_eq!(build_pattern(&located).unwrap().kind(), PatternKind::LocalVariable);
    }

    #[test]
    fn camel_case_and_case_flags_shape_the_rule() {
        let a = SearchArgs {
            mode: CliMatchMode::Camel,
            case_sensitive: false,
            ..args(SearchKind::Type, "NPE")
        };
        let rule = a.rule();
        assert!(rule.is_camel_case());
        assert!(!rule.is_case_sensitive());
    }
}
