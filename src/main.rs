// SPDX-License-Identifier: MIT OR Apache-2.0

//! codematch - Java declaration and reference search
//!
//! Index-backed candidate lookup with tree-sitter parsing and a light
//! binder to grade every match as accurate or inaccurate.

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, OutputFormat};
use codematch::config::{Config, ConfigOutputFormat};
use commands::search::SearchArgs;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load();
    let format = cli.format.unwrap_or(match config.output_format() {
        Some(ConfigOutputFormat::Json) => OutputFormat::Json,
        _ => OutputFormat::Text,
    });

    match cli.command {
        Commands::Index { path, force, quiet } => {
            commands::index::run(path.as_deref(), force, quiet, &config, format, cli.compact)?;
        }
        Commands::Search {
            kind,
            name,
            declaring,
            params,
            returns,
            field_type,
            decls,
            refs,
            read,
            write,
            mode,
            case_sensitive,
            ignore_case,
            super_kind,
            file,
            offset,
            path,
            exclude,
            limit,
            batch_size,
            accurate,
        } => {
            let args = SearchArgs {
                kind: Some(kind),
                name,
                declaring,
                params,
                returns,
                field_type,
                decls,
                refs,
                read,
                write,
                mode: mode.unwrap_or_default(),
                case_sensitive: if case_sensitive {
                    true
                } else if ignore_case {
                    false
                } else {
                    config.case_sensitive.unwrap_or(false)
                },
                super_kind,
                file,
                offset,
                paths: path,
                exclude,
                limit: config.merge_max_results(limit),
                batch_size,
                accurate_only: accurate,
            };
            commands::search::run(&args, &config, format, cli.compact)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "codematch", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Logs go to stderr, filtered by `CODEMATCH_LOG` (default `warn`).
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("CODEMATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
