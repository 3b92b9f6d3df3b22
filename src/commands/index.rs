// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build or refresh the index of a source root

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use codematch::config::Config;
use codematch::index::writer::{IndexStats, SourceIndexer};
use codematch::output::print_json;

#[derive(Debug, Serialize)]
struct IndexReport {
    root: PathBuf,
    #[serde(flatten)]
    stats: IndexStats,
}

pub fn run(
    path: Option<&str>,
    force: bool,
    quiet: bool,
    config: &Config,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let root = match path {
        Some(p) => PathBuf::from(p)
            .canonicalize()
            .with_context(|| format!("cannot index '{}': no such directory", p))?,
        None => std::env::current_dir()?.canonicalize()?,
    };

    let stats = SourceIndexer::new(&root)
        .with_excludes(config.exclude_patterns.clone())
        .force(force)
        .with_progress(!quiet && format == OutputFormat::Text)
        .run()
        .with_context(|| format!("failed to index {}", root.display()))?;

    match format {
        OutputFormat::Json => print_json(&IndexReport { root, stats }, compact)?,
        OutputFormat::Text => {
            println!(
                "{} Indexed {} of {} files in {} ({} unchanged, {} removed, {} keys)",
                "✓".green(),
                stats.indexed.to_string().cyan(),
                stats.scanned,
                root.display().to_string().yellow(),
                stats.unchanged,
                stats.removed,
                stats.keys
            );
            if stats.failed > 0 {
                println!("{} {} files could not be parsed", "!".yellow(), stats.failed);
            }
        }
    }
    Ok(())
}
