// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output helpers shared by the commands: JSON rendering of match records
//! and the colored text listing.

use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::element::ElementHandle;
use crate::matching::{Accuracy, MatchRecord};

/// Print a value as JSON, pretty unless `compact`.
pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", rendered);
    Ok(())
}

/// JSON view of one match.
#[derive(Debug, Serialize)]
pub struct MatchView<'a> {
    pub path: &'a str,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
    pub accuracy: Accuracy,
    pub rule: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flavors: Vec<&'static str>,
    pub declaration: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub write: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub in_doc_comment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<&'a ElementHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<&'a ElementHandle>,
    /// The matched source text.
    pub text: String,
}

impl<'a> MatchView<'a> {
    pub fn new(record: &'a MatchRecord, text: String) -> Self {
        Self {
            path: &record.document,
            line: record.line,
            column: record.column,
            offset: record.offset,
            length: record.length,
            accuracy: record.accuracy,
            rule: record.rule_names(),
            flavors: record.flavor_names(),
            declaration: record.is_declaration,
            read: record.is_read_access,
            write: record.is_write_access,
            in_doc_comment: record.is_inside_doc_comment,
            element: record.element.as_ref(),
            target: record.target.as_ref(),
            text,
        }
    }
}

/// Source text a record covers, read back from its file.
pub fn matched_text(record: &MatchRecord) -> String {
    read_span(&record.path, record.offset, record.length).unwrap_or_default()
}

fn read_span(path: &Path, offset: usize, length: usize) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content.get(offset..offset + length).map(str::to_string)
}

/// The colored text listing of a query's matches.
pub fn print_text(title: &str, records: &[MatchRecord]) {
    if records.is_empty() {
        println!("{} No matches found for: {}", "✗".red(), title.yellow());
        return;
    }
    println!("\n{} Matches of: {}\n", "🔍".cyan(), title.yellow());
    for record in records {
        let accuracy = match record.accuracy {
            Accuracy::Accurate => "accurate".green(),
            Accuracy::Inaccurate => "inaccurate".yellow(),
        };
        let mut tags: Vec<&str> = Vec::new();
        if record.is_declaration {
            tags.push("decl");
        }
        if record.is_write_access {
            tags.push("write");
        } else if record.is_read_access {
            tags.push("read");
        }
        if record.is_inside_doc_comment {
            tags.push("doc");
        }
        tags.extend(record.flavor_names());
        let element = record
            .element
            .as_ref()
            .map(|e| format!(" in {}", e))
            .unwrap_or_default();
        println!(
            "  {}:{}:{} {} {}{}",
            record.document.cyan(),
            record.line.to_string().yellow(),
            record.column.to_string().dimmed(),
            accuracy,
            tags.join(",").dimmed(),
            element.dimmed()
        );
    }
    println!("\n{} Found {} matches", "✓".green(), records.len().to_string().cyan());
}
