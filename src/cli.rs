// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// codematch - Java declaration and reference search
///
/// Finds declarations and references of Java types, methods, constructors,
/// fields, locals and packages through a key index, then confirms each
/// candidate against the parsed and bound source.
#[derive(Parser, Debug)]
#[command(name = "codematch")]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Quickstart:\n  codematch index\n  codematch search method foo --declaring Widget --refs\n  codematch search type '*Service' --mode pattern --decls"
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Entity kind a search looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchKind {
    Type,
    Method,
    Constructor,
    Field,
    /// A local variable or parameter, identified by `--file` and `--offset`
    Local,
    /// References in `extends` / `implements` clauses
    SuperType,
    Package,
}

/// How names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliMatchMode {
    #[default]
    Exact,
    Prefix,
    /// `*` and `?` wildcards
    Pattern,
    Regexp,
    /// `NPE` finds `NullPointerException`
    Camel,
}

/// Which super type clauses count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliSuperKind {
    #[default]
    All,
    Classes,
    Interfaces,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or refresh the search index of a source root
    #[command(visible_alias = "i")]
    Index {
        /// Root to index (defaults to current directory)
        path: Option<String>,

        /// Rebuild from scratch instead of refreshing changed files
        #[arg(short, long)]
        force: bool,

        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,
    },

    /// Find declarations and references
    #[command(visible_alias = "s")]
    Search {
        /// What to look for
        #[arg(value_enum)]
        kind: SearchKind,

        /// Name to look for; may be qualified (`com.acme.Widget`)
        name: String,

        /// Declaring type of a method or field
        #[arg(short = 'd', long)]
        declaring: Option<String>,

        /// Parameter types of a method or constructor, comma separated
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        params: Option<Vec<String>>,

        /// Return type of a method
        #[arg(long)]
        returns: Option<String>,

        /// Type of a field
        #[arg(long = "field-type")]
        field_type: Option<String>,

        /// Report declarations
        #[arg(long)]
        decls: bool,

        /// Report references
        #[arg(long)]
        refs: bool,

        /// Field and local references: reads only
        #[arg(long)]
        read: bool,

        /// Field and local references: writes only
        #[arg(long)]
        write: bool,

        /// Name comparison mode
        #[arg(short = 'm', long, value_enum)]
        mode: Option<CliMatchMode>,

        /// Compare names case sensitively
        #[arg(short = 'c', long)]
        case_sensitive: bool,

        /// Compare names ignoring case
        #[arg(short = 'i', long, conflicts_with = "case_sensitive")]
        ignore_case: bool,

        /// Super type clauses to consider
        #[arg(long = "super-kind", value_enum, default_value = "all")]
        super_kind: CliSuperKind,

        /// Declaring document of a local variable, relative to the index root
        #[arg(long)]
        file: Option<String>,

        /// Byte offset of a local variable's declared name
        #[arg(long)]
        offset: Option<usize>,

        /// Only report from this root-relative directory (repeatable)
        #[arg(short, long)]
        path: Vec<String>,

        /// Skip documents matching this pattern (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Maximum number of matches to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Files parsed and resolved together
        #[arg(long = "batch-size")]
        batch_size: Option<usize>,

        /// Only print accurate matches
        #[arg(long)]
        accurate: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
