// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for codematch
//!
//! Loads configuration from .codematchrc.toml in current directory or ~/.config/codematch/config.toml

use serde::Deserialize;
use std::path::Path;

use crate::errors::{SearchError, SearchResult};

/// `default_format` after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration loaded from .codematchrc.toml or ~/.config/codematch/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of results to print
    pub max_results: Option<usize>,
    /// Default output format (text or json)
    pub default_format: Option<String>,
    /// Patterns to exclude from indexing and search
    pub exclude_patterns: Vec<String>,
    /// Files parsed and resolved together before their trees are dropped
    pub max_batch_size: Option<usize>,
    /// Memory the engine may spend on live trees, mapped to a batch size
    pub memory_budget_mb: Option<u64>,
    /// Compare names case sensitively unless the command line says otherwise
    pub case_sensitive: Option<bool>,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .codematchrc.toml in current directory
    /// 2. ~/.config/codematch/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(Path::new(".codematchrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("codematch").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::parse(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    pub fn parse(content: &str) -> SearchResult<Self> {
        toml::from_str(content).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// The configured format, if it names a known one
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format.as_ref().and_then(|s| match s.to_lowercase().as_str() {
            "json" => Some(ConfigOutputFormat::Json),
            "text" => Some(ConfigOutputFormat::Text),
            _ => None,
        })
    }

    /// Merge CLI options with config (CLI wins)
    pub fn merge_max_results(&self, cli_value: Option<usize>) -> Option<usize> {
        cli_value.or(self.max_results)
    }

    /// Engine settings, with CLI overrides applied (CLI wins)
    pub fn engine(&self, cli_batch_size: Option<usize>) -> EngineConfig {
        let max_batch_size = cli_batch_size
            .or(self.max_batch_size)
            .unwrap_or_else(|| match self.memory_budget_mb {
                Some(mb) => EngineConfig::batch_size_for_memory(mb),
                None => EngineConfig::DEFAULT_BATCH_SIZE,
            });
        EngineConfig {
            max_batch_size: max_batch_size.max(1),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}

/// Settings the search engine is constructed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on units alive at once within a root.
    pub max_batch_size: usize,
    /// Passed to the compiler factory when it scans a root.
    pub exclude_patterns: Vec<String>,
}

impl EngineConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 400;

    /// 100 files per 256 MiB of budget, between 100 and 400.
    pub fn batch_size_for_memory(memory_mb: u64) -> usize {
        match memory_mb {
            0..=255 => 100,
            256..=511 => 200,
            512..=767 => 300,
            _ => 400,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Self::DEFAULT_BATCH_SIZE,
            exclude_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_tiers_map_to_batch_sizes() {
        assert_eq!(EngineConfig::batch_size_for_memory(64), 100);
        assert_eq!(EngineConfig::batch_size_for_memory(300), 200);
        assert_eq!(EngineConfig::batch_size_for_memory(700), 300);
        assert_eq!(EngineConfig::batch_size_for_memory(4096), 400);
    }

    #[test]
    fn cli_wins_over_file_values() {
        let config = Config::parse("max_batch_size = 50\nmemory_budget_mb = 100\nexclude_patterns = [\"gen\"]").unwrap();
        assert_eq!(config.engine(None).max_batch_size, 50);
        assert_eq!(config.engine(Some(7)).max_batch_size, 7);
        assert_eq!(config.engine(None).exclude_patterns, vec!["gen".to_string()]);

        let budget_only = Config::parse("memory_budget_mb = 100").unwrap();
        assert_eq!(budget_only.engine(None).max_batch_size, 100);
        assert_eq!(Config::default().engine(None).max_batch_size, EngineConfig::DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn output_format_is_case_insensitive() {
        let config = Config::parse("default_format = \"JSON\"").unwrap();
        assert_eq!(config.output_format(), Some(ConfigOutputFormat::Json));
        assert!(Config::parse("max_results = \"many\"").is_err());
    }
}
