//! Configuration loading for kbrag.

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::search::{RetrievalError, SearchOptions};

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "KBRAG_CONFIG";

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    /// Limits for automatic context injection.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Limits for explicit searches, looser than `retrieval`.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Location of the knowledge source and the retrieval switch.
#[derive(Debug, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_file")]
    pub file: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Result limits as written in the config file, validated on use.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_results")]
    pub max_results: i64,
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f32,
}

/// Result limits for the `search` command.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_max_results")]
    pub max_results: i64,
    #[serde(default = "default_search_min_relevance")]
    pub min_relevance: f32,
}

fn default_knowledge_file() -> String {
    "data/knowledge.json".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_max_results() -> i64 {
    3
}

fn default_min_relevance() -> f32 {
    0.1
}

fn default_search_max_results() -> i64 {
    10
}

fn default_search_min_relevance() -> f32 {
    0.05
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            file: default_knowledge_file(),
            enabled: default_enabled(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_relevance: default_min_relevance(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_search_max_results(),
            min_relevance: default_search_min_relevance(),
        }
    }
}

impl RetrievalConfig {
    /// Validate into search options.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Configuration` for a negative `max_results`
    /// or a `min_relevance` outside `[0.0, 1.0]`.
    pub fn options(&self) -> Result<SearchOptions, RetrievalError> {
        SearchOptions::new(self.max_results, self.min_relevance)
    }
}

impl SearchConfig {
    /// Validate into search options.
    ///
    /// # Errors
    ///
    /// Same rules as [`RetrievalConfig::options`].
    pub fn options(&self) -> Result<SearchOptions, RetrievalError> {
        SearchOptions::new(self.max_results, self.min_relevance)
    }
}

impl Config {
    /// Load config from `$KBRAG_CONFIG`, else ~/.config/kbrag/config.toml,
    /// else return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }

        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::from_path(&path);
        }

        Ok(Config::default())
    }

    /// Load config from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "kbrag").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The knowledge file with `~` expanded.
    #[must_use]
    pub fn knowledge_path(&self) -> PathBuf {
        expand_tilde(&self.knowledge.file)
    }
}

/// Expand ~ to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
