//! Command implementations shared by CLI and MCP server.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{Config, SearchConfig};
use crate::engine::KnowledgeEngine;
use crate::search::{RetrievalResult, SearchOptions};
use crate::stats::{self, KnowledgeStats};
use crate::store::{KnowledgeEntry, Snapshot};

/// Maximum accepted query length in characters.
pub const MAX_QUERY_LENGTH: usize = 1000;

/// Knowledge file written by `init`.
pub const STARTER_KNOWLEDGE: &str = r#"{
  "welcome": {
    "keywords": ["hello", "welcome", "start", "help"],
    "content": "Welcome! This assistant adds facts from its knowledge file to the conversation when a message mentions their keywords.",
    "category": "general"
  },
  "knowledge_format": {
    "keywords": ["knowledge", "entry", "format", "keywords"],
    "content": "Each knowledge entry has an id, a list of keywords, the content to inject, and an optional category.",
    "category": "general"
  }
}
"#;

/// Reject queries that are too long to be a conversational message.
fn validate_query(query: &str) -> anyhow::Result<()> {
    let length = query.chars().count();
    if length > MAX_QUERY_LENGTH {
        anyhow::bail!("Query too long: {length} chars (max {MAX_QUERY_LENGTH})");
    }
    Ok(())
}

/// Open the engine described by the config.
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `knowledge` - Knowledge file overriding the configured one
/// * `disable` - Force retrieval off regardless of config
///
/// # Errors
///
/// Returns an error if the `[retrieval]` settings are invalid or the
/// knowledge file cannot be loaded.
pub fn open_engine(
    config: &Config,
    knowledge: Option<&Path>,
    disable: bool,
) -> anyhow::Result<KnowledgeEngine> {
    let options = config.retrieval.options()?;
    let source = knowledge.map_or_else(|| config.knowledge_path(), Path::to_path_buf);
    let enabled = config.knowledge.enabled && !disable;

    KnowledgeEngine::open(&source, enabled, options)
        .with_context(|| format!("Failed to load knowledge base {}", source.display()))
}

/// Rank entries against a query using the `[search]` settings.
///
/// `limit` and `min_relevance` override the configured values.
///
/// # Errors
///
/// Returns an error if the query is too long or the effective settings are
/// invalid. Finding nothing is not an error.
pub fn search(
    engine: &KnowledgeEngine,
    settings: &SearchConfig,
    query: &str,
    limit: Option<i64>,
    min_relevance: Option<f32>,
) -> anyhow::Result<Vec<RetrievalResult>> {
    validate_query(query)?;

    let options = SearchOptions::new(
        limit.unwrap_or(settings.max_results),
        min_relevance.unwrap_or(settings.min_relevance),
    )?;

    Ok(engine.search_with(query, &options))
}

/// The context block injected for `query`, empty when nothing matched.
///
/// # Errors
///
/// Returns an error if the query is too long.
pub fn context(engine: &KnowledgeEngine, query: &str) -> anyhow::Result<String> {
    validate_query(query)?;
    Ok(engine.context_for(query))
}

/// Entries in file order, optionally restricted to one category.
#[must_use]
pub fn list(engine: &KnowledgeEngine, category: Option<&str>) -> Vec<KnowledgeEntry> {
    match category {
        Some(category) => engine.search_by_category(category),
        None => engine.entries(),
    }
}

/// Look up one entry by id.
///
/// # Errors
///
/// Returns an error if retrieval is disabled or the id is unknown.
pub fn get(engine: &KnowledgeEngine, id: &str) -> anyhow::Result<KnowledgeEntry> {
    if !engine.is_enabled() {
        anyhow::bail!("Knowledge retrieval is disabled");
    }

    engine
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Entry not found: {id}"))
}

/// Validate a knowledge file without opening an engine.
///
/// # Errors
///
/// Returns the load, parse, or schema error for the file.
pub fn check(path: &Path) -> anyhow::Result<KnowledgeStats> {
    let snapshot = Snapshot::load(path)?;
    Ok(stats::collect(&snapshot, Some(path)))
}

/// Write [`STARTER_KNOWLEDGE`] to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if writing
/// fails.
pub fn init(path: &Path, force: bool) -> anyhow::Result<PathBuf> {
    if path.exists() && !force {
        anyhow::bail!(
            "Knowledge file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, STARTER_KNOWLEDGE)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote starter knowledge file");
    Ok(path.to_path_buf())
}
