//! Collaborator-facing retrieval engine.
//!
//! Bundles the store, the retriever, and the configured search options behind
//! a single owned value. Callers construct one at startup and pass it by
//! reference to whatever needs knowledge lookups.

use std::path::{Path, PathBuf};

use crate::context::format_context;
use crate::search::{RetrievalResult, Retriever, SearchOptions, SearchOutcome};
use crate::stats::{self, KnowledgeStats};
use crate::store::{KnowledgeEntry, KnowledgeStore, StoreError};

/// Knowledge retrieval with an on/off switch.
///
/// When disabled, the source is never read and every query yields nothing.
pub struct KnowledgeEngine {
    source: PathBuf,
    store: Option<KnowledgeStore>,
    retriever: Retriever,
    options: SearchOptions,
}

impl KnowledgeEngine {
    /// Open the engine, loading the knowledge source if `enabled`.
    ///
    /// # Errors
    ///
    /// Returns the initial load error. The caller decides whether that is
    /// fatal.
    pub fn open(
        source: impl Into<PathBuf>,
        enabled: bool,
        options: SearchOptions,
    ) -> Result<Self, StoreError> {
        let source = source.into();

        let store = if enabled {
            let store = KnowledgeStore::open(&source)?;
            tracing::info!(
                source = %source.display(),
                entries = store.snapshot().len(),
                "Loaded knowledge base"
            );
            Some(store)
        } else {
            tracing::info!("Knowledge retrieval is disabled");
            None
        };

        Ok(Self {
            source,
            store,
            retriever: Retriever::new(),
            options,
        })
    }

    /// Build an engine around an existing store, e.g. one with a custom scorer.
    #[must_use]
    pub fn from_parts(store: KnowledgeStore, retriever: Retriever, options: SearchOptions) -> Self {
        Self {
            source: store.source().to_path_buf(),
            store: Some(store),
            retriever,
            options,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Search with the configured options.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<RetrievalResult> {
        self.search_with(query, &self.options)
    }

    /// Search with caller-supplied options.
    #[must_use]
    pub fn search_with(&self, query: &str, options: &SearchOptions) -> Vec<RetrievalResult> {
        self.trace(query, options).results
    }

    /// Search and return the extracted tokens and best candidate as well.
    #[must_use]
    pub fn trace(&self, query: &str, options: &SearchOptions) -> SearchOutcome {
        let Some(ref store) = self.store else {
            return SearchOutcome::default();
        };

        let snapshot = store.snapshot();
        let outcome = self.retriever.search_traced(
            &snapshot,
            query,
            options.max_results(),
            options.min_relevance(),
        );

        match outcome.best_match {
            Some(ref best) => tracing::debug!(
                tokens = ?outcome.tokens,
                best_entry = %best.entry_id,
                best_score = best.score,
                results = outcome.results.len(),
                "Knowledge search"
            ),
            None => tracing::debug!(
                tokens = ?outcome.tokens,
                "Knowledge search found no matching entries"
            ),
        }

        outcome
    }

    /// Search with the configured options and render the injectable block.
    ///
    /// Empty when nothing relevant was found.
    #[must_use]
    pub fn context_for(&self, query: &str) -> String {
        format_context(&self.search(query))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<KnowledgeEntry> {
        self.store.as_ref().and_then(|store| store.get(id))
    }

    /// All entries in store order.
    #[must_use]
    pub fn entries(&self) -> Vec<KnowledgeEntry> {
        self.store
            .as_ref()
            .map(KnowledgeStore::list_all)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn search_by_category(&self, category: &str) -> Vec<KnowledgeEntry> {
        self.store
            .as_ref()
            .map(|store| {
                self.retriever
                    .search_by_category(&store.snapshot(), category)
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_categories(&self) -> Vec<String> {
        self.store
            .as_ref()
            .map(KnowledgeStore::categories)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_stats(&self) -> KnowledgeStats {
        match self.store {
            Some(ref store) => stats::collect(&store.snapshot(), Some(store.source())),
            None => KnowledgeStats::disabled(),
        }
    }

    /// Re-read the knowledge source and swap in the new snapshot.
    ///
    /// Returns the new entry count, or `None` when retrieval is disabled.
    ///
    /// # Errors
    ///
    /// Returns the load error; the previous snapshot keeps serving queries.
    pub fn reload(&self) -> Result<Option<usize>, StoreError> {
        let Some(ref store) = self.store else {
            return Ok(None);
        };

        match store.reload() {
            Ok(count) => {
                tracing::info!(entries = count, "Knowledge base reloaded");
                Ok(Some(count))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Knowledge reload failed; keeping previous snapshot");
                Err(e)
            }
        }
    }
}
