//! Retrieval types, options, and the scoring trait.

pub mod keywords;
pub mod retriever;
pub mod scorer;

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

pub use keywords::KeywordExtractor;
pub use retriever::{BestMatch, Retriever, SearchOutcome};
pub use scorer::KeywordOverlapScorer;

/// Errors raised for caller-supplied retrieval settings.
#[derive(Debug, Error, PartialEq)]
pub enum RetrievalError {
    #[error("Invalid retrieval configuration: {0}")]
    Configuration(String),
}

/// Validated limits for a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    max_results: usize,
    min_relevance: f32,
}

impl SearchOptions {
    /// Build options from caller-supplied values.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Configuration` if `max_results` is negative or
    /// `min_relevance` is outside `[0.0, 1.0]`.
    pub fn new(max_results: i64, min_relevance: f32) -> Result<Self, RetrievalError> {
        if max_results < 0 {
            return Err(RetrievalError::Configuration(format!(
                "max_results must not be negative (got {max_results})"
            )));
        }
        // Saturates where usize is narrower than i64.
        let max_results = usize::try_from(max_results).unwrap_or(usize::MAX);

        if !(0.0..=1.0).contains(&min_relevance) {
            return Err(RetrievalError::Configuration(format!(
                "min_relevance must be between 0.0 and 1.0 (got {min_relevance})"
            )));
        }

        Ok(Self {
            max_results,
            min_relevance,
        })
    }

    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    #[must_use]
    pub fn min_relevance(&self) -> f32 {
        self.min_relevance
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 3,
            min_relevance: 0.1,
        }
    }
}

/// A scored match between a query and one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub entry_id: String,
    pub content: String,
    /// Always within `[0.0, 1.0]`.
    pub relevance_score: f32,
    pub matched_keywords: BTreeSet<String>,
    pub category: Option<String>,
}

/// Output of a [`RelevanceScorer`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Score {
    /// Relevance in `[0.0, 1.0]`; zero means no overlap.
    pub value: f32,
    /// Entry keywords found among the query tokens.
    pub matched: BTreeSet<String>,
}

/// Strategy for scoring an entry's keywords against query tokens.
///
/// Implementations must return a value within `[0.0, 1.0]`.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, entry_keywords: &BTreeSet<String>, query_tokens: &BTreeSet<String>) -> Score;
}
