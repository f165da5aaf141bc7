//! Ranked retrieval over a knowledge snapshot.

use std::collections::BTreeSet;

use crate::search::{KeywordExtractor, KeywordOverlapScorer, RelevanceScorer, RetrievalResult};
use crate::store::{KnowledgeEntry, Snapshot};

/// The highest-scoring candidate seen for a query, before thresholding.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub entry_id: String,
    pub score: f32,
}

/// Results of a search along with the data needed to explain them.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Tokens extracted from the query.
    pub tokens: BTreeSet<String>,
    /// Best candidate, even if it fell below the relevance threshold.
    pub best_match: Option<BestMatch>,
    pub results: Vec<RetrievalResult>,
}

/// Orchestrates extraction, scoring, filtering, ranking, and truncation.
pub struct Retriever {
    extractor: KeywordExtractor,
    scorer: Box<dyn RelevanceScorer>,
}

impl Retriever {
    /// Create a retriever using keyword-overlap scoring.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scorer(KeywordOverlapScorer)
    }

    #[must_use]
    pub fn with_scorer(scorer: impl RelevanceScorer + 'static) -> Self {
        Self {
            extractor: KeywordExtractor::new(),
            scorer: Box::new(scorer),
        }
    }

    /// Rank the snapshot's entries against `query`.
    ///
    /// Entries with no overlap or a score below `min_relevance` are dropped.
    /// Results are ordered by descending score; equal scores keep snapshot
    /// order. An empty result is a normal outcome.
    #[must_use]
    pub fn search(
        &self,
        snapshot: &Snapshot,
        query: &str,
        max_results: usize,
        min_relevance: f32,
    ) -> Vec<RetrievalResult> {
        self.search_traced(snapshot, query, max_results, min_relevance)
            .results
    }

    /// Same as [`Retriever::search`], also returning the extracted tokens
    /// and the best candidate for diagnostics.
    #[must_use]
    pub fn search_traced(
        &self,
        snapshot: &Snapshot,
        query: &str,
        max_results: usize,
        min_relevance: f32,
    ) -> SearchOutcome {
        let tokens = self.extractor.extract(query);
        let mut best_match: Option<BestMatch> = None;
        let mut candidates = Vec::new();

        for entry in snapshot.list_all() {
            let score = self.scorer.score(&entry.keywords, &tokens);
            let value = if score.value.is_nan() {
                0.0
            } else {
                score.value.clamp(0.0, 1.0)
            };

            if value <= 0.0 {
                continue;
            }

            if best_match.as_ref().is_none_or(|best| value > best.score) {
                best_match = Some(BestMatch {
                    entry_id: entry.id.clone(),
                    score: value,
                });
            }

            if value < min_relevance {
                continue;
            }

            candidates.push((entry, value, score.matched));
        }

        // Stable sort: ties stay in snapshot order.
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(max_results);

        let results = candidates
            .into_iter()
            .map(|(entry, relevance_score, matched_keywords)| RetrievalResult {
                entry_id: entry.id.clone(),
                content: entry.content.clone(),
                relevance_score,
                matched_keywords,
                category: entry.category.clone(),
            })
            .collect();

        SearchOutcome {
            tokens,
            best_match,
            results,
        }
    }

    /// Entries whose category equals `category`, in snapshot order. No scoring.
    #[must_use]
    pub fn search_by_category(&self, snapshot: &Snapshot, category: &str) -> Vec<KnowledgeEntry> {
        snapshot
            .list_all()
            .iter()
            .filter(|entry| entry.category.as_deref() == Some(category))
            .cloned()
            .collect()
    }
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new()
    }
}
