//! Keyword-overlap relevance scoring.

use std::collections::BTreeSet;

use crate::search::{RelevanceScorer, Score};

/// Scores an entry by the fraction of its keywords present in the query.
///
/// `score = |K ∩ Q| / max(|K|, 1)`, capped at 1.0. Query tokens that match
/// nothing do not lower the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordOverlapScorer;

impl RelevanceScorer for KeywordOverlapScorer {
    fn score(&self, entry_keywords: &BTreeSet<String>, query_tokens: &BTreeSet<String>) -> Score {
        let matched: BTreeSet<String> = entry_keywords
            .intersection(query_tokens)
            .cloned()
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let value = (matched.len() as f32 / entry_keywords.len().max(1) as f32).min(1.0);

        Score { value, matched }
    }
}
