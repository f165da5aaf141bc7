//! Query keyword extraction.
//!
//! Queries and entry keywords share one token shape: lower-cased, split on
//! whitespace, with surrounding punctuation removed. Inner punctuation is
//! kept, so `node.js`, `c++` and `c#` are single tokens.

use std::collections::BTreeSet;

/// Characters stripped from both ends of a token.
const EDGE_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}', '"', '\'', '`',
];

/// Words that never carry retrieval signal.
const STOPWORDS: &[&str] = &[
    "a", "am", "an", "and", "are", "as", "at", "be", "but", "by", "can", "did", "do", "does",
    "dr", "for", "from", "has", "have", "how", "i", "in", "is", "it", "its", "me", "my", "not",
    "of", "on", "or", "so", "tell", "that", "the", "their", "there", "this", "to", "was", "we",
    "were", "what", "when", "where", "which", "who", "whom", "whose", "why", "with", "you",
    "your",
];

fn normalize(word: &str) -> String {
    word.trim_matches(EDGE_PUNCTUATION).to_lowercase()
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Turns free text into a normalized set of significant tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Lower-case, split on whitespace, strip edge punctuation, drop stopwords.
    #[must_use]
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        text.split_whitespace()
            .map(normalize)
            .filter(|token| !token.is_empty() && !is_stopword(token))
            .collect()
    }

    /// Normalize an entry keyword into the shape [`KeywordExtractor::extract`]
    /// produces.
    ///
    /// # Errors
    ///
    /// Returns a reason when no query could ever produce the keyword: it is
    /// empty after normalization, spans several words, or is a stopword.
    pub fn normalize_keyword(&self, keyword: &str) -> Result<String, String> {
        let token = normalize(keyword.trim());

        if token.is_empty() {
            return Err("is empty".to_string());
        }
        if token.contains(char::is_whitespace) {
            return Err(format!(
                "'{token}' contains whitespace; list each word as its own keyword"
            ));
        }
        if is_stopword(&token) {
            return Err(format!("'{token}' is a stopword and never matches"));
        }

        Ok(token)
    }
}
