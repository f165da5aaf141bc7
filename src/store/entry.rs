//! Knowledge entry types and source-record validation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::search::KeywordExtractor;

/// A single unit of stored knowledge.
///
/// Entries are only constructed through validation, so `keywords` and
/// `content` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeEntry {
    /// Identifier, unique within a loaded store.
    pub id: String,
    /// Keywords in query-token shape (see [`KeywordExtractor::extract`]).
    pub keywords: BTreeSet<String>,
    /// The text returned when the entry matches.
    pub content: String,
    /// Optional label for browsing; never used for scoring.
    pub category: Option<String>,
    /// Free-form data carried through untouched.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// One record as it appears in the knowledge source, before validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawEntry {
    keywords: Vec<String>,
    content: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl RawEntry {
    /// Validate the record and normalize it into a [`KnowledgeEntry`].
    ///
    /// Returns a human-readable reason on failure; the caller attaches the id.
    pub(crate) fn validate(self, id: &str) -> Result<KnowledgeEntry, String> {
        if id.trim().is_empty() {
            return Err("entry id cannot be empty".to_string());
        }

        if self.keywords.is_empty() {
            return Err("keywords cannot be empty".to_string());
        }

        let extractor = KeywordExtractor::new();
        let mut keywords = BTreeSet::new();
        for (position, keyword) in self.keywords.iter().enumerate() {
            let normalized = extractor
                .normalize_keyword(keyword)
                .map_err(|reason| format!("keyword at position {position} {reason}"))?;
            keywords.insert(normalized);
        }

        if self.content.trim().is_empty() {
            return Err("content cannot be empty".to_string());
        }

        if let Some(ref category) = self.category
            && category.trim().is_empty()
        {
            return Err("category cannot be blank when present".to_string());
        }

        Ok(KnowledgeEntry {
            id: id.to_string(),
            keywords,
            content: self.content,
            category: self.category,
            metadata: self.metadata,
        })
    }
}
