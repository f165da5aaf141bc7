//! Aggregate statistics over a knowledge snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::store::Snapshot;

/// Summary of the active knowledge store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeStats {
    pub enabled: bool,
    pub total_entries: usize,
    pub total_keywords: usize,
    /// Entry count per category; uncategorized entries are not listed.
    pub categories: BTreeMap<String, usize>,
    pub average_keywords_per_entry: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl KnowledgeStats {
    /// Statistics reported when retrieval is switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            total_entries: 0,
            total_keywords: 0,
            categories: BTreeMap::new(),
            average_keywords_per_entry: 0.0,
            source: None,
        }
    }
}

/// Aggregate counts from a snapshot. Read-only.
#[must_use]
pub fn collect(snapshot: &Snapshot, source: Option<&Path>) -> KnowledgeStats {
    let mut categories = BTreeMap::new();
    let mut total_keywords = 0;

    for entry in snapshot.list_all() {
        total_keywords += entry.keywords.len();
        if let Some(ref category) = entry.category {
            *categories.entry(category.clone()).or_insert(0) += 1;
        }
    }

    let total_entries = snapshot.len();
    #[allow(clippy::cast_precision_loss)]
    let average_keywords_per_entry = if total_entries == 0 {
        0.0
    } else {
        total_keywords as f64 / total_entries as f64
    };

    KnowledgeStats {
        enabled: true,
        total_entries,
        total_keywords,
        categories,
        average_keywords_per_entry,
        source: source.map(Path::to_path_buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_entries_keywords_and_categories() {
        let snapshot = Snapshot::from_json(
            r#"{
                "a": {"keywords": ["one", "two", "three"], "content": "A", "category": "x"},
                "b": {"keywords": ["four"], "content": "B", "category": "x"},
                "c": {"keywords": ["five", "six"], "content": "C", "category": "y"},
                "d": {"keywords": ["seven", "eight"], "content": "D"}
            }"#,
        )
        .unwrap();

        let stats = collect(&snapshot, Some(Path::new("k.json")));

        assert!(stats.enabled);
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.total_keywords, 8);
        assert_eq!(stats.categories.get("x"), Some(&2));
        assert_eq!(stats.categories.get("y"), Some(&1));
        assert_eq!(stats.categories.len(), 2);
        assert!((stats.average_keywords_per_entry - 2.0).abs() < f64::EPSILON);
        assert_eq!(stats.source.as_deref(), Some(Path::new("k.json")));
    }

    #[test]
    fn empty_store_has_zero_average() {
        let stats = collect(&Snapshot::default(), None);
        assert_eq!(stats.total_entries, 0);
        assert!(stats.average_keywords_per_entry.abs() < f64::EPSILON);
    }

    #[test]
    fn disabled_reports_nothing() {
        let stats = KnowledgeStats::disabled();
        assert!(!stats.enabled);
        assert_eq!(stats.total_entries, 0);
    }
}
