//! Knowledge store: loading, validation, and snapshot management.
//!
//! The store owns an immutable [`Snapshot`] behind a shared handle. Readers
//! clone the handle and work on the snapshot without holding any lock;
//! [`KnowledgeStore::reload`] builds a complete replacement first and only
//! then swaps the handle, so a failed reload leaves the active snapshot
//! exactly as it was.

mod entry;

pub use entry::KnowledgeEntry;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use thiserror::Error;

use entry::RawEntry;

/// Errors that can occur when loading a knowledge source.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read knowledge source {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse knowledge source: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid knowledge entry '{id}': {reason}")]
    Schema { id: String, reason: String },
}

/// An immutable, ordered set of validated entries.
///
/// Entry order is the key order of the source document and is used for
/// deterministic tie-breaking during retrieval.
#[derive(Debug, Default)]
pub struct Snapshot {
    entries: Vec<KnowledgeEntry>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    /// Load and validate a knowledge source file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Load` if the file cannot be read,
    /// `StoreError::Parse` if it is not a JSON object keyed by entry id, and
    /// `StoreError::Schema` for the first invalid entry.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents)
    }

    /// Parse and validate a knowledge source held in memory.
    ///
    /// Fails fast: the first invalid entry aborts the whole load.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Parse` or `StoreError::Schema`, see [`Snapshot::load`].
    pub fn from_json(contents: &str) -> Result<Self, StoreError> {
        let SourceRecords(records) = serde_json::from_str(contents)?;

        let mut entries = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for (id, value) in records {
            if index.contains_key(&id) {
                return Err(StoreError::Schema {
                    id,
                    reason: "duplicate entry id".to_string(),
                });
            }

            let raw = RawEntry::deserialize(value).map_err(|e| StoreError::Schema {
                id: id.clone(),
                reason: e.to_string(),
            })?;
            let entry = raw
                .validate(&id)
                .map_err(|reason| StoreError::Schema { id: id.clone(), reason })?;

            index.insert(id, entries.len());
            entries.push(entry);
        }

        Ok(Self { entries, index })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KnowledgeEntry> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn list_all(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Distinct category labels, sorted. Uncategorized entries are skipped.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| entry.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A knowledge source bound to its active snapshot.
#[derive(Debug)]
pub struct KnowledgeStore {
    source: PathBuf,
    active: RwLock<Arc<Snapshot>>,
}

impl KnowledgeStore {
    /// Load the source and build the initial snapshot.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the initial load.
    pub fn open(source: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let source = source.into();
        let snapshot = Snapshot::load(&source)?;
        Ok(Self::with_snapshot(source, snapshot))
    }

    /// Wrap an already-built snapshot. Later reloads read from `source`.
    #[must_use]
    pub fn with_snapshot(source: impl Into<PathBuf>, snapshot: Snapshot) -> Self {
        Self {
            source: source.into(),
            active: RwLock::new(Arc::new(snapshot)),
        }
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The currently active snapshot.
    ///
    /// The returned handle stays valid (and unchanged) across reloads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        // The lock only guards an Arc swap, so a poisoned lock still holds a
        // complete snapshot.
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<KnowledgeEntry> {
        self.snapshot().get(id).cloned()
    }

    #[must_use]
    pub fn list_all(&self) -> Vec<KnowledgeEntry> {
        self.snapshot().list_all().to_vec()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.snapshot().categories()
    }

    /// Re-read the source and atomically replace the active snapshot.
    ///
    /// Returns the number of entries in the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns the load error; the previous snapshot stays active.
    pub fn reload(&self) -> Result<usize, StoreError> {
        let snapshot = Snapshot::load(&self.source)?;
        let count = snapshot.len();

        let mut active = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *active = Arc::new(snapshot);

        Ok(count)
    }
}

/// Top-level source document: entry records in document order.
///
/// Deserialized by hand so that key order is kept and duplicate ids can be
/// detected instead of silently overwritten.
struct SourceRecords(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for SourceRecords {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordsVisitor;

        impl<'de> Visitor<'de> for RecordsVisitor {
            type Value = SourceRecords;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object keyed by entry id")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut records = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((id, value)) = map.next_entry::<String, serde_json::Value>()? {
                    records.push((id, value));
                }
                Ok(SourceRecords(records))
            }
        }

        deserializer.deserialize_map(RecordsVisitor)
    }
}
