//! Duplicate Detection Module
//!
//! Keeps track of which file first produced each fingerprint during a run.
//! The first path recorded for a fingerprint is the original; every later
//! path with the same fingerprint is reported as a duplicate of it.
//!
//! The index only grows. Nothing is ever overwritten or removed, and the
//! whole index is dropped when the run ends.
//!
//! # Example
//!
//! ```rust
//! use image_dupe::duplicate::detector::{DuplicateIndex, RecordOutcome};
//! use image_dupe::duplicate::identifier::Identifier;
//! use std::path::Path;
//!
//! let mut index = DuplicateIndex::new();
//! let fp = Identifier::from_bytes(b"000000000000");
//!
//! assert_eq!(index.record(fp, "x.png"), RecordOutcome::New);
//! assert_eq!(
//!     index.record(fp, "y.png"),
//!     RecordOutcome::Duplicate { original: "x.png".into() }
//! );
//! assert_eq!(index.original_of(&fp), Some(Path::new("x.png")));
//! ```

use super::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What happened when a fingerprint was recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First time this fingerprint was seen; the path is now its original
    New,
    /// Already seen; `original` is the path recorded first
    Duplicate { original: PathBuf },
}

impl RecordOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RecordOutcome::Duplicate { .. })
    }
}

/// Statistics about the duplicate index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of `record` calls
    pub recorded: usize,
    /// Number of distinct fingerprints
    pub unique: usize,
    /// Number of calls that hit an existing fingerprint
    pub duplicates: usize,
}

/// Run-scoped map from fingerprint to the first path that produced it
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    originals: HashMap<Fingerprint, PathBuf>,
    stats: IndexStats,
}

impl DuplicateIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under `fingerprint`, first one wins.
    ///
    /// Never fails. The lookup and the insert are one `Entry` operation, so
    /// there is no window between checking and inserting.
    pub fn record(&mut self, fingerprint: Fingerprint, path: impl Into<PathBuf>) -> RecordOutcome {
        self.stats.recorded += 1;

        match self.originals.entry(fingerprint) {
            Entry::Occupied(existing) => {
                self.stats.duplicates += 1;
                RecordOutcome::Duplicate {
                    original: existing.get().clone(),
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(path.into());
                self.stats.unique += 1;
                RecordOutcome::New
            }
        }
    }

    /// The path first recorded for `fingerprint`, if any
    pub fn original_of(&self, fingerprint: &Fingerprint) -> Option<&Path> {
        self.originals.get(fingerprint).map(PathBuf::as_path)
    }

    /// Number of distinct fingerprints
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}
