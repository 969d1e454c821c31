//! Persistence of the last fetched batch.
//!
//! There is exactly one snapshot: the most recent batch of headlines, kept
//! under a fixed key.  No history, no versioning, no expiry.

mod file;

pub use file::FileSnapshotStore;

use std::io;

use serde::Deserialize;

use crate::source::Headline;

/// Default snapshot key.
pub const DEFAULT_KEY: &str = "storedNews";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The stored value exists but is not a readable batch.  Callers treat
    /// this the same as an absent snapshot.
    #[error("snapshot is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("could not encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A single named JSON snapshot of headlines.
pub trait SnapshotStore {
    /// Return the saved batch, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<Vec<Headline>, StoreError>;

    /// Overwrite the snapshot with `batch`.
    fn save(&self, batch: &[Headline]) -> Result<(), StoreError>;
}

/// Accepted snapshot layouts.  Snapshots are written as a bare array; the
/// wrapped form matches a NewsAPI response body.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDoc {
    Bare(Vec<Headline>),
    Wrapped { articles: Vec<Headline> },
}

/// Decode a snapshot document.
pub(crate) fn decode(raw: &str) -> Result<Vec<Headline>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    // Decode as a Value first so a bad document reports the real serde
    // error rather than untagged's "did not match any variant".
    let value: serde_json::Value = serde_json::from_str(raw).map_err(StoreError::Malformed)?;
    match serde_json::from_value::<SnapshotDoc>(value).map_err(StoreError::Malformed)? {
        SnapshotDoc::Bare(batch) | SnapshotDoc::Wrapped { articles: batch } => Ok(batch),
    }
}

pub(crate) fn encode(batch: &[Headline]) -> Result<String, StoreError> {
    serde_json::to_string(batch).map_err(StoreError::Encode)
}
