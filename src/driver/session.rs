//! Per-collection run state, owned by the caller and lent to the driver.
//!
//! Keeping it outside the driver means whatever was written before an
//! interruption can still be counted after the driver's future is dropped.

use std::collections::HashSet;
use std::path::Path;

use crate::batch::Collection;
use crate::item::ItemId;
use crate::output::CollectionOutput;

/// Identity of a download source for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    /// Absolute image URL (detail-scan strategy).
    Url(String),
    /// Thumbnail item id (pattern-guess strategy).
    Item(ItemId),
}

/// Deduplication set and output sink for one collection run.
#[derive(Debug)]
pub struct ScrapeSession {
    seen: HashSet<SourceKey>,
    output: CollectionOutput,
}

impl ScrapeSession {
    /// Creates a session writing to `output`.
    #[must_use]
    pub fn new(output: CollectionOutput) -> Self {
        Self {
            seen: HashSet::new(),
            output,
        }
    }

    /// Creates a session for `collection` under `output_root`.
    #[must_use]
    pub fn for_collection(collection: &Collection, output_root: &Path) -> Self {
        Self::new(CollectionOutput::new(
            collection.output_dir(output_root),
            collection.prefix(),
        ))
    }

    /// Records `key` as attempted. Returns `false` if it already was.
    ///
    /// Called before the download starts, so a failed attempt is never retried
    /// within the same run.
    pub fn mark_seen(&mut self, key: SourceKey) -> bool {
        self.seen.insert(key)
    }

    /// Whether `key` has already been attempted.
    #[must_use]
    pub fn has_seen(&self, key: &SourceKey) -> bool {
        self.seen.contains(key)
    }

    /// Number of distinct sources attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.seen.len()
    }

    /// Number of images written.
    #[must_use]
    pub fn written(&self) -> u32 {
        self.output.written()
    }

    /// The output sink.
    #[must_use]
    pub fn output(&self) -> &CollectionOutput {
        &self.output
    }

    /// The output sink, mutably.
    pub fn output_mut(&mut self) -> &mut CollectionOutput {
        &mut self.output
    }
}
