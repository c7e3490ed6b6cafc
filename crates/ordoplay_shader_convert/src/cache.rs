// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dedup cache: skips structural work for unchanged source materials.
//!
//! The cache is an owned service. Construct one, share it behind an `Arc`
//! if several threads convert materials, and pass it into each conversion.

use indexmap::IndexMap;
use ordoplay_shader_graph::MaterialId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One persisted cache entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Source material identifier
    pub source_id: String,
    /// Snapshot fingerprint the target was built from
    pub fingerprint: String,
    /// Target material
    pub target_id: MaterialId,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: String,
    target_id: MaterialId,
}

/// Result of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLookup {
    /// Target material for the source
    pub target_id: MaterialId,
    /// Whether the target came from the cache
    pub hit: bool,
}

/// Failure persisting the cache
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed cache file
    #[error("Invalid cache file: {0}")]
    Format(String),
}

/// Map from source material to the target built from it
#[derive(Debug, Default)]
pub struct DedupCache {
    entries: Mutex<IndexMap<String, CacheEntry>>,
}

impl DedupCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached target when `fingerprint` matches and the target is
    /// still live in `host`, otherwise run `convert` and store its result.
    ///
    /// The lock is held across `convert`, so lookups and stores for a key
    /// never interleave.
    pub fn get_or_convert<H: ?Sized, E>(
        &self,
        source_id: &str,
        fingerprint: &str,
        host: &mut H,
        is_live: impl Fn(&H, MaterialId) -> bool,
        convert: impl FnOnce(&mut H) -> Result<MaterialId, E>,
    ) -> Result<CacheLookup, E> {
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(source_id) {
            if entry.fingerprint == fingerprint && is_live(host, entry.target_id) {
                tracing::debug!(source = source_id, target = %entry.target_id, "cache hit");
                return Ok(CacheLookup {
                    target_id: entry.target_id,
                    hit: true,
                });
            }
            tracing::debug!(source = source_id, "cache entry stale");
        }

        tracing::debug!(source = source_id, "cache miss");
        let target_id = convert(host)?;
        entries.insert(
            source_id.to_string(),
            CacheEntry {
                fingerprint: fingerprint.to_string(),
                target_id,
            },
        );
        Ok(CacheLookup {
            target_id,
            hit: false,
        })
    }

    /// Target currently cached for a source
    pub fn target(&self, source_id: &str) -> Option<MaterialId> {
        self.entries.lock().get(source_id).map(|e| e.target_id)
    }

    /// Forget one source
    pub fn invalidate(&self, source_id: &str) -> bool {
        self.entries.lock().shift_remove(source_id).is_some()
    }

    /// Forget everything
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Entries in insertion order
    pub fn records(&self) -> Vec<CacheRecord> {
        self.entries
            .lock()
            .iter()
            .map(|(source_id, entry)| CacheRecord {
                source_id: source_id.clone(),
                fingerprint: entry.fingerprint.clone(),
                target_id: entry.target_id,
            })
            .collect()
    }

    /// Save the cache as a RON list of records
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(&self.records(), config)
            .map_err(|e| CacheError::Format(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a saved cache, dropping entries whose target is gone
    pub fn load(path: &Path, is_live: impl Fn(MaterialId) -> bool) -> Result<Self, CacheError> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<CacheRecord> =
            ron::from_str(&content).map_err(|e| CacheError::Format(e.to_string()))?;

        let total = records.len();
        let entries: IndexMap<String, CacheEntry> = records
            .into_iter()
            .filter(|r| is_live(r.target_id))
            .map(|r| {
                (
                    r.source_id,
                    CacheEntry {
                        fingerprint: r.fingerprint,
                        target_id: r.target_id,
                    },
                )
            })
            .collect();

        if entries.len() < total {
            tracing::info!(dropped = total - entries.len(), "discarded cache entries with missing targets");
        }
        Ok(Self {
            entries: Mutex::new(entries),
        })
    }
}
