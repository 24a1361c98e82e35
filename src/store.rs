//! Named cache generations over the host's key-value storage
//!
//! Two generations are active at any time: a long-lived `static`
//! generation for versioned shell assets and a `dynamic` generation for
//! frequently-changing content. Each generation is an isolated map of
//! normalized request key to stored response. Operations are atomic per
//! key; there are no cross-key transactions.

use crate::error::{OfflineError, Result};
use crate::models::StoredResponse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Handle to an open cache generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    name: String,
}

impl Generation {
    /// The generation's version-stamped name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Store statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub generations: usize,
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

type GenerationMap = HashMap<String, HashMap<String, StoredResponse>>;

/// Store of named, isolated cache generations
///
/// Wraps the host's persistent cache facility; safe to call concurrently,
/// with last-write-wins semantics for racing writes to the same key.
#[derive(Clone)]
pub struct GenerationStore {
    storage: Arc<RwLock<GenerationMap>>,
    hits: Arc<RwLock<u64>>,
    misses: Arc<RwLock<u64>>,
}

impl Default for GenerationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationStore {
    /// Create an empty store
    pub fn new() -> Self {
        GenerationStore {
            storage: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
        }
    }

    /// Open a generation by name, creating it if absent
    ///
    /// Idempotent: opening the same name twice yields the same generation.
    pub async fn open_generation(&self, name: &str) -> Result<Generation> {
        let mut storage = self
            .storage
            .write()
            .map_err(|e| OfflineError::StorageFailure(e.to_string()))?;
        storage.entry(name.to_string()).or_default();
        debug!("Opened generation: {}", name);
        Ok(Generation {
            name: name.to_string(),
        })
    }

    /// Look up a stored response by key
    pub async fn get(&self, generation: &Generation, key: &str) -> Result<Option<StoredResponse>> {
        let result = {
            let storage = self
                .storage
                .read()
                .map_err(|e| OfflineError::StorageFailure(e.to_string()))?;
            storage
                .get(&generation.name)
                .and_then(|entries| entries.get(key))
                .cloned()
        };

        if result.is_some() {
            debug!("Cache hit: generation={}, key={}", generation.name, key);
            if let Ok(mut hits) = self.hits.write() {
                *hits += 1;
            }
        } else {
            debug!("Cache miss: generation={}, key={}", generation.name, key);
            if let Ok(mut misses) = self.misses.write() {
                *misses += 1;
            }
        }

        Ok(result)
    }

    /// Store a response under a key, overwriting any existing entry
    ///
    /// Callers only pass successful (2xx) responses; entries are never
    /// mutated afterwards, only overwritten by a newer write.
    pub async fn put(
        &self,
        generation: &Generation,
        key: &str,
        response: StoredResponse,
    ) -> Result<()> {
        let mut storage = self
            .storage
            .write()
            .map_err(|e| OfflineError::StorageFailure(e.to_string()))?;
        let entries = storage.entry(generation.name.clone()).or_default();
        entries.insert(key.to_string(), response);
        debug!("Stored entry: generation={}, key={}", generation.name, key);
        Ok(())
    }

    /// Names of all existing generations
    pub async fn list_generation_names(&self) -> Result<Vec<String>> {
        let storage = self
            .storage
            .read()
            .map_err(|e| OfflineError::StorageFailure(e.to_string()))?;
        Ok(storage.keys().cloned().collect())
    }

    /// Delete a generation and all its entries
    ///
    /// Returns whether the generation existed.
    pub async fn delete_generation(&self, name: &str) -> Result<bool> {
        let mut storage = self
            .storage
            .write()
            .map_err(|e| OfflineError::StorageFailure(e.to_string()))?;
        let existed = storage.remove(name).is_some();
        if existed {
            debug!("Deleted generation: {}", name);
        }
        Ok(existed)
    }

    /// Delete every generation unconditionally
    ///
    /// Returns the number of generations deleted.
    pub async fn delete_all(&self) -> Result<usize> {
        let mut storage = self
            .storage
            .write()
            .map_err(|e| OfflineError::StorageFailure(e.to_string()))?;
        let count = storage.len();
        storage.clear();
        debug!("Deleted all {} generations", count);
        Ok(count)
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        let (generations, total_entries) = self
            .storage
            .read()
            .map(|s| (s.len(), s.values().map(|g| g.len()).sum()))
            .unwrap_or((0, 0));
        let hits = self.hits.read().map(|h| *h).unwrap_or(0);
        let misses = self.misses.read().map(|m| *m).unwrap_or(0);

        StoreStats {
            generations,
            total_entries,
            hits,
            misses,
        }
    }
}
