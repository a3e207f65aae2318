//! In-memory cache store
//!
//! Concurrent map of generation name → entry map. This is the store the
//! worker runs against in tests and in hosts that keep their own
//! persistence outside the worker.

use crate::error::CacheResult;
use crate::store::{CacheStore, RequestKey, ResponseSnapshot};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// One named generation: a concurrent key→snapshot map
#[derive(Default)]
struct Generation {
    entries: DashMap<String, ResponseSnapshot>,
}

/// Thread-safe in-memory cache store
///
/// Per-key writes are last-write-wins via `DashMap`. Generation creation
/// order is tracked separately so `match_any` searches generations in
/// the order they were opened, the way the platform's combined lookup does.
#[derive(Default)]
pub struct MemoryStore {
    generations: DashMap<String, Arc<Generation>>,
    order: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn open_or_create(&self, name: &str) -> Arc<Generation> {
        let generation = self
            .generations
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(generation = name, "Creating cache generation");
                Arc::new(Generation::default())
            })
            .clone();

        let mut order = self.order.lock().expect("generation order lock poisoned");
        if !order.iter().any(|n| n == name) {
            order.push(name.to_string());
        }
        generation
    }

    fn names_in_order(&self) -> Vec<String> {
        self.order
            .lock()
            .expect("generation order lock poisoned")
            .clone()
    }

    /// Number of entries in a generation, if it exists
    pub fn len(&self, name: &str) -> Option<usize> {
        self.generations.get(name).map(|g| g.entries.len())
    }

    /// Whether a generation exists and holds no entries
    pub fn is_empty(&self, name: &str) -> bool {
        self.len(name).map(|n| n == 0).unwrap_or(true)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, name: &str) -> CacheResult<()> {
        self.open_or_create(name);
        Ok(())
    }

    async fn put(
        &self,
        generation: &str,
        key: &RequestKey,
        snapshot: ResponseSnapshot,
    ) -> CacheResult<()> {
        let generation = self.open_or_create(generation);
        generation.entries.insert(key.as_str().to_string(), snapshot);
        Ok(())
    }

    async fn match_in(
        &self,
        generation: &str,
        key: &RequestKey,
    ) -> CacheResult<Option<ResponseSnapshot>> {
        Ok(self
            .generations
            .get(generation)
            .and_then(|g| g.entries.get(key.as_str()).map(|e| e.clone())))
    }

    async fn match_any(&self, key: &RequestKey) -> CacheResult<Option<ResponseSnapshot>> {
        for name in self.names_in_order() {
            if let Some(generation) = self.generations.get(&name) {
                if let Some(entry) = generation.entries.get(key.as_str()) {
                    return Ok(Some(entry.clone()));
                }
            }
        }
        Ok(None)
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        let existed = self.generations.remove(name).is_some();
        if existed {
            let mut order = self.order.lock().expect("generation order lock poisoned");
            order.retain(|n| n != name);
            debug!(generation = name, "Deleted cache generation");
        }
        Ok(existed)
    }

    async fn list_names(&self) -> CacheResult<Vec<String>> {
        Ok(self.names_in_order())
    }
}
