//! Scripted fetcher and worker setup shared across integration tests

use async_trait::async_trait;
use offline_worker::{
    CacheError, CacheResult, CacheStore, MemoryStore, NetworkFetcher, OfflineWorker, Request,
    RequestKey, ResponseSnapshot, WorkerConfig,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Network fetcher with canned per-URL responses and observable call
/// counts, so cache-first's "no network call occurs" is testable.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, ResponseSnapshot>>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for a URL
    pub fn respond(&self, url: &str, snapshot: ResponseSnapshot) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), snapshot);
    }

    /// Script a 200 response with a body derived from each URL
    pub fn serve(&self, urls: &[String]) {
        for url in urls {
            self.respond(url, ResponseSnapshot::ok(format!("asset:{url}")));
        }
    }

    /// Simulate network loss (or restoration)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// How many times a URL was fetched
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl NetworkFetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> CacheResult<ResponseSnapshot> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(request.url.clone())
            .or_insert(0) += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::network(&request.url, "offline (mock)"));
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| ResponseSnapshot::with_status(404, "not found")))
    }
}

/// Store wrapper whose writes to one generation fail, for exercising
/// opportunistic-write error handling
pub struct BrokenWriteStore {
    inner: MemoryStore,
    failing_generation: String,
}

impl BrokenWriteStore {
    pub fn new(failing_generation: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing_generation: failing_generation.to_string(),
        }
    }
}

#[async_trait]
impl CacheStore for BrokenWriteStore {
    async fn open(&self, name: &str) -> CacheResult<()> {
        self.inner.open(name).await
    }

    async fn put(
        &self,
        generation: &str,
        key: &RequestKey,
        snapshot: ResponseSnapshot,
    ) -> CacheResult<()> {
        if generation == self.failing_generation {
            return Err(CacheError::store_io(
                format!("writing to {generation}"),
                std::io::Error::other("no space left on device"),
            ));
        }
        self.inner.put(generation, key, snapshot).await
    }

    async fn match_in(
        &self,
        generation: &str,
        key: &RequestKey,
    ) -> CacheResult<Option<ResponseSnapshot>> {
        self.inner.match_in(generation, key).await
    }

    async fn match_any(&self, key: &RequestKey) -> CacheResult<Option<ResponseSnapshot>> {
        self.inner.match_any(key).await
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        self.inner.delete(name).await
    }

    async fn list_names(&self) -> CacheResult<Vec<String>> {
        self.inner.list_names().await
    }
}

/// Small manifest used by most tests
pub fn test_config() -> WorkerConfig {
    let mut config = WorkerConfig::default();
    config.assets = vec![
        "./index.html".to_string(),
        "./css/styles.css".to_string(),
        "./js/charts.js".to_string(),
        "./offline.html".to_string(),
    ];
    config
}

/// A worker over a fresh memory store and scripted fetcher, with the
/// manifest already being served
pub fn test_worker() -> (Arc<MemoryStore>, Arc<MockFetcher>, OfflineWorker) {
    test_worker_with(test_config())
}

pub fn test_worker_with(
    config: WorkerConfig,
) -> (Arc<MemoryStore>, Arc<MockFetcher>, OfflineWorker) {
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.serve(&config.assets);

    let worker = OfflineWorker::new(
        &config,
        store.clone() as Arc<dyn offline_worker::CacheStore>,
        fetcher.clone() as Arc<dyn NetworkFetcher>,
    )
    .expect("test worker config is valid");

    (store, fetcher, worker)
}

/// Drive a worker through install + activate
pub async fn installed_worker() -> (Arc<MemoryStore>, Arc<MockFetcher>, OfflineWorker) {
    let (store, fetcher, worker) = test_worker();
    worker.install().await.expect("install succeeds");
    worker.activate().await.expect("activate succeeds");
    (store, fetcher, worker)
}
