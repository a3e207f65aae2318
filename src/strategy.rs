//! Retrieval strategies
//!
//! Two inverse cache/network orderings over the same pair of handles:
//! cache-first for static assets (staleness is resolved at activation,
//! not per request) and network-first for API and data endpoints
//! (cache only serves degraded mode). Both receive the store and
//! fetcher injected, so neither touches ambient global state.

use crate::error::CacheResult;
use crate::fetch::{NetworkFetcher, Request};
use crate::store::{CacheStore, RequestKey, ResponseSnapshot};
use std::sync::Arc;
use tracing::{debug, warn};

/// Strategy executor holding the injected store and fetcher
pub struct StrategyEngine {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn NetworkFetcher>,
    runtime_name: String,
    offline_fallback: RequestKey,
}

impl StrategyEngine {
    /// Create an engine writing opportunistic entries into the named
    /// runtime generation and serving the given offline fallback page
    pub fn new(
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn NetworkFetcher>,
        runtime_name: impl Into<String>,
        offline_fallback: &str,
    ) -> Self {
        Self {
            store,
            fetcher,
            runtime_name: runtime_name.into(),
            offline_fallback: RequestKey::from_url(offline_fallback),
        }
    }

    /// Cache-first with network fallback, for static assets.
    ///
    /// A cache hit returns immediately with no network call. On a miss
    /// the live response is returned, and a clone of it is written to
    /// the runtime generation when it is a clean 200. A failed fetch on
    /// a navigation degrades to the pre-cached offline page; any other
    /// failure propagates to the caller.
    pub async fn cache_first(&self, request: &Request) -> CacheResult<ResponseSnapshot> {
        let key = request.key();

        if let Some(hit) = self.store.match_any(&key).await? {
            debug!(key = %key, "Cache hit, network skipped");
            return Ok(hit);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.stash_runtime(&key, &response).await;
                Ok(response)
            }
            Err(err) if request.is_navigation() => {
                if let Some(page) = self.store.match_any(&self.offline_fallback).await? {
                    warn!(url = %request.url, "Navigation failed offline, serving fallback page");
                    return Ok(page);
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Network-first with cache fallback, for API calls and data files.
    ///
    /// The live response always wins when the network is up; a clean 200
    /// is also cloned into the runtime generation as last-known-good.
    /// When the network is down, a stale cached snapshot is better than
    /// nothing, but absence propagates the network error rather than
    /// being swallowed.
    pub async fn network_first(&self, request: &Request) -> CacheResult<ResponseSnapshot> {
        let key = request.key();

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.stash_runtime(&key, &response).await;
                Ok(response)
            }
            Err(err) => match self.store.match_any(&key).await? {
                Some(stale) => {
                    warn!(key = %key, error = %err, "Network down, serving cached snapshot");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    /// Write a clone of a cacheable response into the runtime generation.
    ///
    /// The clone happens before the caller sees the original: a snapshot
    /// body backed by `Bytes` can serve both the cache write and the
    /// caller without either consuming the other.
    ///
    /// The write is opportunistic. A store failure here must not cost
    /// the caller a live response it already has, so it is logged and
    /// swallowed; the entry is simply absent on the next lookup.
    async fn stash_runtime(&self, key: &RequestKey, response: &ResponseSnapshot) {
        if !response.is_cacheable() {
            debug!(key = %key, status = response.status, "Response not cacheable, skipping write");
            return;
        }
        if let Err(err) = self
            .store
            .put(&self.runtime_name, key, response.clone())
            .await
        {
            warn!(key = %key, error = %err, "Runtime cache write failed, serving response anyway");
        }
    }

    /// Pass a request straight to the network, no cache involvement.
    /// Used for fetch events that arrive before the worker is active.
    pub async fn pass_through(&self, request: &Request) -> CacheResult<ResponseSnapshot> {
        self.fetcher.fetch(request).await
    }

    pub(crate) fn fetcher(&self) -> &Arc<dyn NetworkFetcher> {
        &self.fetcher
    }
}

impl std::fmt::Debug for StrategyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyEngine")
            .field("runtime_name", &self.runtime_name)
            .field("offline_fallback", &self.offline_fallback)
            .finish()
    }
}
