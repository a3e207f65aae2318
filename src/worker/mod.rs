//! Lifecycle controller
//!
//! Orchestrates the worker's three duties: install (populate the static
//! generation from the asset manifest, all-or-nothing), activate (evict
//! every generation that is neither current-static nor runtime, then
//! claim open pages), and fetch (classify, then run the matching
//! retrieval strategy).
//!
//! `install()` and `activate()` are the `event.waitUntil` analog: the
//! hosting runtime must await the returned future to completion before
//! recycling the worker. Dropping one mid-flight leaves at most a
//! non-current generation that the next attempt rewrites from scratch;
//! committed cache writes are never rolled back.

pub mod state;

pub use state::{EventOutcome, WorkerEvent, WorkerState};

use crate::classify::{Classifier, RequestClass};
use crate::config::WorkerConfig;
use crate::error::{CacheError, CacheResult};
use crate::fetch::{NetworkFetcher, Request};
use crate::manifest::AssetManifest;
use crate::store::{CacheStore, ResponseSnapshot};
use crate::strategy::StrategyEngine;
use futures_util::future::try_join_all;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// The offline cache worker
///
/// One logical instance per static-generation name. Fetch events may be
/// dispatched concurrently from independent tasks; the store is the only
/// shared mutable state and every method takes `&self`.
pub struct OfflineWorker {
    static_name: String,
    runtime_name: String,
    manifest: AssetManifest,
    classifier: Classifier,
    engine: StrategyEngine,
    store: Arc<dyn CacheStore>,
    state: RwLock<WorkerState>,
}

impl OfflineWorker {
    /// Build a worker from config with an injected store and fetcher.
    ///
    /// The worker starts in `Installing`; the host drives it through
    /// [`dispatch`](Self::dispatch) or the lifecycle methods directly.
    pub fn new(
        config: &WorkerConfig,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn NetworkFetcher>,
    ) -> CacheResult<Self> {
        let manifest = if config.assets.is_empty() {
            AssetManifest::built_in(&config.cache.offline_fallback)?
        } else {
            AssetManifest::new(config.assets.clone(), &config.cache.offline_fallback)?
        };

        let engine = StrategyEngine::new(
            Arc::clone(&store),
            fetcher,
            &config.cache.runtime,
            &config.cache.offline_fallback,
        );

        Ok(Self {
            static_name: config.cache.static_name(),
            runtime_name: config.cache.runtime.clone(),
            manifest,
            classifier: Classifier::new(&config.classify),
            engine,
            store,
            state: RwLock::new(WorkerState::Installing),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        *self.state.read().expect("worker state lock poisoned")
    }

    /// Name of the static generation this version owns
    pub fn static_cache_name(&self) -> &str {
        &self.static_name
    }

    /// The asset manifest this version installs
    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    fn set_state(&self, new_state: WorkerState) {
        let mut state = self.state.write().expect("worker state lock poisoned");
        if *state != new_state {
            debug!(from = %state, to = %new_state, "Worker state transition");
            *state = new_state;
        }
    }

    /// Single entry point for host-delivered events, keyed by event kind
    pub async fn dispatch(&self, event: WorkerEvent) -> CacheResult<EventOutcome> {
        match event {
            WorkerEvent::Install => {
                self.install().await?;
                Ok(EventOutcome::Installed)
            }
            WorkerEvent::Activate => {
                self.activate().await?;
                Ok(EventOutcome::Activated)
            }
            WorkerEvent::Fetch(request) => {
                let response = self.handle_fetch(&request).await?;
                Ok(EventOutcome::Response(response))
            }
        }
    }

    /// Populate the static generation from the asset manifest.
    ///
    /// Every manifest URL is fetched concurrently and must come back
    /// 2xx. Nothing is written until all fetches succeed, so a failed
    /// install leaves no partially-populated generation behind; the
    /// worker version is discarded (`Redundant`) and the previous
    /// version, if any, keeps serving. On success the worker skips the
    /// normal hand-off wait and moves straight to `Waiting`.
    pub async fn install(&self) -> CacheResult<()> {
        let state = self.state();
        if state != WorkerState::Installing {
            return Err(CacheError::invalid_transition(state, "install"));
        }

        info!(
            generation = %self.static_name,
            assets = self.manifest.len(),
            "Installing: populating static generation"
        );

        let fetches = self.manifest.urls().iter().map(|url| async move {
            let request = Request::get(url.clone());
            let response = self
                .engine
                .fetcher()
                .fetch(&request)
                .await
                .map_err(|e| CacheError::InstallFailed {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            if !response.is_success() {
                return Err(CacheError::InstallFailed {
                    url: url.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            Ok::<_, CacheError>((request.key(), response))
        });

        let entries = match try_join_all(fetches).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "Install failed, discarding worker version");
                self.set_state(WorkerState::Redundant);
                return Err(err);
            }
        };

        self.store.open(&self.static_name).await?;
        for (key, response) in entries {
            if let Err(err) = self.store.put(&self.static_name, &key, response).await {
                // Do not leave a half-written generation registered as current
                warn!(error = %err, "Install write failed, deleting partial generation");
                self.store.delete(&self.static_name).await?;
                self.set_state(WorkerState::Redundant);
                return Err(err);
            }
        }

        info!(
            generation = %self.static_name,
            "Install complete, skipping waiting phase"
        );
        self.set_state(WorkerState::Waiting);
        Ok(())
    }

    /// Evict stale generations and take control of open pages.
    ///
    /// Deletes every generation whose name is neither the current static
    /// name nor the runtime name, reclaiming storage from prior
    /// deployments. The runtime generation survives every activation.
    pub async fn activate(&self) -> CacheResult<()> {
        let state = self.state();
        if state != WorkerState::Waiting {
            return Err(CacheError::invalid_transition(state, "activate"));
        }

        let mut evicted = 0usize;
        for name in self.store.list_names().await? {
            if name != self.static_name && name != self.runtime_name {
                self.store.delete(&name).await?;
                info!(generation = %name, "Evicted stale cache generation");
                evicted += 1;
            }
        }

        self.set_state(WorkerState::Active);
        info!(
            generation = %self.static_name,
            evicted,
            "Activated, claiming open pages"
        );
        Ok(())
    }

    /// Resolve a fetch event to a response.
    ///
    /// Before activation the request passes through to the network
    /// untouched. A `Redundant` worker refuses fetches outright.
    pub async fn handle_fetch(&self, request: &Request) -> CacheResult<ResponseSnapshot> {
        let state = self.state();
        if state.is_terminal() {
            return Err(CacheError::invalid_transition(state, "fetch"));
        }
        if !state.can_intercept_fetch() {
            debug!(url = %request.url, state = %state, "Not active, passing request through");
            return self.engine.pass_through(request).await;
        }

        match self.classifier.classify(request) {
            RequestClass::ApiOrData => {
                debug!(url = %request.url, "Network-first");
                self.engine.network_first(request).await
            }
            RequestClass::Static => {
                debug!(url = %request.url, "Cache-first");
                self.engine.cache_first(request).await
            }
        }
    }
}

impl std::fmt::Debug for OfflineWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineWorker")
            .field("static_name", &self.static_name)
            .field("runtime_name", &self.runtime_name)
            .field("state", &self.state())
            .finish()
    }
}
