//! Offline cache worker
//!
//! A background network-intercepting cache layer: pre-caches a fixed
//! asset manifest at install, evicts stale cache generations at
//! activation, and answers intercepted fetches cache-first (static
//! assets) or network-first (API and data endpoints).

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod store;
pub mod strategy;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{CacheError, CacheResult};
pub use fetch::{HttpFetcher, NetworkFetcher, Request, RequestMode};
pub use manifest::AssetManifest;
pub use store::{CacheStore, DiskStore, MemoryStore, RequestKey, ResponseKind, ResponseSnapshot};
pub use worker::{EventOutcome, OfflineWorker, WorkerEvent, WorkerState};
