//! Error types for the offline worker
//!
//! All modules use `CacheResult<T>` as their return type.

use crate::worker::WorkerState;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for offline worker operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in the offline worker
#[derive(Error, Debug)]
pub enum CacheError {
    // Manifest errors
    #[error("Invalid asset manifest: {reason}")]
    ManifestInvalid { reason: String },

    #[error("Install failed while populating {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    // Network errors
    #[error("Network request to {url} failed: {reason}")]
    NetworkUnavailable { url: String, reason: String },

    #[error("Cannot resolve relative URL {0} without a configured base origin")]
    BaseOriginMissing(String),

    // Lifecycle errors
    #[error("Cannot handle '{event}' event in state '{state}'")]
    InvalidTransition { state: WorkerState, event: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Store errors
    #[error("Cache store IO error: {context}")]
    StoreIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Create a store IO error with context
    pub fn store_io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::StoreIo {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NetworkUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-transition error
    pub fn invalid_transition(state: WorkerState, event: impl Into<String>) -> Self {
        Self::InvalidTransition {
            state,
            event: event.into(),
        }
    }

    /// Check if the error is expected to clear on its own (degraded mode
    /// rather than a bug): network loss is, a broken manifest is not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable { .. })
    }
}
