//! Configuration loading for the offline worker

pub mod schema;

pub use schema::{CacheNames, ClassifyConfig, NetworkConfig, WorkerConfig};

use crate::error::{CacheError, CacheResult};
use std::path::Path;
use tokio::fs;
use tracing::debug;

impl WorkerConfig {
    /// Load configuration from a TOML file, falling back to defaults if
    /// the file does not exist
    pub async fn load(path: &Path) -> CacheResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            CacheError::store_io(format!("reading config from {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| CacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
