//! Configuration schema for the offline worker
//!
//! Defaults mirror the deployed site: a version-tagged static cache
//! name, a fixed runtime cache name, and the `/api/` + `.json`
//! classification markers.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Cache naming settings
    pub cache: CacheNames,

    /// Request classification settings
    pub classify: ClassifyConfig,

    /// Network settings
    pub network: NetworkConfig,

    /// Override of the built-in asset manifest (empty = use built-in)
    pub assets: Vec<String>,
}

/// Names of the two significant cache generations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheNames {
    /// Site prefix for the static generation name
    pub prefix: String,

    /// Version tag; must change every deployment so activation can
    /// evict the previous static generation
    pub version_tag: String,

    /// Runtime generation name; must never change so opportunistically
    /// cached data survives upgrades
    pub runtime: String,

    /// Pre-cached page served when a navigation fails offline
    pub offline_fallback: String,
}

impl Default for CacheNames {
    fn default() -> Self {
        Self {
            prefix: "irsiksoftware".to_string(),
            version_tag: "v1".to_string(),
            runtime: "runtime-cache".to_string(),
            offline_fallback: "./offline.html".to_string(),
        }
    }
}

impl CacheNames {
    /// Name of the current static generation
    pub fn static_name(&self) -> String {
        format!("{}-{}", self.prefix, self.version_tag)
    }
}

/// Markers that route a request to the network-first strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Path segment marking API endpoints
    pub api_path_marker: String,

    /// File extension marking data files
    pub data_extension: String,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            api_path_marker: "/api/".to_string(),
            data_extension: ".json".to_string(),
        }
    }
}

/// Live fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Origin that relative URLs resolve against, e.g.
    /// `https://example.com` (no trailing slash)
    pub base_origin: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_origin: None,
            timeout_secs: 10,
        }
    }
}
