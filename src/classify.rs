//! Request classification
//!
//! A two-way partition over intercepted requests: API calls and data
//! files go network-first, everything else is a static asset and goes
//! cache-first. Cross-origin requests run through the same rule; there
//! is no per-origin distinction.

use crate::config::ClassifyConfig;
use crate::fetch::Request;

/// The retrieval strategy class assigned to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// API endpoint or data file: freshness wins, cache is the fallback
    ApiOrData,
    /// Static asset: the cached copy wins, network fills misses
    Static,
}

/// Pure request → class function, parameterized by the path markers
#[derive(Debug, Clone)]
pub struct Classifier {
    api_path_marker: String,
    data_extension: String,
}

impl Classifier {
    /// Build a classifier from config markers
    pub fn new(config: &ClassifyConfig) -> Self {
        Self {
            api_path_marker: config.api_path_marker.clone(),
            data_extension: config.data_extension.clone(),
        }
    }

    /// Classify a request by its path: `ApiOrData` iff the path contains
    /// the API segment marker or ends in the data extension.
    pub fn classify(&self, request: &Request) -> RequestClass {
        let path = request.path();
        if path.contains(&self.api_path_marker) || path.ends_with(&self.data_extension) {
            RequestClass::ApiOrData
        } else {
            RequestClass::Static
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifyConfig::default())
    }
}
