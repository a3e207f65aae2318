//! Request model and network boundary
//!
//! The worker never talks to the network directly; it goes through the
//! [`NetworkFetcher`] trait so strategies can be tested against a
//! scripted fetcher with observable call counts.

pub mod http;

pub use http::HttpFetcher;

use crate::error::CacheResult;
use crate::store::{RequestKey, ResponseSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How the response will be used by the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// The result replaces the current page (top-level navigation)
    Navigate,
    /// A sub-resource fetch (stylesheet, script, data, image)
    Subresource,
}

/// An intercepted network request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Target URL, absolute or origin-relative
    pub url: String,
    /// Navigation vs. sub-resource
    pub mode: RequestMode,
}

impl Request {
    /// A sub-resource GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Subresource,
        }
    }

    /// A top-level navigation request
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    /// Whether this request replaces the current page
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// The cache lookup key for this request
    pub fn key(&self) -> RequestKey {
        RequestKey::from_url(&self.url)
    }

    /// The path component of the URL: scheme and authority stripped for
    /// absolute URLs, query string and fragment always stripped.
    pub fn path(&self) -> &str {
        let mut rest = self.url.as_str();

        if let Some(idx) = rest.find("://") {
            rest = &rest[idx + 3..];
            // Cut the authority at the first slash; a URL like
            // "https://example.com" has an empty path.
            rest = match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            };
        }

        let end = rest
            .find(['?', '#'])
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

/// Abstract network access
///
/// Implementations resolve the request URL and return a complete
/// [`ResponseSnapshot`]. Transport-level failures (offline, DNS, timeout)
/// surface as `CacheError::NetworkUnavailable`; an HTTP error status is
/// not a fetch failure and comes back as a snapshot with that status.
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    /// Perform a live network fetch for the request
    async fn fetch(&self, request: &Request) -> CacheResult<ResponseSnapshot>;
}
