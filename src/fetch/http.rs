//! Live HTTP fetcher backed by reqwest
//!
//! Resolves origin-relative URLs against the configured base origin and
//! converts responses into [`ResponseSnapshot`]s. A transport failure
//! (offline, DNS, timeout) maps to `CacheError::NetworkUnavailable`; an
//! HTTP error status is a snapshot like any other.

use crate::config::NetworkConfig;
use crate::error::{CacheError, CacheResult};
use crate::fetch::{NetworkFetcher, Request};
use crate::store::{ResponseKind, ResponseSnapshot};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::debug;

/// reqwest-backed network fetcher with a pooled client
pub struct HttpFetcher {
    client: reqwest::Client,
    base_origin: Option<String>,
}

impl HttpFetcher {
    /// Build a fetcher from network config
    pub fn new(config: &NetworkConfig) -> CacheResult<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CacheError::Internal(format!("building HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_origin: config
                .base_origin
                .as_ref()
                .map(|o| o.trim_end_matches('/').to_string()),
        })
    }

    /// Resolve a possibly-relative URL into an absolute one
    fn resolve(&self, url: &str) -> CacheResult<String> {
        if url.contains("://") {
            return Ok(url.to_string());
        }
        let base = self
            .base_origin
            .as_deref()
            .ok_or_else(|| CacheError::BaseOriginMissing(url.to_string()))?;

        let path = url.trim_start_matches('.');
        if path.starts_with('/') {
            Ok(format!("{base}{path}"))
        } else {
            Ok(format!("{base}/{path}"))
        }
    }

    /// Scheme + authority of an absolute URL
    fn origin_of(url: &str) -> Option<&str> {
        let scheme_end = url.find("://")?;
        let rest = &url[scheme_end + 3..];
        let authority_end = rest.find('/').unwrap_or(rest.len());
        Some(&url[..scheme_end + 3 + authority_end])
    }

    /// Whether a response from this URL can be inspected by the worker.
    /// Cross-origin responses without a CORS grant are opaque and must
    /// never be cached.
    fn response_kind(&self, resolved_url: &str, cors_header: Option<&str>) -> ResponseKind {
        let same_origin = match (&self.base_origin, Self::origin_of(resolved_url)) {
            (Some(base), Some(origin)) => base == origin,
            // No configured origin: nothing to compare against, treat as readable
            (None, _) => true,
            (_, None) => true,
        };

        if same_origin || cors_header.is_some() {
            ResponseKind::Basic
        } else {
            ResponseKind::Opaque
        }
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> CacheResult<ResponseSnapshot> {
        let url = self.resolve(&request.url)?;
        debug!(url = %url, "Live network fetch");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::network(&request.url, e.to_string()))?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let kind = self.response_kind(
            &url,
            headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case("access-control-allow-origin"))
                .map(|(_, v)| v.as_str()),
        );

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::network(&request.url, e.to_string()))?;

        Ok(ResponseSnapshot {
            status,
            headers,
            body,
            kind,
            cached_at: Utc::now(),
        })
    }
}
