//! Versioned response cache store
//!
//! The store holds named *generations*: independent key→snapshot maps.
//! Two names are significant by convention: the version-tagged static
//! generation (replaced every deployment) and the fixed runtime
//! generation (survives every activation). Snapshots are immutable once
//! stored; a newer write for the same key replaces the old one wholesale.
//!
//! Strategies only ever add entries. Deleting whole generations is the
//! lifecycle controller's job alone.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::error::CacheResult;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized cache lookup key derived from a request URL
///
/// The fragment never reaches the network, so it is stripped. The query
/// string is kept: data endpoints vary by query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    /// Normalize a URL into a lookup key
    pub fn from_url(url: &str) -> Self {
        let end = url.find('#').unwrap_or(url.len());
        Self(url[..end].to_string())
    }

    /// The normalized key string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility class of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin or CORS-readable: status and body are inspectable
    Basic,
    /// Cross-origin without CORS: contents cannot be inspected
    Opaque,
    /// A synthesized error response
    Error,
}

/// Immutable capture of a network response at the moment of caching
///
/// The body is a [`Bytes`] handle, so cloning a snapshot is a cheap
/// refcount bump. That is what makes "clone before both caching and
/// returning" affordable as a hard rule rather than an optimization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// HTTP status code
    pub status: u16,
    /// Response headers in wire order
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
    /// Visibility class
    pub kind: ResponseKind,
    /// When the snapshot was taken
    pub cached_at: DateTime<Utc>,
}

impl ResponseSnapshot {
    /// Create a 200 OK snapshot with the given body
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::with_status(200, body)
    }

    /// Create a snapshot with an explicit status
    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            kind: ResponseKind::Basic,
            cached_at: Utc::now(),
        }
    }

    /// Attach a header (builder style)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Mark the snapshot as opaque (cross-origin, uninspectable)
    pub fn into_opaque(mut self) -> Self {
        self.kind = ResponseKind::Opaque;
        self
    }

    /// First header value with the given name, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the response is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether this response may be written to the cache.
    ///
    /// Only clearly successful, inspectable responses are persisted:
    /// status exactly 200 and not opaque or synthesized-error. Anything
    /// else would poison the cache with content the site cannot vouch for.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// Body interpreted as UTF-8, lossy
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Abstract cache store interface
///
/// Mirrors the persistence surface the worker needs: open-or-create a
/// generation by name, put/match entries, delete a generation, list all
/// generation names. Implementations must be safe for concurrent use
/// with last-write-wins semantics per key; no caller holds locks across
/// these calls.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open a generation by name, creating it if absent
    async fn open(&self, name: &str) -> CacheResult<()>;

    /// Store a snapshot under a key in the named generation, creating
    /// the generation if needed. Replaces any existing entry wholesale.
    async fn put(
        &self,
        generation: &str,
        key: &RequestKey,
        snapshot: ResponseSnapshot,
    ) -> CacheResult<()>;

    /// Look up a key in one named generation
    async fn match_in(
        &self,
        generation: &str,
        key: &RequestKey,
    ) -> CacheResult<Option<ResponseSnapshot>>;

    /// Look up a key across all generations, oldest generation first
    /// (the combined lookup the platform cache API provides)
    async fn match_any(&self, key: &RequestKey) -> CacheResult<Option<ResponseSnapshot>>;

    /// Delete a whole generation; returns whether it existed
    async fn delete(&self, name: &str) -> CacheResult<bool>;

    /// Names of all generations currently present
    async fn list_names(&self) -> CacheResult<Vec<String>>;
}
