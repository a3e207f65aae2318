//! Asset manifest for install-time pre-caching
//!
//! The fixed, build-time list of URLs the site needs to render with no
//! network: entry pages, stylesheets, core scripts, and the offline
//! fallback page. Install is all-or-nothing over this list: a
//! partially cached manifest is worse than none, since the offline
//! fallback itself might be the missing entry.

use crate::error::{CacheError, CacheResult};
use sha2::{Digest, Sha256};

/// Assets baked in at build time, in install order
const DEFAULT_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./contact.html",
    "./tetris.html",
    "./terms-of-service.html",
    "./privacy-policy.html",
    "./session-timeline.html",
    "./offline.html",
    "./css/variables.css",
    "./css/reset.css",
    "./css/styles.css",
    "./css/nav.css",
    "./css/session-detail-modal.css",
    "./css/accessibility.css",
    "./css/responsive.css",
    "./css/skeleton.css",
    "./css/lazy-load.css",
    "./css/agent-metrics-table.css",
    "./css/roles-overview.css",
    "./css/agent-profile-card.css",
    "./css/agent-search.css",
    "./css/theme-toggle.css",
    "./css/services.css",
    "./css/portfolio.css",
    "./css/testimonials.css",
    "./css/footer.css",
    "./css/technologies.css",
    "./js/agent-metrics-table.js",
    "./js/agent-profile.js",
    "./js/agent-selector.js",
    "./js/token-usage-chart.js",
    "./js/theme-toggle.js",
    "./js/tetromino-shapes.js",
    "./js/table-keyboard-navigation.js",
    "./js/tetris.js",
    "./js/success-rate-chart.js",
    "./js/sticky-header.js",
    "./js/spy-activity.js",
    "./js/session-timeline.js",
    "./js/session-detail-modal.js",
    "./js/roles-overview.js",
    "./js/mobile-nav.js",
    "./js/lazy-load-images.js",
    "./js/hero-carousel.js",
    "./js/data-refresh.js",
    "./js/data-loader.js",
    "./js/charts.js",
    "./js/back-to-top.js",
    "./js/cache-performance-chart.js",
    "./js/audit-sessions.js",
];

/// Ordered list of must-have offline assets plus the offline fallback page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    urls: Vec<String>,
    offline_fallback: String,
}

impl AssetManifest {
    /// Build a manifest from an explicit asset list.
    ///
    /// The list must be non-empty, contain the offline fallback, and
    /// hold only origin-relative URLs; an absolute URL here would
    /// pre-cache someone else's content under our generation.
    pub fn new(
        urls: impl IntoIterator<Item = impl Into<String>>,
        offline_fallback: impl Into<String>,
    ) -> CacheResult<Self> {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        let offline_fallback = offline_fallback.into();

        if urls.is_empty() {
            return Err(CacheError::ManifestInvalid {
                reason: "asset list is empty".to_string(),
            });
        }
        if let Some(bad) = urls.iter().find(|u| u.contains("://")) {
            return Err(CacheError::ManifestInvalid {
                reason: format!("asset URL must be origin-relative: {bad}"),
            });
        }
        if !urls.iter().any(|u| u == &offline_fallback) {
            return Err(CacheError::ManifestInvalid {
                reason: format!("offline fallback {offline_fallback} is not in the asset list"),
            });
        }

        Ok(Self {
            urls,
            offline_fallback,
        })
    }

    /// The built-in manifest for the deployed site
    pub fn built_in(offline_fallback: impl Into<String>) -> CacheResult<Self> {
        Self::new(DEFAULT_ASSETS.iter().copied(), offline_fallback)
    }

    /// Asset URLs in install order
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Number of assets
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the manifest holds no assets (never true for a validated one)
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// The offline fallback page URL
    pub fn offline_fallback(&self) -> &str {
        &self.offline_fallback
    }

    /// Content fingerprint of the manifest: SHA-256 over the ordered URL
    /// list, truncated to 12 hex chars. Same asset list = same hash, so
    /// it can stand in for a hand-bumped version tag.
    pub fn version_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for url in &self.urls {
            hasher.update(url.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())[..12].to_string()
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        // The built-in list always contains ./offline.html
        Self::built_in("./offline.html").expect("built-in manifest is valid")
    }
}
