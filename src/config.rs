//! Configuration for the extraction pipeline.
//!
//! All knobs have fixed defaults matching production behavior; override
//! individual values through the builder.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters for [`ExtractionService`](crate::orchestrator::ExtractionService)
/// and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Time-to-live for cached extraction results.
    pub(crate) cache_ttl_secs: u64,
    /// Maximum number of cached results before eviction.
    pub(crate) cache_capacity: usize,
    /// Timeout for a standard HTTP fetch (a 1s grace is added on top for
    /// connection teardown).
    pub(crate) fetch_timeout_secs: u64,
    /// Timeout for the external document-finder collaborator.
    pub(crate) discovery_timeout_secs: u64,
    /// Minimum number of characters for extracted text to count as content.
    pub(crate) min_content_length: usize,
    /// Page cap for PDF text extraction.
    pub(crate) max_pdf_pages: usize,
    /// Maximum simultaneously open browser pages.
    pub(crate) page_concurrency: usize,
    /// Interval between stale-page sweeps (checked on page acquisition).
    pub(crate) sweep_interval_secs: u64,
    /// Primary browser navigation timeout (readiness wait).
    pub(crate) navigation_timeout_secs: u64,
    /// Relaxed fallback navigation timeout when the primary wait times out.
    pub(crate) relaxed_navigation_timeout_secs: u64,
    /// Attempts per strategy for transient network errors.
    pub(crate) retry_attempts: u32,
    /// Base delay for exponential backoff between retries.
    pub(crate) retry_base_delay_ms: u64,
    /// Run the browser headless.
    pub(crate) headless: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            cache_capacity: 500,
            fetch_timeout_secs: 15,
            discovery_timeout_secs: 12,
            min_content_length: 100,
            max_pdf_pages: 30,
            page_concurrency: 3,
            sweep_interval_secs: 300,
            navigation_timeout_secs: 90,
            relaxed_navigation_timeout_secs: 45,
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
            headless: true,
        }
    }
}

impl ExtractorConfig {
    #[must_use]
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    #[must_use]
    pub const fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Fetch timeout plus the 1s teardown grace applied to the HTTP client.
    #[must_use]
    pub fn fetch_timeout_with_grace(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs + 1)
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    #[must_use]
    pub const fn min_content_length(&self) -> usize {
        self.min_content_length
    }

    #[must_use]
    pub const fn max_pdf_pages(&self) -> usize {
        self.max_pdf_pages
    }

    #[must_use]
    pub const fn page_concurrency(&self) -> usize {
        self.page_concurrency
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn relaxed_navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.relaxed_navigation_timeout_secs)
    }

    #[must_use]
    pub const fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    #[must_use]
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    #[must_use]
    pub const fn headless(&self) -> bool {
        self.headless
    }
}

/// Builder for [`ExtractorConfig`]. Every field falls back to the default.
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: Option<ExtractorConfig>,
}

impl ExtractorConfigBuilder {
    fn config(&mut self) -> &mut ExtractorConfig {
        self.config.get_or_insert_with(ExtractorConfig::default)
    }

    #[must_use]
    pub fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config().cache_ttl_secs = secs;
        self
    }

    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config().cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config().fetch_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn discovery_timeout_secs(mut self, secs: u64) -> Self {
        self.config().discovery_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn min_content_length(mut self, len: usize) -> Self {
        self.config().min_content_length = len;
        self
    }

    #[must_use]
    pub fn max_pdf_pages(mut self, pages: usize) -> Self {
        self.config().max_pdf_pages = pages;
        self
    }

    #[must_use]
    pub fn page_concurrency(mut self, pages: usize) -> Self {
        self.config().page_concurrency = pages.max(1);
        self
    }

    #[must_use]
    pub fn sweep_interval_secs(mut self, secs: u64) -> Self {
        self.config().sweep_interval_secs = secs;
        self
    }

    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.config().navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn relaxed_navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.config().relaxed_navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config().retry_attempts = attempts;
        self
    }

    #[must_use]
    pub fn retry_base_delay_ms(mut self, ms: u64) -> Self {
        self.config().retry_base_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config().headless = headless;
        self
    }

    #[must_use]
    pub fn build(mut self) -> ExtractorConfig {
        self.config.take().unwrap_or_default()
    }
}
