//! Error types for the extraction pipeline.
//!
//! Strategy failures are non-fatal to the orchestrator; the taxonomy here
//! exists so the cascade can distinguish retryable transport errors from
//! content-quality rejections that should fall through immediately.

use thiserror::Error;

/// Result alias for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Error taxonomy for the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Malformed or unusable input URL. Never retried.
    #[error("Invalid URL")]
    InvalidUrl,

    /// Transport-level failure (DNS, connect, timeout, non-2xx status).
    #[error("network error: {0}")]
    Network(String),

    /// Extracted text did not clear the minimum content length.
    #[error("content too short: {got} chars (minimum {min})")]
    TooShort { got: usize, min: usize },

    /// The page is a bot-verification / CAPTCHA challenge, not content.
    #[error("bot verification challenge detected")]
    BotChallenge,

    /// Runtime browser/page failure. Releases the lease, fails the strategy.
    #[error("browser error: {0}")]
    Browser(String),

    /// The browser session is in its terminal Failed state (or never
    /// started); the browser-render strategy is unavailable.
    #[error("browser session unavailable: {0}")]
    SessionUnavailable(String),

    /// PDF download or text extraction failure.
    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// Whether the retry policy should attempt this error again.
    ///
    /// Only transport errors are transient; content-quality and browser
    /// failures move the cascade to the next strategy instead.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<anyhow::Error> for ExtractError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} preserves the context chain
        Self::Other(format!("{err:#}"))
    }
}
