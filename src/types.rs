//! Boundary types for extraction requests and results.
//!
//! These types serialize to the wire schema consumed by the routing layer:
//! `{url, document_type, text?, success, message, method_used}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of legal document being extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Terms of Service / Terms of Use
    Tos,
    /// Privacy Policy
    Pp,
}

impl DocumentType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tos => "tos",
            Self::Pp => "pp",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy produced (or last attempted to produce) a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Plain HTTP fetch + content selector heuristics
    Standard,
    /// Headless browser rendering
    Playwright,
    /// PDF fetch + text extraction
    Pdf,
    /// Lightweight whole-page-text fetch
    SimpleFetch,
}

impl ExtractionMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Playwright => "playwright",
            Self::Pdf => "pdf",
            Self::SimpleFetch => "simple_fetch",
        }
    }
}

/// An inbound extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub url: String,
    /// Defaults to [`DocumentType::Tos`] when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
}

impl ExtractionRequest {
    #[must_use]
    pub fn new(url: impl Into<String>, document_type: Option<DocumentType>) -> Self {
        Self {
            url: url.into(),
            document_type,
        }
    }
}

/// Terminal outcome of an extraction attempt.
///
/// `success == true` guarantees `text` is non-empty and at least the
/// configured minimum content length. Failures carry diagnostics in
/// `message` only; `text` stays `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Final URL the text came from (possibly redirected or discovered).
    pub url: String,
    pub document_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub success: bool,
    pub message: String,
    pub method_used: ExtractionMethod,
}

impl ExtractionResult {
    /// Build a successful result.
    #[must_use]
    pub fn success(
        url: impl Into<String>,
        document_type: DocumentType,
        text: impl Into<String>,
        message: impl Into<String>,
        method_used: ExtractionMethod,
    ) -> Self {
        Self {
            url: url.into(),
            document_type,
            text: Some(text.into()),
            success: true,
            message: message.into(),
            method_used,
        }
    }

    /// Build a failure result. `method_used` records the last strategy tried.
    #[must_use]
    pub fn failure(
        url: impl Into<String>,
        document_type: DocumentType,
        message: impl Into<String>,
        method_used: ExtractionMethod,
    ) -> Self {
        Self {
            url: url.into(),
            document_type,
            text: None,
            success: false,
            message: message.into(),
            method_used,
        }
    }
}
