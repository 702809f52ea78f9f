//! Fetch strategies, ordered cheapest-first.
//!
//! Each strategy independently fetches, parses, and scores candidate text;
//! the orchestrator only looks at success or failure. Failures are
//! non-fatal and make the cascade fall through to the next strategy.

pub mod browser;
pub mod pdf;
pub mod simple;
pub mod standard;

use futures::future::BoxFuture;

use crate::error::ExtractResult;
use crate::types::{DocumentType, ExtractionMethod, ExtractionResult};

pub use browser::BrowserRenderStrategy;
pub use pdf::PdfStrategy;
pub use simple::SimpleFetchStrategy;
pub use standard::StandardFetchStrategy;

/// One attempt-extraction capability in the cascade.
///
/// `return_url` is the canonical URL to report in results; it may differ
/// from `url` when discovery replaced the working URL.
pub trait FetchStrategy: Send + Sync {
    /// The method tag this strategy stamps on its results.
    fn method(&self) -> ExtractionMethod;

    /// Strategy name for log lines and failure messages.
    fn name(&self) -> &'static str {
        self.method().as_str()
    }

    /// Cheap applicability pre-check (the PDF strategy only runs on URLs
    /// that look like PDFs). Defaults to always applicable.
    fn applies(&self, _url: &str) -> bool {
        true
    }

    /// Attempt extraction. Errors are strategy-local; the orchestrator
    /// never propagates them past the cascade.
    fn attempt<'a>(
        &'a self,
        url: &'a str,
        document_type: DocumentType,
        return_url: &'a str,
    ) -> BoxFuture<'a, ExtractResult<ExtractionResult>>;
}
