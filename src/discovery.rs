//! External document-finder collaborator.
//!
//! Discovery of canonical ToS/PP URLs from a homepage lives outside this
//! crate; the orchestrator consumes it through this trait with a bounded
//! timeout and treats every failure as non-fatal.

use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, warn};

use crate::types::DocumentType;

/// Finds the canonical legal-document URL for a site, best-effort.
pub trait DocumentFinder: Send + Sync {
    /// Returns the discovered canonical URL, or `None` when nothing better
    /// than the input is known.
    fn find_document_url<'a>(
        &'a self,
        url: &'a str,
        document_type: DocumentType,
    ) -> BoxFuture<'a, Option<String>>;
}

/// Run discovery under a timeout. Timeouts and empty answers both yield
/// `None`; extraction proceeds with the original URL.
pub(crate) async fn discover_with_timeout(
    finder: &dyn DocumentFinder,
    url: &str,
    document_type: DocumentType,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, finder.find_document_url(url, document_type)).await {
        Ok(Some(discovered)) => {
            debug!("document finder resolved {url} -> {discovered}");
            Some(discovered)
        }
        Ok(None) => None,
        Err(_) => {
            warn!("document discovery timed out after {timeout:?} for {url}");
            None
        }
    }
}
