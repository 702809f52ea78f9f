//! Standard fetch strategy: HTTP GET with browser-mimicking headers plus
//! the full content-selector candidate set.

use futures::future::BoxFuture;
use log::info;

use crate::content::{self, pick_longest, Candidate};
use crate::error::{ExtractError, ExtractResult};
use crate::fetch;
use crate::retry::RetryPolicy;
use crate::types::{DocumentType, ExtractionMethod, ExtractionResult};

use super::FetchStrategy;

pub struct StandardFetchStrategy {
    client: reqwest::Client,
    retry: RetryPolicy,
    min_content: usize,
}

impl StandardFetchStrategy {
    #[must_use]
    pub fn new(client: reqwest::Client, retry: RetryPolicy, min_content: usize) -> Self {
        Self {
            client,
            retry,
            min_content,
        }
    }

    async fn extract(
        &self,
        url: &str,
        document_type: DocumentType,
        return_url: &str,
    ) -> ExtractResult<ExtractionResult> {
        let body = self.retry.run(|_| fetch::fetch_bytes(&self.client, url)).await?;
        let html = fetch::decode_body(&body);

        let candidates = content::html_candidates(&html, document_type, self.min_content)?;
        let best_len = candidates.iter().map(Candidate::char_len).max().unwrap_or(0);
        let winner = pick_longest(candidates, self.min_content).ok_or(ExtractError::TooShort {
            got: best_len,
            min: self.min_content,
        })?;

        info!(
            "standard fetch extracted {} chars from {url} via {} method",
            winner.char_len(),
            winner.method
        );
        Ok(ExtractionResult::success(
            return_url,
            document_type,
            winner.text,
            "Successfully extracted text content using standard method",
            ExtractionMethod::Standard,
        ))
    }
}

impl FetchStrategy for StandardFetchStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Standard
    }

    fn attempt<'a>(
        &'a self,
        url: &'a str,
        document_type: DocumentType,
        return_url: &'a str,
    ) -> BoxFuture<'a, ExtractResult<ExtractionResult>> {
        Box::pin(self.extract(url, document_type, return_url))
    }
}
