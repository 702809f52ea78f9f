//! Simple fetch strategy: whole-page flattened text, no container
//! heuristics. A fast, low-fidelity fallback tried before paying for a
//! browser render.

use futures::future::BoxFuture;
use log::info;
use scraper::Html;

use crate::content::{bot_detect, maximal};
use crate::error::{ExtractError, ExtractResult};
use crate::fetch;
use crate::types::{DocumentType, ExtractionMethod, ExtractionResult};

use super::FetchStrategy;

pub struct SimpleFetchStrategy {
    client: reqwest::Client,
    min_content: usize,
}

impl SimpleFetchStrategy {
    #[must_use]
    pub fn new(client: reqwest::Client, min_content: usize) -> Self {
        Self {
            client,
            min_content,
        }
    }

    async fn extract(
        &self,
        url: &str,
        document_type: DocumentType,
        return_url: &str,
    ) -> ExtractResult<ExtractionResult> {
        let body = fetch::fetch_bytes(&self.client, url).await?;
        let html = fetch::decode_body(&body);

        if bot_detect::is_bot_challenge(&Html::parse_document(&html)) {
            return Err(ExtractError::BotChallenge);
        }

        let text = maximal::maximal_text(&html);
        let len = text.chars().count();
        if len < self.min_content {
            return Err(ExtractError::TooShort {
                got: len,
                min: self.min_content,
            });
        }

        info!("simple fetch extracted {len} chars from {url}");
        Ok(ExtractionResult::success(
            return_url,
            document_type,
            text,
            "Extracted full page text using simple fetch",
            ExtractionMethod::SimpleFetch,
        ))
    }
}

impl FetchStrategy for SimpleFetchStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::SimpleFetch
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
