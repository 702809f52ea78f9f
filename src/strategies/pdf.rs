//! PDF fetch + text extraction.
//!
//! Applicable when the URL path ends in `.pdf`; the response must also
//! prove itself PDF-like (Content-Type or `%PDF-` magic) before parsing.
//! Extraction is page-capped and processed in chunks to bound memory on
//! pathological documents.

use futures::future::BoxFuture;
use log::{debug, info};

use crate::error::{ExtractError, ExtractResult};
use crate::fetch::{self, FetchedBody};
use crate::retry::RetryPolicy;
use crate::types::{DocumentType, ExtractionMethod, ExtractionResult};
use crate::utils::looks_like_pdf;
use crate::utils::text::normalize_whitespace;

use super::FetchStrategy;

/// Pages joined per chunk while assembling the output string.
const PAGE_CHUNK: usize = 5;

pub struct PdfStrategy {
    client: reqwest::Client,
    retry: RetryPolicy,
    max_pages: usize,
    min_content: usize,
}

impl PdfStrategy {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        retry: RetryPolicy,
        max_pages: usize,
        min_content: usize,
    ) -> Self {
        Self {
            client,
            retry,
            max_pages,
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

        if !is_pdf(&body) {
            return Err(ExtractError::Pdf(format!(
                "response is not a PDF (content-type: {})",
                body.content_type.as_deref().unwrap_or("unknown")
            )));
        }

        let bytes = body.bytes;
        let max_pages = self.max_pages;
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes, max_pages))
            .await
            .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))??;

        let len = text.chars().count();
        if len < self.min_content {
            return Err(ExtractError::TooShort {
                got: len,
                min: self.min_content,
            });
        }

        info!("extracted {len} chars from PDF at {url}");
        Ok(ExtractionResult::success(
            return_url,
            document_type,
            text,
            "Successfully extracted text from PDF document",
            ExtractionMethod::Pdf,
        ))
    }
}

impl FetchStrategy for PdfStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Pdf
    }

    fn applies(&self, url: &str) -> bool {
        looks_like_pdf(url)
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

/// Content-Type says PDF, or the body starts with the PDF magic number.
fn is_pdf(body: &FetchedBody) -> bool {
    let ct_is_pdf = body
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/pdf"));
    ct_is_pdf || body.bytes.starts_with(b"%PDF-")
}

/// Page-wise text extraction capped at `max_pages`, assembled in chunks of
/// [`PAGE_CHUNK`] pages.
fn extract_pdf_text(bytes: &[u8], max_pages: usize) -> ExtractResult<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(format!("text extraction failed: {e}")))?;

    let total = pages.len();
    let capped = pages.len().min(max_pages);
    if capped < total {
        debug!("PDF has {total} pages, capping at {max_pages}");
    }

    let mut segments = Vec::with_capacity(capped.div_ceil(PAGE_CHUNK));
    for chunk in pages[..capped].chunks(PAGE_CHUNK) {
        let segment = normalize_whitespace(&chunk.join("\n"));
        if !segment.is_empty() {
            segments.push(segment);
        }
    }

    Ok(segments.join("\n\n"))
}
