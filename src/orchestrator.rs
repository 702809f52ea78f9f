//! Extraction orchestrator: URL normalization, cache, discovery, and the
//! strategy cascade.
//!
//! Pure coordination, no content heuristics of its own. Strategy errors
//! never propagate past this layer; cascading failure becomes one terminal
//! failure result.

use std::sync::Arc;

use log::{info, warn};

use crate::browser::{BrowserSession, SessionStatus};
use crate::cache::ResponseCache;
use crate::config::ExtractorConfig;
use crate::discovery::{discover_with_timeout, DocumentFinder};
use crate::error::ExtractResult;
use crate::fetch;
use crate::retry::RetryPolicy;
use crate::strategies::{
    BrowserRenderStrategy, FetchStrategy, PdfStrategy, SimpleFetchStrategy, StandardFetchStrategy,
};
use crate::types::{DocumentType, ExtractionMethod, ExtractionRequest, ExtractionResult};
use crate::utils::{looks_like_legal_url, normalize_url};

/// The extraction pipeline entry point.
///
/// Owns the response cache and the fixed strategy cascade; shares one HTTP
/// client across fetch strategies and one browser session across renders.
pub struct ExtractionService {
    config: ExtractorConfig,
    cache: ResponseCache,
    session: Arc<BrowserSession>,
    strategies: Vec<Box<dyn FetchStrategy>>,
    finder: Option<Arc<dyn DocumentFinder>>,
}

impl ExtractionService {
    /// Build the service with the default strategy cascade:
    /// PDF → standard fetch → simple fetch → browser render.
    pub fn new(config: ExtractorConfig) -> ExtractResult<Self> {
        let client = fetch::build_client(&config)?;
        let retry = RetryPolicy::new(config.retry_attempts(), config.retry_base_delay());
        let session = BrowserSession::new(&config);
        let min_content = config.min_content_length();

        let strategies: Vec<Box<dyn FetchStrategy>> = vec![
            Box::new(PdfStrategy::new(
                client.clone(),
                retry,
                config.max_pdf_pages(),
                min_content,
            )),
            Box::new(StandardFetchStrategy::new(client.clone(), retry, min_content)),
            Box::new(SimpleFetchStrategy::new(client, min_content)),
            Box::new(BrowserRenderStrategy::new(
                Arc::clone(&session),
                min_content,
                config.navigation_timeout(),
                config.relaxed_navigation_timeout(),
            )),
        ];

        Ok(Self::with_strategies(config, session, strategies))
    }

    /// Build the service around a custom cascade. Exposed for embedders
    /// and tests that substitute strategies.
    #[must_use]
    pub fn with_strategies(
        config: ExtractorConfig,
        session: Arc<BrowserSession>,
        strategies: Vec<Box<dyn FetchStrategy>>,
    ) -> Self {
        let cache = ResponseCache::new(config.cache_ttl(), config.cache_capacity());
        Self {
            config,
            cache,
            session,
            strategies,
            finder: None,
        }
    }

    /// Attach the external document-finder collaborator.
    #[must_use]
    pub fn with_finder(mut self, finder: Arc<dyn DocumentFinder>) -> Self {
        self.finder = Some(finder);
        self
    }

    #[must_use]
    pub fn session(&self) -> &Arc<BrowserSession> {
        &self.session
    }

    /// Run the cascade for one request. Always returns a well-formed
    /// result; failure is a normal outcome, not an error.
    pub async fn extract(&self, request: ExtractionRequest) -> ExtractionResult {
        let document_type = request.document_type.unwrap_or(DocumentType::Tos);

        let Some(normalized) = normalize_url(&request.url) else {
            return ExtractionResult::failure(
                request.url,
                document_type,
                crate::error::ExtractError::InvalidUrl.to_string(),
                ExtractionMethod::Standard,
            );
        };

        let cache_key = (normalized.clone(), document_type);
        if let Some(hit) = self.cache.get(&cache_key) {
            info!("cache hit for {normalized} ({document_type})");
            return hit;
        }

        let working_url = self.resolve_url(&normalized, document_type).await;

        let mut attempted: Vec<&'static str> = Vec::new();
        let mut browser_skipped = false;
        let mut last_method = ExtractionMethod::Standard;

        for strategy in &self.strategies {
            if !strategy.applies(&working_url) {
                continue;
            }
            if strategy.method() == ExtractionMethod::Playwright
                && self.session.status().await == SessionStatus::Failed
            {
                warn!("skipping browser render for {working_url}: session failed");
                browser_skipped = true;
                continue;
            }

            attempted.push(strategy.name());
            last_method = strategy.method();
            info!("attempting {} extraction for {working_url}", strategy.name());

            match strategy
                .attempt(&working_url, document_type, &working_url)
                .await
            {
                Ok(result) => {
                    self.cache.put(cache_key, result.clone());
                    return result;
                }
                Err(e) => {
                    warn!("{} strategy failed for {working_url}: {e}", strategy.name());
                }
            }
        }

        let mut message = if attempted.is_empty() {
            "Failed to extract content: no extraction method was applicable".to_string()
        } else {
            format!(
                "Failed to extract content. Exhausted methods: {}",
                attempted.join(", ")
            )
        };
        if browser_skipped {
            message.push_str("; browser rendering unavailable");
        }

        ExtractionResult::failure(working_url, document_type, message, last_method)
    }

    /// Replace the working URL with a discovered canonical legal-document
    /// URL when the input does not already look like one. Best-effort.
    async fn resolve_url(&self, url: &str, document_type: DocumentType) -> String {
        if looks_like_legal_url(url, document_type) {
            return url.to_string();
        }
        let Some(finder) = &self.finder else {
            return url.to_string();
        };
        match discover_with_timeout(
            finder.as_ref(),
            url,
            document_type,
            self.config.discovery_timeout(),
        )
        .await
        {
            Some(discovered) => {
                info!("using discovered document URL {discovered} for {url}");
                discovered
            }
            None => url.to_string(),
        }
    }

    /// Shut down the shared browser session.
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}
