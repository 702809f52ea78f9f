//! End-to-end cascade scenarios: real HTTP strategies against mockito,
//! stub strategies where a live browser would be required.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use policyscrape::strategies::{PdfStrategy, SimpleFetchStrategy, StandardFetchStrategy};
use policyscrape::{
    fetch, BrowserSession, DocumentFinder, DocumentType, ExtractError, ExtractionMethod,
    ExtractionRequest, ExtractionResult, ExtractionService, ExtractResult, FetchStrategy,
    RetryPolicy,
};

use common::{article_page, minimal_pdf, test_config};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

type AttemptFn =
    Box<dyn Fn(&str, DocumentType) -> ExtractResult<ExtractionResult> + Send + Sync>;

struct StubStrategy {
    method: ExtractionMethod,
    calls: Arc<AtomicUsize>,
    seen_urls: Arc<Mutex<Vec<String>>>,
    attempt_fn: AttemptFn,
}

impl StubStrategy {
    fn new(method: ExtractionMethod, attempt_fn: AttemptFn) -> Self {
        Self {
            method,
            calls: Arc::new(AtomicUsize::new(0)),
            seen_urls: Arc::new(Mutex::new(Vec::new())),
            attempt_fn,
        }
    }

    fn succeeding(method: ExtractionMethod, text: &str) -> Self {
        let text = text.to_string();
        Self::new(
            method,
            Box::new(move |url, document_type| {
                Ok(ExtractionResult::success(
                    url,
                    document_type,
                    text.clone(),
                    "stub success",
                    method,
                ))
            }),
        )
    }

    fn failing(method: ExtractionMethod, make_err: fn() -> ExtractError) -> Self {
        Self::new(method, Box::new(move |_, _| Err(make_err())))
    }

    fn call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn url_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.seen_urls)
    }
}

impl FetchStrategy for StubStrategy {
    fn method(&self) -> ExtractionMethod {
        self.method
    }

    fn attempt<'a>(
        &'a self,
        url: &'a str,
        document_type: DocumentType,
        _return_url: &'a str,
    ) -> BoxFuture<'a, ExtractResult<ExtractionResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_urls.lock().unwrap().push(url.to_string());
        let result = (self.attempt_fn)(url, document_type);
        Box::pin(async move { result })
    }
}

struct FixedFinder(String);

impl DocumentFinder for FixedFinder {
    fn find_document_url<'a>(
        &'a self,
        _url: &'a str,
        _document_type: DocumentType,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { Some(self.0.clone()) })
    }
}

/// Service with the real HTTP-based strategies (no browser render).
fn http_service() -> ExtractionService {
    let config = test_config();
    let client = fetch::build_client(&config).unwrap();
    let retry = RetryPolicy::new(config.retry_attempts(), config.retry_base_delay());
    let session = BrowserSession::new(&config);
    let min = config.min_content_length();

    let strategies: Vec<Box<dyn FetchStrategy>> = vec![
        Box::new(PdfStrategy::new(
            client.clone(),
            retry,
            config.max_pdf_pages(),
            min,
        )),
        Box::new(StandardFetchStrategy::new(client.clone(), retry, min)),
        Box::new(SimpleFetchStrategy::new(client, min)),
    ];
    ExtractionService::with_strategies(config, session, strategies)
}

fn stub_service(strategies: Vec<Box<dyn FetchStrategy>>) -> ExtractionService {
    let config = test_config();
    let session = BrowserSession::new(&config);
    ExtractionService::with_strategies(config, session, strategies)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn standard_extraction_from_article_page() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/terms")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(article_page())
        .create_async()
        .await;

    let service = http_service();
    let url = format!("{}/terms", server.url());
    let result = service
        .extract(ExtractionRequest::new(url, Some(DocumentType::Tos)))
        .await;

    assert!(result.success, "unexpected failure: {}", result.message);
    assert_eq!(result.method_used, ExtractionMethod::Standard);
    let text = result.text.unwrap();
    assert!(text.contains("govern your access"));
    assert!(!text.contains("Site navigation"));
    assert!(!text.contains("social media links"));
}

#[tokio::test]
async fn pdf_url_with_pdf_content_type_uses_pdf_method() {
    let body_text = "Legal terms apply to every user of this service. \
                     The provider disclaims all warranties to the maximum extent \
                     permitted by applicable law. Continued use constitutes acceptance.";
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/terms.pdf")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(minimal_pdf(body_text))
        .create_async()
        .await;

    let service = http_service();
    let url = format!("{}/terms.pdf", server.url());
    let result = service
        .extract(ExtractionRequest::new(url, Some(DocumentType::Tos)))
        .await;

    assert!(result.success, "unexpected failure: {}", result.message);
    assert_eq!(result.method_used, ExtractionMethod::Pdf);
    assert!(result.text.unwrap().contains("Legal terms apply"));
}

#[tokio::test]
async fn cascade_falls_back_to_browser_render() {
    // Standard and simple both hit a server that only errors
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/terms")
        .with_status(500)
        .expect_at_least(1)
        .create_async()
        .await;

    let config = test_config();
    let client = fetch::build_client(&config).unwrap();
    let retry = RetryPolicy::new(1, std::time::Duration::from_millis(1));
    let min = config.min_content_length();

    let browser_stub = StubStrategy::succeeding(
        ExtractionMethod::Playwright,
        &"rendered legal text ".repeat(20),
    );
    let browser_calls = browser_stub.call_count();

    let service = stub_service(vec![
        Box::new(StandardFetchStrategy::new(client.clone(), retry, min)),
        Box::new(SimpleFetchStrategy::new(client, min)),
        Box::new(browser_stub),
    ]);

    let url = format!("{}/terms", server.url());
    let result = service
        .extract(ExtractionRequest::new(url, Some(DocumentType::Tos)))
        .await;

    assert!(result.success);
    assert_eq!(result.method_used, ExtractionMethod::Playwright);
    assert_eq!(browser_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn terminal_failure_when_all_methods_exhausted() {
    let service = stub_service(vec![
        Box::new(StubStrategy::failing(ExtractionMethod::Standard, || {
            ExtractError::Network("connection refused".into())
        })),
        Box::new(StubStrategy::failing(ExtractionMethod::SimpleFetch, || {
            ExtractError::TooShort { got: 12, min: 100 }
        })),
        Box::new(StubStrategy::failing(ExtractionMethod::Playwright, || {
            ExtractError::SessionUnavailable("browser startup failed".into())
        })),
    ]);

    let result = service
        .extract(ExtractionRequest::new(
            "https://example.com/terms",
            Some(DocumentType::Tos),
        ))
        .await;

    assert!(!result.success);
    assert!(result.text.is_none());
    assert!(result.message.contains("Exhausted methods"));
    assert!(result.message.contains("standard"));
    assert_eq!(result.method_used, ExtractionMethod::Playwright);
}

#[tokio::test]
async fn repeated_request_within_ttl_is_served_from_cache() {
    let stub = StubStrategy::succeeding(
        ExtractionMethod::Standard,
        &"cached legal text ".repeat(20),
    );
    let calls = stub.call_count();
    let service = stub_service(vec![Box::new(stub)]);

    let request = ExtractionRequest::new("https://example.com/terms", Some(DocumentType::Tos));
    let first = service.extract(request.clone()).await;
    let second = service.extract(request).await;

    assert!(first.success && second.success);
    assert_eq!(first.text, second.text);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second hit must come from cache");
}

#[tokio::test]
async fn failures_are_not_cached() {
    let stub = StubStrategy::failing(ExtractionMethod::Standard, || {
        ExtractError::Network("flaky".into())
    });
    let calls = stub.call_count();
    let service = stub_service(vec![Box::new(stub)]);

    let request = ExtractionRequest::new("https://example.com/terms", Some(DocumentType::Tos));
    let _ = service.extract(request.clone()).await;
    let _ = service.extract(request).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2, "failures must not be cached");
}

#[tokio::test]
async fn invalid_url_fails_fast_without_strategies() {
    let stub = StubStrategy::succeeding(ExtractionMethod::Standard, "unused");
    let calls = stub.call_count();
    let service = stub_service(vec![Box::new(stub)]);

    let result = service
        .extract(ExtractionRequest::new("invalid", None))
        .await;

    assert!(!result.success);
    assert_eq!(result.message, "Invalid URL");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_document_type_defaults_to_tos() {
    let stub = StubStrategy::succeeding(
        ExtractionMethod::Standard,
        &"terms text ".repeat(20),
    );
    let service = stub_service(vec![Box::new(stub)]);

    let result = service
        .extract(ExtractionRequest::new("https://example.com/terms", None))
        .await;

    assert_eq!(result.document_type, DocumentType::Tos);
}

#[tokio::test]
async fn discovery_replaces_non_canonical_urls() {
    let stub = StubStrategy::succeeding(
        ExtractionMethod::Standard,
        &"discovered terms text ".repeat(20),
    );
    let seen = stub.url_log();

    let service = stub_service(vec![Box::new(stub)])
        .with_finder(Arc::new(FixedFinder("https://example.com/legal/terms".into())));

    // Homepage URL does not look legal-canonical, so discovery runs
    let result = service
        .extract(ExtractionRequest::new(
            "https://example.com",
            Some(DocumentType::Tos),
        ))
        .await;

    assert!(result.success);
    assert_eq!(result.url, "https://example.com/legal/terms");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["https://example.com/legal/terms"]
    );
}

#[tokio::test]
async fn discovery_is_skipped_for_canonical_legal_urls() {
    let stub = StubStrategy::succeeding(
        ExtractionMethod::Standard,
        &"direct terms text ".repeat(20),
    );
    let seen = stub.url_log();

    let service = stub_service(vec![Box::new(stub)])
        .with_finder(Arc::new(FixedFinder("https://other.example/terms".into())));

    let result = service
        .extract(ExtractionRequest::new(
            "https://example.com/terms-of-service",
            Some(DocumentType::Tos),
        ))
        .await;

    assert!(result.success);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["https://example.com/terms-of-service"]
    );
}

#[tokio::test]
async fn bot_challenge_page_defeats_http_strategies() {
    let challenge = "<html><body><h1>Security check</h1>\
        <p>Please complete the CAPTCHA below to continue to the site. \
        This security check protects the site from automated traffic and \
        confirms that a real person is browsing. Complete the puzzle to \
        proceed to the requested page.</p></body></html>";

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/terms")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(challenge)
        .create_async()
        .await;

    let service = http_service();
    let url = format!("{}/terms", server.url());
    let result = service
        .extract(ExtractionRequest::new(url, Some(DocumentType::Tos)))
        .await;

    assert!(!result.success, "challenge page must never be returned as text");
    assert!(result.text.is_none());
}
