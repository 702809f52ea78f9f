//! Browser-render strategy: last resort for JavaScript-rendered and
//! bot-challenged sites.
//!
//! Acquires a page lease from the shared session, navigates with a relaxed
//! fallback wait, nudges consent dialogs, scrolls to trigger lazy-loaded
//! content, then runs four competing extraction methods over the rendered
//! DOM. The lease is released on every exit path.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::Page;
use futures::future::BoxFuture;
use log::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::content::{self, pick_longest, Candidate};
use crate::error::{ExtractError, ExtractResult};
use crate::types::{DocumentType, ExtractionMethod, ExtractionResult};
use crate::utils::text::{insert_sentence_breaks, normalize_whitespace};

use super::FetchStrategy;

/// Fixed delay for post-load JavaScript to settle.
const SETTLE_DELAY: Duration = Duration::from_secs(2);
/// Pause between scroll steps so lazy loaders can fire.
const SCROLL_PAUSE: Duration = Duration::from_millis(300);

/// Clicks visible buttons whose text suggests a consent/accept action.
/// Returns how many were clicked; individual click failures are swallowed
/// in-page.
const CONSENT_CLICK_SCRIPT: &str = r#"
(() => {
    const words = ['accept', 'agree', 'consent', 'got it', 'i understand', 'allow all'];
    let clicked = 0;
    const candidates = document.querySelectorAll(
        "button, a, [role='button'], input[type='button'], input[type='submit']");
    for (const el of candidates) {
        const text = (el.innerText || el.value || '').trim().toLowerCase();
        if (!text || text.length > 40) continue;
        if (words.some(w => text.includes(w))) {
            try { el.click(); clicked += 1; } catch (e) {}
            if (clicked >= 3) break;
        }
    }
    return clicked;
})()
"#;

pub struct BrowserRenderStrategy {
    session: Arc<BrowserSession>,
    min_content: usize,
    navigation_timeout: Duration,
    relaxed_navigation_timeout: Duration,
}

impl BrowserRenderStrategy {
    #[must_use]
    pub fn new(
        session: Arc<BrowserSession>,
        min_content: usize,
        navigation_timeout: Duration,
        relaxed_navigation_timeout: Duration,
    ) -> Self {
        Self {
            session,
            min_content,
            navigation_timeout,
            relaxed_navigation_timeout,
        }
    }

    async fn extract(
        &self,
        url: &str,
        document_type: DocumentType,
        return_url: &str,
    ) -> ExtractResult<ExtractionResult> {
        let lease = self.session.acquire_page().await?;
        let outcome = self
            .render_and_extract(lease.page(), url, document_type, return_url)
            .await;
        // Single release point covering success and failure alike
        lease.release().await;
        outcome
    }

    async fn render_and_extract(
        &self,
        page: &Page,
        url: &str,
        document_type: DocumentType,
        return_url: &str,
    ) -> ExtractResult<ExtractionResult> {
        self.navigate(page, url).await?;
        tokio::time::sleep(SETTLE_DELAY).await;

        click_consent_buttons(page).await;
        scroll_through_page(page).await;

        let html = page
            .content()
            .await
            .map_err(|e| ExtractError::Browser(format!("failed to read rendered HTML: {e}")))?;
        let inner_text = evaluate_string(page, "document.body ? document.body.innerText : ''")
            .await
            .unwrap_or_default();

        let mut candidates = content::html_candidates(&html, document_type, self.min_content)?;
        candidates.push(Candidate::new(
            insert_sentence_breaks(&normalize_whitespace(&inner_text)),
            "inner_text",
        ));

        if let Some(winner) = pick_longest(candidates, self.min_content) {
            info!(
                "browser render extracted {} chars from {url} via {} method",
                winner.char_len(),
                winner.method
            );
            return Ok(ExtractionResult::success(
                return_url,
                document_type,
                winner.text,
                "Successfully extracted text content using JavaScript-enabled browser rendering",
                ExtractionMethod::Playwright,
            ));
        }

        // Last attempt: the raw in-page visible text, same length floor
        let raw = normalize_whitespace(&inner_text);
        let len = raw.chars().count();
        if len >= self.min_content {
            return Ok(ExtractionResult::success(
                return_url,
                document_type,
                raw,
                "Extracted rendered page text using browser rendering",
                ExtractionMethod::Playwright,
            ));
        }
        Err(ExtractError::TooShort {
            got: len,
            min: self.min_content,
        })
    }

    /// Navigate with the primary readiness wait, falling back to a relaxed
    /// DOM-content-loaded wait when the page never goes network-quiet.
    async fn navigate(&self, page: &Page, url: &str) -> ExtractResult<()> {
        page.goto(url)
            .await
            .map_err(|e| ExtractError::Browser(format!("navigation to {url} failed: {e}")))?;

        if wait_for_ready_state(page, &["complete"], self.navigation_timeout).await {
            return Ok(());
        }
        debug!("primary navigation wait timed out for {url}, relaxing");
        if wait_for_ready_state(
            page,
            &["interactive", "complete"],
            self.relaxed_navigation_timeout,
        )
        .await
        {
            return Ok(());
        }
        Err(ExtractError::Browser(format!(
            "navigation to {url} timed out"
        )))
    }
}

impl FetchStrategy for BrowserRenderStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Playwright
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

/// Poll `document.readyState` until it reaches one of `accepted`, or the
/// timeout elapses. The HTTP response arriving is not enough for JS-heavy
/// sites; the DOM has to actually finish.
async fn wait_for_ready_state(page: &Page, accepted: &[&str], timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    let poll_interval = Duration::from_millis(250);

    loop {
        if let Some(state) = evaluate_string(page, "document.readyState").await {
            if accepted.contains(&state.as_str()) {
                return true;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Best-effort consent/accept button clicking to reveal gated content.
async fn click_consent_buttons(page: &Page) {
    match page.evaluate(CONSENT_CLICK_SCRIPT).await {
        Ok(result) => {
            let clicked = result.into_value::<i64>().unwrap_or(0);
            if clicked > 0 {
                debug!("clicked {clicked} consent buttons");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
        Err(e) => debug!("consent click script failed: {e}"),
    }
}

/// Scroll bottom, top, then stepped intermediate positions to trigger
/// lazy-loaded content. Step count scales with page height.
async fn scroll_through_page(page: &Page) {
    let height = match page
        .evaluate("document.body ? document.body.scrollHeight : 0")
        .await
    {
        Ok(result) => result.into_value::<i64>().unwrap_or(0),
        Err(e) => {
            warn!("could not read page height: {e}");
            return;
        }
    };
    if height <= 0 {
        return;
    }

    let scroll_to = |pos: i64| format!("window.scrollTo(0, {pos})");

    let _ = page.evaluate(scroll_to(height)).await;
    tokio::time::sleep(SCROLL_PAUSE).await;
    let _ = page.evaluate(scroll_to(0)).await;
    tokio::time::sleep(SCROLL_PAUSE).await;

    let steps = (height / 2000).clamp(3, 10);
    for i in 1..=steps {
        let pos = height * i / (steps + 1);
        let _ = page.evaluate(scroll_to(pos)).await;
        tokio::time::sleep(SCROLL_PAUSE).await;
    }
}

async fn evaluate_string(page: &Page, script: &str) -> Option<String> {
    match page.evaluate(script).await {
        Ok(result) => result.into_value::<String>().ok(),
        Err(e) => {
            debug!("evaluate failed: {e}");
            None
        }
    }
}
