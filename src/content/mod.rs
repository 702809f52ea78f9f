//! Heuristic content extraction from parsed HTML.
//!
//! Several independent extraction methods compete on every page; the
//! caller keeps the longest result that clears the minimum content length.
//! A bot-verification detector runs first and turns challenge pages into
//! hard failures instead of short "content".

pub mod bot_detect;
pub mod maximal;
pub mod ranking;
pub mod selector;

pub use ranking::{pick_longest, Candidate};

use scraper::Html;

use crate::error::{ExtractError, ExtractResult};
use crate::types::DocumentType;

/// Run the full candidate set over raw HTML: bot detection, then the
/// selector-based, legal-specialized, and maximal extraction methods.
///
/// Methods that produce nothing are simply absent from the result; ranking
/// the candidates (and failing when none qualify) is the caller's job.
pub fn html_candidates(
    html: &str,
    document_type: DocumentType,
    min_content: usize,
) -> ExtractResult<Vec<Candidate>> {
    let doc = Html::parse_document(html);
    if bot_detect::is_bot_challenge(&doc) {
        return Err(ExtractError::BotChallenge);
    }
    drop(doc);

    let mut candidates = Vec::with_capacity(3);
    if let Some(text) = selector::selector_candidate(html, document_type, min_content) {
        candidates.push(Candidate::new(text, "selector"));
    }
    if let Some(text) = selector::legal_candidate(html, document_type) {
        candidates.push(Candidate::new(text, "legal"));
    }
    candidates.push(Candidate::new(maximal::maximal_candidate(html), "maximal"));

    Ok(candidates)
}
