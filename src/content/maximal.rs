//! Maximal text extraction: strip only what is never content.
//!
//! The selector heuristics can lose arbitrary amounts of text on
//! unconventional markup, so a high-recall flattening method always exists
//! alongside them. Two variants: [`maximal_text`] strips only
//! script/style/noscript (the simple-fetch strategy's whole-page text),
//! while [`maximal_candidate`] also drops page chrome so it can compete
//! fairly against container-scoped methods in longest-wins ranking.

use scraper::Html;

use crate::content::bot_detect::visible_text;
use crate::content::selector::strip_non_content;
use crate::utils::text::{insert_sentence_breaks, normalize_whitespace};

/// Extract all visible text from the page verbatim.
#[must_use]
pub fn maximal_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let raw = visible_text(&doc);
    insert_sentence_breaks(&normalize_whitespace(&raw))
}

/// The competing-candidate variant: full-page flattening with the
/// non-content strip (nav/header/footer/banners) applied first. Without
/// the strip this method would always out-length the selector methods and
/// drag boilerplate into every result.
#[must_use]
pub fn maximal_candidate(html: &str) -> String {
    let mut doc = Html::parse_document(html);
    strip_non_content(&mut doc);
    let raw = visible_text(&doc);
    insert_sentence_breaks(&normalize_whitespace(&raw))
}
