//! Selector-based content extraction.
//!
//! Strips non-content elements, picks the most plausible content container
//! in priority order (semantic tags, generic content patterns, legal
//! patterns, body), then collects block-level text with nested-match
//! deduplication.

use std::collections::HashSet;
use std::sync::LazyLock;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::types::DocumentType;
use crate::utils::text::{clean_extracted_text, normalize_whitespace};

/// Minimum text length for an individual block element to be captured.
const MIN_BLOCK_TEXT_LEN: usize = 12;

static REMOVAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, nav, header, footer, noscript, iframe, aside")
        .expect("BUG: hardcoded removal selector is invalid")
});

static BANNER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "[class*='cookie'], [id*='cookie'], [class*='consent'], [id*='consent'], \
         [class*='popup'], [id*='popup'], [class*='banner'], [id*='banner'], \
         [class*='overlay'], [class*='gdpr']",
    )
    .expect("BUG: hardcoded banner selector is invalid")
});

static SEMANTIC_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("article, main, [role='main']")
        .expect("BUG: hardcoded semantic container selector is invalid")
});

static GENERIC_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "#content, .content, #main, .main-content, .page-content, .post-content, \
         .entry-content, [itemprop='articleBody']",
    )
    .expect("BUG: hardcoded generic container selector is invalid")
});

static TOS_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "[class*='terms'], [id*='terms'], [class*='tos'], [id*='tos'], \
         [class*='agreement'], [id*='agreement'], [class*='legal'], [id*='legal']",
    )
    .expect("BUG: hardcoded tos container selector is invalid")
});

static PP_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "[class*='privacy'], [id*='privacy'], [class*='policy'], [id*='policy'], \
         [class*='legal'], [id*='legal']",
    )
    .expect("BUG: hardcoded privacy container selector is invalid")
});

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("BUG: hardcoded selector 'body' is invalid"));

static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, h1, h2, h3, h4, h5, h6, li")
        .expect("BUG: hardcoded block selector is invalid")
});

/// Selector-based extraction over the full container priority ladder.
///
/// Returns `None` only when the document yields no text at all; length
/// thresholds are the ranking step's concern.
#[must_use]
pub fn selector_candidate(
    html: &str,
    document_type: DocumentType,
    min_content: usize,
) -> Option<String> {
    let mut doc = Html::parse_document(html);
    strip_non_content(&mut doc);

    let tiers: [&Selector; 3] = [
        &SEMANTIC_CONTAINERS,
        &GENERIC_CONTAINERS,
        legal_selector(document_type),
    ];

    let container = tiers
        .iter()
        .find_map(|tier| largest_match(&doc, tier, min_content))
        .or_else(|| doc.select(&BODY_SELECTOR).next().map(|el| el.id()))?;

    extract_container_text(&doc, container, min_content)
}

/// Legal-pattern-only extraction. Absent a legal container, there is no
/// candidate; this method is a focused competitor, not a fallback chain.
#[must_use]
pub fn legal_candidate(html: &str, document_type: DocumentType) -> Option<String> {
    let mut doc = Html::parse_document(html);
    strip_non_content(&mut doc);

    let container = largest_match(&doc, legal_selector(document_type), 1)?;
    extract_container_text(&doc, container, 1)
}

fn legal_selector(document_type: DocumentType) -> &'static Selector {
    match document_type {
        DocumentType::Tos => &TOS_CONTAINERS,
        DocumentType::Pp => &PP_CONTAINERS,
    }
}

/// Detach scripts, chrome, and cookie-banner/popup elements from the tree.
pub(crate) fn strip_non_content(doc: &mut Html) {
    let mut ids: Vec<NodeId> = doc.select(&REMOVAL_SELECTOR).map(|el| el.id()).collect();
    ids.extend(doc.select(&BANNER_SELECTOR).map(|el| el.id()));
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Largest element matching `selector` whose text is at least `min_len`
/// characters, mirroring the "use the biggest candidate" container policy.
fn largest_match(doc: &Html, selector: &Selector, min_len: usize) -> Option<NodeId> {
    doc.select(selector)
        .map(|el| {
            let len: usize = el.text().map(|t| t.chars().count()).sum();
            (len, el.id())
        })
        .filter(|(len, _)| *len >= min_len)
        .max_by_key(|(len, _)| *len)
        .map(|(_, id)| id)
}

/// Block-level text collection with nested-match deduplication, falling
/// back to the container's flattened text when blocks come up short.
fn extract_container_text(doc: &Html, container_id: NodeId, min_content: usize) -> Option<String> {
    let node = doc.tree.get(container_id)?;
    let container = ElementRef::wrap(node)?;

    let mut captured: HashSet<NodeId> = HashSet::new();
    let mut parts: Vec<String> = Vec::new();

    for el in container.select(&BLOCK_SELECTOR) {
        // A child already captured inside a matched ancestor (an li inside
        // a captured list wrapper, say) must not repeat.
        if el.ancestors().any(|a| captured.contains(&a.id())) {
            continue;
        }
        let text = normalize_whitespace(&el.text().collect::<String>());
        if text.chars().count() > MIN_BLOCK_TEXT_LEN {
            captured.insert(el.id());
            parts.push(text);
        }
    }

    let blocks = parts.join("\n\n");
    let text = if blocks.chars().count() >= min_content {
        blocks
    } else {
        // Not enough block structure; take everything the container holds
        let flattened = normalize_whitespace(&container.text().collect::<String>());
        if flattened.chars().count() > blocks.chars().count() {
            flattened
        } else {
            blocks
        }
    };

    let cleaned = clean_extracted_text(&text);
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLER: &str = "These terms govern your access to and use of the service. \
         By using the service you agree to be bound by these terms. ";

    #[test]
    fn prefers_article_over_body_and_drops_chrome() {
        let html = format!(
            "<html><body>\
             <header>Top navigation bar</header>\
             <article><p>{FILLER}{FILLER}</p></article>\
             <footer>Footer links and copyright</footer>\
             </body></html>"
        );
        let text = selector_candidate(&html, DocumentType::Tos, 100).unwrap();
        assert!(text.contains("terms govern"));
        assert!(!text.contains("Top navigation"));
        assert!(!text.contains("Footer links"));
    }

    #[test]
    fn falls_back_to_body_without_containers() {
        let html = format!("<html><body><p>{FILLER}{FILLER}</p></body></html>");
        let text = selector_candidate(&html, DocumentType::Tos, 100).unwrap();
        assert!(text.contains("terms govern"));
    }

    #[test]
    fn nested_blocks_are_not_duplicated() {
        // The li sits inside a captured p-less wrapper; each li is captured
        // once even though BLOCK_SELECTOR matches at multiple depths
        let html = "<html><body><article>\
            <p>This paragraph contains a list of obligations below.\
            </p><ul><li>First obligation with enough text to pass the block floor.</li>\
            <li>Second obligation with enough text to pass the block floor.</li></ul>\
            </article></body></html>";
        let text = selector_candidate(html, DocumentType::Tos, 50).unwrap();
        assert_eq!(text.matches("First obligation").count(), 1);
    }

    #[test]
    fn cookie_banner_text_is_stripped() {
        let html = format!(
            "<html><body>\
             <div class='cookie-consent'>We use cookies! Accept all?</div>\
             <main><p>{FILLER}{FILLER}</p></main>\
             </body></html>"
        );
        let text = selector_candidate(&html, DocumentType::Tos, 100).unwrap();
        assert!(!text.contains("We use cookies"));
    }

    #[test]
    fn legal_candidate_requires_a_legal_container() {
        let plain = format!("<html><body><div class='blog'>{FILLER}</div></body></html>");
        assert!(legal_candidate(&plain, DocumentType::Tos).is_none());

        let legal = format!(
            "<html><body><div class='terms-content'><p>{FILLER}{FILLER}</p></div></body></html>"
        );
        let text = legal_candidate(&legal, DocumentType::Tos).unwrap();
        assert!(text.contains("terms govern"));
    }

    #[test]
    fn privacy_patterns_apply_for_pp() {
        let html = format!(
            "<html><body><div id='privacy-policy'><p>{FILLER}{FILLER}</p></div></body></html>"
        );
        assert!(legal_candidate(&html, DocumentType::Pp).is_some());
        assert!(legal_candidate(&html, DocumentType::Tos).is_none());
    }
}
