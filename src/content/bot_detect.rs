//! Bot-verification page detection.
//!
//! Challenge pages (Cloudflare interstitials, CAPTCHAs, "checking your
//! browser" screens) read as plausible short documents to the extraction
//! heuristics. Detecting them here turns that failure mode into a hard
//! strategy error so the cascade can escalate to a real browser instead of
//! caching challenge boilerplate as legal text.

use std::sync::LazyLock;

use scraper::{Html, Node, Selector};

/// Challenge phrases. Two or more matches condemn a page.
const CHALLENGE_PHRASES: &[&str] = &[
    "verify you're human",
    "verify you are human",
    "verifying you are human",
    "captcha",
    "security check",
    "checking your browser",
    "prove you're not a robot",
    "are you a robot",
    "ddos protection",
    "access to this page has been denied",
];

/// Phrases that never occur in legitimate legal text; one match suffices.
const EXPLICIT_CHALLENGE_PHRASES: &[&str] = &[
    "verify you're human",
    "verify you are human",
    "verifying you are human",
    "prove you're not a robot",
];

/// Lower-confidence phrases, only consulted for pages under 1000 chars
/// where there is too little text for the main list to accumulate matches.
const SECONDARY_PHRASES: &[&str] = &[
    "just a moment",
    "one more step",
    "please wait",
    "enable javascript and cookies",
    "unusual traffic",
    "browser check",
];

static CAPTCHA_FRAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "iframe[src*='captcha'], iframe[src*='recaptcha'], iframe[src*='hcaptcha'], \
         iframe[src*='turnstile'], iframe[title*='challenge']",
    )
    .expect("BUG: hardcoded captcha iframe selector is invalid")
});

static CAPTCHA_ELEMENT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".g-recaptcha, .h-captcha, .cf-turnstile, #challenge-form, #challenge-running")
        .expect("BUG: hardcoded captcha element selector is invalid")
});

static CAPTCHA_IMAGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img[src*='captcha'], img[alt*='captcha'], img[alt*='verification']")
        .expect("BUG: hardcoded captcha image selector is invalid")
});

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("BUG: hardcoded selector 'body' is invalid"));

/// Decide whether a parsed document is a bot-verification challenge rather
/// than content.
#[must_use]
pub fn is_bot_challenge(doc: &Html) -> bool {
    // Embedded CAPTCHA frames are unambiguous
    if doc.select(&CAPTCHA_FRAME).next().is_some() {
        log::debug!("bot challenge: captcha iframe present");
        return true;
    }

    let text = visible_text(doc).to_lowercase();

    if EXPLICIT_CHALLENGE_PHRASES.iter().any(|p| text.contains(p)) {
        log::debug!("bot challenge: explicit challenge phrase");
        return true;
    }

    let mut signals = CHALLENGE_PHRASES
        .iter()
        .filter(|p| text.contains(*p))
        .count();
    if doc.select(&CAPTCHA_ELEMENT).next().is_some() {
        signals += 1;
    }
    if doc.select(&CAPTCHA_IMAGE).next().is_some() {
        signals += 1;
    }
    if signals >= 2 {
        log::debug!("bot challenge: {signals} signals matched");
        return true;
    }

    // Short ambiguous pages: a single low-confidence phrase is enough
    if text.chars().count() < 1000 && SECONDARY_PHRASES.iter().any(|p| text.contains(p)) {
        log::debug!("bot challenge: short page with secondary phrase");
        return true;
    }

    false
}

/// Collect the visible text of the document body, skipping script, style,
/// and noscript subtrees whose contents a user never sees.
#[must_use]
pub fn visible_text(doc: &Html) -> String {
    let mut out = String::new();
    if let Some(body) = doc.select(&BODY).next() {
        collect_visible(*body, &mut out);
    } else {
        collect_visible(doc.tree.root(), &mut out);
    }
    out
}

fn collect_visible(node: ego_tree::NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Element(el) if matches!(el.name(), "script" | "style" | "noscript") => {}
            Node::Element(_) => collect_visible(child, out),
            Node::Text(t) => {
                out.push_str(t);
                out.push(' ');
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_phrases_condemn_a_page() {
        let html = "<html><body><h1>Security check</h1>\
                    <p>Please complete the CAPTCHA to continue.</p></body></html>";
        assert!(is_bot_challenge(&Html::parse_document(html)));
    }

    #[test]
    fn explicit_phrase_alone_condemns() {
        let html = "<html><body><p>Verify you are human by completing the action below.</p>\
                    </body></html>";
        assert!(is_bot_challenge(&Html::parse_document(html)));
    }

    #[test]
    fn captcha_iframe_condemns() {
        let html = "<html><body><p>Welcome</p>\
                    <iframe src='https://www.google.com/recaptcha/api2/anchor'></iframe>\
                    </body></html>";
        assert!(is_bot_challenge(&Html::parse_document(html)));
    }

    #[test]
    fn short_page_with_secondary_phrase_condemns() {
        let html = "<html><body><p>Just a moment...</p></body></html>";
        assert!(is_bot_challenge(&Html::parse_document(html)));
    }

    #[test]
    fn legal_text_mentioning_security_passes() {
        let body = format!(
            "<p>Our service performs a security check on uploaded files. {}</p>",
            "These terms govern your use of the service. ".repeat(40)
        );
        let html = format!("<html><body>{body}</body></html>");
        assert!(!is_bot_challenge(&Html::parse_document(&html)));
    }

    #[test]
    fn script_text_is_not_visible() {
        let html = "<html><body><script>var x = 'captcha security check';</script>\
                    <p>Plain page</p></body></html>";
        let doc = Html::parse_document(html);
        assert!(!visible_text(&doc).contains("captcha"));
    }
}
