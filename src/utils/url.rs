//! URL normalization and classification.
//!
//! Normalization is deliberately minimal: a missing scheme gets `https://`
//! prepended and the authority must contain a dot; there is no trailing-slash
//! stripping or case folding, so callers must tolerate near-duplicate keys.

use crate::types::DocumentType;
use url::Url;

/// Validate and canonicalize a raw input string into a fetchable URL.
///
/// Returns `None` when the input is empty, unparseable, uses a non-http(s)
/// scheme, or has an authority with no dot (a cheap domain-validity check
/// that rejects inputs like `invalid` or `localhost`).
#[must_use]
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?;
    if !host.contains('.') {
        return None;
    }

    // Return the input form, not the re-serialized URL: Url::to_string()
    // appends a trailing slash to bare authorities and callers key caches
    // on the exact string.
    Some(with_scheme)
}

/// Whether the URL path points at a PDF document.
#[must_use]
pub fn looks_like_pdf(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase().ends_with(".pdf"),
        Err(_) => url.to_ascii_lowercase().ends_with(".pdf"),
    }
}

const TOS_URL_PATTERNS: &[&str] = &[
    "/terms",
    "/tos",
    "terms-of-service",
    "terms-of-use",
    "termsofservice",
    "terms_of_service",
    "conditions",
    "user-agreement",
    "eula",
    "/legal",
];

const PP_URL_PATTERNS: &[&str] = &[
    "/privacy",
    "privacy-policy",
    "privacypolicy",
    "privacy_policy",
    "data-policy",
    "datapolicy",
    "data-protection",
    "/legal",
];

/// Whether the URL already looks like a canonical legal-document URL for
/// the given document type, in which case document discovery is skipped.
#[must_use]
pub fn looks_like_legal_url(url: &str, document_type: DocumentType) -> bool {
    let haystack = match Url::parse(url) {
        Ok(parsed) => {
            let mut h = parsed.path().to_ascii_lowercase();
            if let Some(query) = parsed.query() {
                h.push('?');
                h.push_str(&query.to_ascii_lowercase());
            }
            h
        }
        Err(_) => url.to_ascii_lowercase(),
    };

    let patterns = match document_type {
        DocumentType::Tos => TOS_URL_PATTERNS,
        DocumentType::Pp => PP_URL_PATTERNS,
    };
    patterns.iter().any(|p| haystack.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_https_scheme() {
        assert_eq!(
            normalize_url("example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_url("example.com/terms").as_deref(),
            Some("https://example.com/terms")
        );
    }

    #[test]
    fn preserves_existing_scheme_and_path() {
        assert_eq!(
            normalize_url("http://example.com/tos/").as_deref(),
            Some("http://example.com/tos/")
        );
    }

    #[test]
    fn rejects_dotless_authority() {
        assert_eq!(normalize_url("invalid"), None);
        assert_eq!(normalize_url("localhost"), None);
        assert_eq!(normalize_url(""), None);
        assert_eq!(normalize_url("   "), None);
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(normalize_url("ftp://example.com"), None);
        // `javascript:alert(1)` gains an https prefix and then fails host
        // validation rather than slipping through as a scheme.
        assert_eq!(normalize_url("javascript:alert(1)"), None);
    }

    #[test]
    fn detects_pdf_paths() {
        assert!(looks_like_pdf("https://example.com/legal/terms.pdf"));
        assert!(looks_like_pdf("https://example.com/TERMS.PDF"));
        assert!(!looks_like_pdf("https://example.com/terms.pdf.html"));
        assert!(!looks_like_pdf("https://example.com/terms?format=pdf"));
    }

    #[test]
    fn classifies_legal_urls() {
        assert!(looks_like_legal_url(
            "https://example.com/terms-of-service",
            DocumentType::Tos
        ));
        assert!(looks_like_legal_url(
            "https://example.com/legal/privacy-policy",
            DocumentType::Pp
        ));
        assert!(!looks_like_legal_url(
            "https://example.com/about",
            DocumentType::Tos
        ));
        // ToS patterns should not fire for privacy and vice versa
        assert!(!looks_like_legal_url(
            "https://example.com/privacy",
            DocumentType::Tos
        ));
    }
}
