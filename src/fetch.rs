//! Shared HTTP fetch layer: browser-mimicking headers, explicit
//! decompression, and the charset decode ladder.
//!
//! The reqwest client is built without automatic decompression so the
//! content-encoding handling below is always in effect, including for
//! servers that claim an encoding the client never negotiated.

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::utils::text::{looks_corrupted, strip_control_chars};

/// Fixed user agent sent on every request. Never randomized: sites must see
/// one stable fingerprint across retries or the traffic pattern looks like
/// distributed scraping.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// A fetched response body plus the metadata the decode ladder needs.
#[derive(Debug)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    /// URL after redirects.
    pub final_url: String,
}

/// Build the shared HTTP client used by all fetch strategies.
pub fn build_client(config: &ExtractorConfig) -> ExtractResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.fetch_timeout_with_grace())
        .connect_timeout(config.fetch_timeout())
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ExtractError::Network(format!("failed to build HTTP client: {e}")))
}

/// Browser-mimicking header set. The values match what a desktop Chrome
/// sends so fetches blend in with organic traffic.
#[must_use]
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let entries: &[(&str, &str)] = &[
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
        ("accept-language", "en-US,en;q=0.9"),
        // brotli is deliberately absent: the decode path below only
        // understands gzip and deflate
        ("accept-encoding", "gzip, deflate"),
        ("connection", "keep-alive"),
        ("upgrade-insecure-requests", "1"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
        ("sec-ch-ua", "\"Chromium\";v=\"123\", \"Google Chrome\";v=\"123\""),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"macOS\""),
        ("cache-control", "max-age=0"),
        ("dnt", "1"),
    ];
    for (name, value) in entries {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

/// GET a URL and return the raw bytes plus decode metadata.
///
/// Any transport failure or HTTP error status maps to
/// [`ExtractError::Network`] so the retry policy treats it as transient.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> ExtractResult<FetchedBody> {
    let response = client
        .get(url)
        .headers(browser_headers())
        .send()
        .await
        .map_err(|e| ExtractError::Network(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(ExtractError::Network(format!(
            "HTTP {status} fetching {url}"
        )));
    }

    let final_url = response.url().to_string();
    let header_str = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header_str("content-type");
    let content_encoding = header_str("content-encoding");

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ExtractError::Network(format!("reading body from {url} failed: {e}")))?;

    Ok(FetchedBody {
        bytes: bytes.to_vec(),
        content_type,
        content_encoding,
        final_url,
    })
}

/// Decode a response body into text.
///
/// Policy: decompress explicitly, then try UTF-8 regardless of the declared
/// charset (declared charsets lie in practice), then the declared charset,
/// then lossy UTF-8. Control characters are stripped; when the first
/// kilobyte holds no alphanumeric characters the decode is treated as
/// corrupted and retried as ASCII with replacement.
#[must_use]
pub fn decode_body(body: &FetchedBody) -> String {
    let bytes = decompress(&body.bytes, body.content_encoding.as_deref());

    let text = match std::str::from_utf8(&bytes) {
        Ok(s) => s.to_string(),
        Err(_) => decode_with_declared_charset(&bytes, body.content_type.as_deref()),
    };

    let cleaned = strip_control_chars(&text);
    if looks_corrupted(&cleaned) {
        warn!("decoded body looks corrupted, retrying as ASCII");
        return strip_control_chars(&ascii_lossy(&bytes));
    }
    cleaned
}

fn decode_with_declared_charset(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type
        .and_then(charset_label)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
    {
        let (decoded, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            debug!("decoded body using declared charset {}", encoding.name());
            return decoded.into_owned();
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset="))
        .map(|label| label.trim_matches('"').to_string())
        .next()
}

fn ascii_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '\u{fffd}' })
        .collect()
}

/// Decompress a body whose Content-Encoding the HTTP client did not handle.
/// Falls back to the raw bytes when decompression fails or the encoding is
/// unknown; a gzip magic-number sniff covers servers that compress without
/// declaring it.
fn decompress(bytes: &[u8], content_encoding: Option<&str>) -> Vec<u8> {
    let encoding = content_encoding.map(str::to_ascii_lowercase);

    let is_gzip_magic = bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b;
    let claims_gzip = encoding.as_deref().is_some_and(|e| e.contains("gzip"));
    let claims_deflate = encoding.as_deref().is_some_and(|e| e.contains("deflate"));

    if claims_gzip || is_gzip_magic {
        let mut out = Vec::new();
        if GzDecoder::new(bytes).read_to_end(&mut out).is_ok() {
            return out;
        }
        warn!("gzip decompression failed, using raw bytes");
    } else if claims_deflate {
        // Servers disagree on whether deflate means zlib-wrapped or raw
        let mut out = Vec::new();
        if ZlibDecoder::new(bytes).read_to_end(&mut out).is_ok() {
            return out;
        }
        out.clear();
        if DeflateDecoder::new(bytes).read_to_end(&mut out).is_ok() {
            return out;
        }
        warn!("deflate decompression failed, using raw bytes");
    }

    bytes.to_vec()
}
