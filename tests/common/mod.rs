//! Shared fixtures for integration tests: mock HTTP pages and a
//! programmatically assembled PDF with a correct xref table.

#![allow(dead_code)]

use policyscrape::ExtractorConfig;

/// Config tuned for tests: no real-time backoff, tiny timeouts.
pub fn test_config() -> ExtractorConfig {
    ExtractorConfig::builder()
        .fetch_timeout_secs(5)
        .retry_attempts(1)
        .retry_base_delay_ms(1)
        .discovery_timeout_secs(1)
        .build()
}

/// An article-tagged page with header/footer chrome around ~200 chars of
/// body text.
pub fn article_page() -> String {
    let body = "These Terms of Service govern your access to and use of the \
                product. By creating an account or using the service you agree \
                to be bound by these terms, including the limitations of \
                liability and dispute resolution provisions described below.";
    format!(
        "<html><head><title>Terms</title></head><body>\
         <header>Site navigation and promotional links</header>\
         <article><h1>Terms of Service</h1><p>{body}</p></article>\
         <footer>Copyright and social media links</footer>\
         </body></html>"
    )
}

/// Build a minimal one-page PDF whose text stream holds `text`, with a
/// byte-accurate xref table so strict parsers accept it.
pub fn minimal_pdf(text: &str) -> Vec<u8> {
    // Escape characters significant inside PDF string literals
    let escaped = text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");

    // One Tj per line of text, stepping down the page
    let mut content = String::from("BT\n/F1 12 Tf\n72 720 Td\n14 TL\n");
    for chunk in escaped.as_bytes().chunks(60) {
        content.push_str(&format!("({}) Tj\nT*\n", String::from_utf8_lossy(chunk)));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, obj));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    pdf.into_bytes()
}
