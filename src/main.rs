// Command-line front end: extract one URL and print the result as JSON.
//
// Usage: policyscrape <url> [tos|pp]
// Failure to extract is a normal outcome and still exits 0 with a
// well-formed result; only usage errors exit non-zero.

use anyhow::Result;
use policyscrape::{DocumentType, ExtractionRequest, ExtractionService, ExtractorConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("usage: policyscrape <url> [tos|pp]");
        std::process::exit(2);
    };
    let document_type = match args.next().as_deref() {
        None => None,
        Some("tos") => Some(DocumentType::Tos),
        Some("pp") => Some(DocumentType::Pp),
        Some(other) => {
            eprintln!("unknown document type '{other}' (expected 'tos' or 'pp')");
            std::process::exit(2);
        }
    };

    let service = ExtractionService::new(ExtractorConfig::default())?;
    let result = service
        .extract(ExtractionRequest::new(url, document_type))
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    service.shutdown().await;
    Ok(())
}
