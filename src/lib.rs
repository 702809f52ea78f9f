//! policyscrape: cascading extraction of readable legal-document text
//! (Terms of Service / Privacy Policies) from arbitrary web pages.
//!
//! The pipeline tries increasingly expensive strategies until one yields
//! qualifying content: PDF fetch+parse, plain HTTP fetch with content
//! heuristics, a maximal-text fallback fetch, and finally a headless
//! browser render for JavaScript-heavy or bot-challenged sites. Successful
//! results are cached; failures fall through and surface as a single
//! terminal failure result.
//!
//! ```no_run
//! use policyscrape::{ExtractionRequest, ExtractionService, ExtractorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = ExtractionService::new(ExtractorConfig::default())?;
//!     let result = service
//!         .extract(ExtractionRequest::new("example.com/terms", None))
//!         .await;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     service.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod cache;
pub mod config;
pub mod content;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod retry;
pub mod strategies;
pub mod types;
pub mod utils;

pub use browser::{BrowserSession, PageLease, SessionStatus};
pub use cache::ResponseCache;
pub use config::{ExtractorConfig, ExtractorConfigBuilder};
pub use discovery::DocumentFinder;
pub use error::{ExtractError, ExtractResult};
pub use orchestrator::ExtractionService;
pub use retry::RetryPolicy;
pub use strategies::FetchStrategy;
pub use types::{DocumentType, ExtractionMethod, ExtractionRequest, ExtractionResult};
