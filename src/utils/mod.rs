pub mod text;
pub mod url;

pub use url::{looks_like_legal_url, looks_like_pdf, normalize_url};
