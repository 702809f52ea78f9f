//! Headless-browser session management.
//!
//! One long-lived browser process and browsing context shared by all
//! requests; short-lived pages checked out through an admission gate.

pub mod launch;
pub mod session;
pub mod stealth;

pub use session::{BrowserSession, PageLease, SessionStatus};
