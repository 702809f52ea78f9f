//! Shared browser session: lifecycle state machine, page admission gate,
//! and stale-page reclamation.
//!
//! The session is an explicitly constructed service object injected into
//! the strategies that need it. It starts lazily on first page request; a
//! failed startup is terminal until `shutdown()` resets the state machine.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::target::TargetId;
use chromiumoxide::Page;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractResult};

use super::{launch, stealth};

/// Observable lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Uninitialized,
    Starting,
    Ready,
    /// Terminal until an explicit `shutdown()` resets the machine.
    Failed,
}

enum SessionState {
    Uninitialized,
    Starting,
    Ready(SessionInner),
    Failed(String),
}

struct SessionInner {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
}

/// Process-wide browser session. One browser process, one profile, pages
/// checked out through a counting admission gate.
pub struct BrowserSession {
    state: Mutex<SessionState>,
    gate: Arc<Semaphore>,
    active: Arc<DashMap<String, Page>>,
    last_sweep: parking_lot::Mutex<Instant>,
    headless: bool,
    sweep_interval: Duration,
}

impl BrowserSession {
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SessionState::Uninitialized),
            gate: Arc::new(Semaphore::new(config.page_concurrency())),
            active: Arc::new(DashMap::new()),
            last_sweep: parking_lot::Mutex::new(Instant::now()),
            headless: config.headless(),
            sweep_interval: config.sweep_interval(),
        })
    }

    /// Current lifecycle state.
    pub async fn status(&self) -> SessionStatus {
        match &*self.state.lock().await {
            SessionState::Uninitialized => SessionStatus::Uninitialized,
            SessionState::Starting => SessionStatus::Starting,
            SessionState::Ready(_) => SessionStatus::Ready,
            SessionState::Failed(_) => SessionStatus::Failed,
        }
    }

    /// Start the browser if it has not been started yet.
    ///
    /// A previous startup failure stays sticky: callers get
    /// [`ExtractError::SessionUnavailable`] without a relaunch attempt.
    pub async fn ensure_started(&self) -> ExtractResult<()> {
        let mut state = self.state.lock().await;
        match &*state {
            SessionState::Ready(_) => return Ok(()),
            SessionState::Failed(msg) => {
                return Err(ExtractError::SessionUnavailable(msg.clone()));
            }
            SessionState::Starting => {
                // Unreachable while the lock is held across startup; kept
                // for state-machine completeness
                return Err(ExtractError::SessionUnavailable(
                    "startup already in progress".into(),
                ));
            }
            SessionState::Uninitialized => {}
        }

        *state = SessionState::Starting;
        info!("starting browser session");

        match Self::startup(self.headless).await {
            Ok(inner) => {
                info!("browser session ready");
                *state = SessionState::Ready(inner);
                Ok(())
            }
            Err(e) => {
                let msg = format!("browser startup failed: {e:#}");
                warn!("{msg}");
                *state = SessionState::Failed(msg.clone());
                Err(ExtractError::SessionUnavailable(msg))
            }
        }
    }

    async fn startup(headless: bool) -> anyhow::Result<SessionInner> {
        let (browser, handler, user_data_dir) = launch::launch_browser(headless).await?;

        // Verify the context with a throwaway navigation before declaring
        // readiness; tear everything down if it fails
        match browser.new_page("about:blank").await {
            Ok(page) => {
                if let Err(e) = page.close().await {
                    debug!("verification page close failed: {e}");
                }
            }
            Err(e) => {
                let mut browser = browser;
                if let Err(close_err) = browser.close().await {
                    debug!("browser close during failed startup: {close_err}");
                }
                let _ = browser.wait().await;
                handler.abort();
                if let Err(rm_err) = std::fs::remove_dir_all(&user_data_dir) {
                    debug!("profile cleanup during failed startup: {rm_err}");
                }
                return Err(anyhow::anyhow!("context verification failed: {e}"));
            }
        }

        Ok(SessionInner {
            browser,
            handler,
            user_data_dir,
        })
    }

    /// Check out a page. Blocks while all concurrency slots are in use.
    pub async fn acquire_page(self: &Arc<Self>) -> ExtractResult<PageLease> {
        self.ensure_started().await?;
        self.maybe_sweep().await;

        let permit = self
            .gate
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ExtractError::SessionUnavailable("admission gate closed".into()))?;

        let page = {
            let state = self.state.lock().await;
            let SessionState::Ready(inner) = &*state else {
                return Err(ExtractError::SessionUnavailable(
                    "session no longer ready".into(),
                ));
            };
            inner
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| ExtractError::Browser(format!("failed to open page: {e}")))?
        };

        if let Err(e) = stealth::inject(&page).await {
            warn!("stealth injection failed: {e}");
        }

        let id = Uuid::new_v4().to_string();
        self.active.insert(id.clone(), page.clone());
        debug!("page lease {id} acquired ({} active)", self.active.len());

        Ok(PageLease {
            id,
            page,
            permit: Some(permit),
            active: Arc::clone(&self.active),
            released: false,
        })
    }

    /// Close pages that exist in the context but are not tracked in the
    /// active set, guarding against leaks from abnormal termination paths.
    /// Runs opportunistically at most once per sweep interval.
    async fn maybe_sweep(&self) {
        {
            let mut last = self.last_sweep.lock();
            if last.elapsed() < self.sweep_interval {
                return;
            }
            *last = Instant::now();
        }

        let pages = {
            let state = self.state.lock().await;
            let SessionState::Ready(inner) = &*state else {
                return;
            };
            match inner.browser.pages().await {
                Ok(pages) => pages,
                Err(e) => {
                    warn!("stale-page sweep could not list pages: {e}");
                    return;
                }
            }
        };

        let tracked: HashSet<TargetId> = self
            .active
            .iter()
            .map(|entry| entry.value().target_id().clone())
            .collect();

        let mut closed = 0usize;
        for page in pages {
            if !tracked.contains(page.target_id()) {
                if let Err(e) = page.close().await {
                    debug!("sweep page close failed: {e}");
                } else {
                    closed += 1;
                }
            }
        }
        if closed > 0 {
            info!("stale-page sweep closed {closed} untracked pages");
        }
    }

    /// Close all tracked pages, the browser process, and the profile
    /// directory, then reset to `Uninitialized` so a fresh startup is
    /// possible. Every step is best-effort and independently tolerant.
    pub async fn shutdown(&self) {
        info!("shutting down browser session");

        let keys: Vec<String> = self.active.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, page)) = self.active.remove(&key) {
                if let Err(e) = page.close().await {
                    debug!("page close during shutdown: {e}");
                }
            }
        }

        let mut state = self.state.lock().await;
        let previous = std::mem::replace(&mut *state, SessionState::Uninitialized);
        if let SessionState::Ready(inner) = previous {
            let mut browser = inner.browser;
            if let Err(e) = browser.close().await {
                warn!("browser close failed: {e}");
            }
            let _ = browser.wait().await;
            inner.handler.abort();
            if let Err(e) = std::fs::remove_dir_all(&inner.user_data_dir) {
                warn!(
                    "failed to remove profile dir {}: {e}",
                    inner.user_data_dir.display()
                );
            }
        }
    }
}

/// A checked-out page bound to one in-flight request.
///
/// Call [`release`](Self::release) on every exit path; if a lease is
/// dropped without it, the concurrency slot is still freed (the permit is
/// owned) and the orphaned page is reclaimed by the next sweep.
pub struct PageLease {
    id: String,
    page: Page,
    permit: Option<OwnedSemaphorePermit>,
    active: Arc<DashMap<String, Page>>,
    released: bool,
}

impl PageLease {
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Close the page and free the concurrency slot. The slot is freed
    /// even when the close itself errors.
    pub async fn release(mut self) {
        self.released = true;
        self.active.remove(&self.id);
        if let Err(e) = self.page.clone().close().await {
            debug!("page close on release failed: {e}");
        }
        drop(self.permit.take());
        debug!("page lease {} released", self.id);
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        if !self.released {
            self.active.remove(&self.id);
            warn!(
                "page lease {} dropped without release; page left for sweep",
                self.id
            );
            // The owned permit drops with us, freeing the slot
        }
    }
}
