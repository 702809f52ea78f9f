//! Time- and size-bounded memoization of extraction results.
//!
//! Keys are `(normalized URL, document type)`. Only successful results are
//! inserted (the orchestrator enforces that). Expired entries are treated
//! as misses at read time; capacity overflow evicts the entry with the
//! smallest expiry, which approximates oldest-inserted under a fixed TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::types::{DocumentType, ExtractionResult};

pub type CacheKey = (String, DocumentType);

struct CacheEntry {
    value: ExtractionResult,
    expires_at: Instant,
}

/// Mutex-guarded response cache. Insertion and eviction happen under one
/// lock acquisition so the capacity bound holds across concurrent writers.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Look up a fresh entry. Expired entries are misses but are not
    /// deleted here; they age out through capacity eviction.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<ExtractionResult> {
        self.get_at(key, Instant::now())
    }

    /// Insert a result, evicting the smallest-expiry entry when full.
    pub fn put(&self, key: CacheKey, value: ExtractionResult) {
        self.put_at(key, value, Instant::now());
    }

    /// Clock-injected variant of [`get`](Self::get) for deterministic tests.
    #[must_use]
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<ExtractionResult> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Clock-injected variant of [`put`](Self::put) for deterministic tests.
    pub fn put_at(&self, key: CacheKey, value: ExtractionResult, now: Instant) {
        let mut entries = self.entries.lock();

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest {
                log::debug!(
                    "response cache at capacity ({}), evicting {}",
                    self.capacity,
                    oldest_key.0
                );
                entries.remove(&oldest_key);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
