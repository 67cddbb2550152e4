//! Short-TTL in-memory cache for the suggestions endpoint
//!
//! The cache is intentionally volatile: empty at startup, populated on first
//! request, replaced wholesale on every miss, never partially updated. It
//! takes the clock as an explicit `Instant` argument so tests can drive
//! expiry deterministically. There is no request coalescing: concurrent
//! misses may each scrape and overwrite the state, and the last write wins,
//! which the short TTL keeps bounded.

use rand::seq::SliceRandom;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::SuggestionEntry;

/// Cached suggestions are considered stale after this long
pub const SUGGESTIONS_TTL: Duration = Duration::from_secs(180);

/// Entries served per suggestions response
pub const SUGGESTIONS_COUNT: usize = 4;

struct CacheState {
    entries: Vec<SuggestionEntry>,
    fetched_at: Instant,
}

/// Process-wide suggestions cache with a constructor-supplied TTL
pub struct SuggestionsCache {
    ttl: Duration,
    state: Mutex<Option<CacheState>>,
}

impl SuggestionsCache {
    /// Create an empty cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Whether the cached entries are still usable at `now`
    pub fn is_valid(&self, now: Instant) -> bool {
        self.state
            .lock()
            .expect("suggestions cache lock poisoned")
            .as_ref()
            .is_some_and(|state| now.duration_since(state.fetched_at) < self.ttl)
    }

    /// Return the cached entries if still fresh at `now`; expired entries
    /// are treated as absent
    pub fn get(&self, now: Instant) -> Option<Vec<SuggestionEntry>> {
        self.state
            .lock()
            .expect("suggestions cache lock poisoned")
            .as_ref()
            .filter(|state| now.duration_since(state.fetched_at) < self.ttl)
            .map(|state| state.entries.clone())
    }

    /// Replace the cache state wholesale with a fresh timestamp
    pub fn set(&self, entries: Vec<SuggestionEntry>, now: Instant) {
        *self
            .state
            .lock()
            .expect("suggestions cache lock poisoned") = Some(CacheState {
            entries,
            fetched_at: now,
        });
    }
}

/// Uniformly sample up to `count` entries
pub fn sample_entries(
    mut entries: Vec<SuggestionEntry>,
    count: usize,
) -> Vec<SuggestionEntry> {
    entries.shuffle(&mut rand::thread_rng());
    entries.truncate(count);
    entries
}
