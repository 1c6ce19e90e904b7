//! An in-process store for computed election results.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::{
    model::{results::ElectionResults, ElectionId},
    service::ports::ResultCache,
};

struct Entry {
    results: ElectionResults,
    last_access: Instant,
}

/// Results keyed by election, dropped once nobody has read them for
/// `idle` (expire-after-access) or once `capacity` other elections have
/// been used more recently.
///
/// Every read or write moves an entry to the front, so the entries at the
/// back are the ones idle for longest; they are swept on every `put`.
pub struct MemoryResultCache {
    idle: Duration,
    entries: Mutex<LruCache<ElectionId, Entry>>,
}

impl MemoryResultCache {
    pub fn new(idle: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            idle,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<ElectionId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_access) >= self.idle
    }

    fn get_at(&self, election_id: ElectionId, now: Instant) -> Option<ElectionResults> {
        let mut entries = self.entries();
        let entry = entries.get_mut(&election_id)?;
        if !self.is_expired(entry, now) {
            entry.last_access = now;
            return Some(entry.results.clone());
        }
        entries.pop(&election_id);
        None
    }

    fn put_at(&self, election_id: ElectionId, results: ElectionResults, now: Instant) {
        let mut entries = self.entries();

        let mut expired = 0;
        while let Some((_, oldest)) = entries.peek_lru() {
            if !self.is_expired(oldest, now) {
                break;
            }
            entries.pop_lru();
            expired += 1;
        }
        if expired > 0 {
            debug!("Dropped {expired} idle cached results");
        }

        let entry = Entry {
            results,
            last_access: now,
        };
        if let Some((evicted, _)) = entries.push(election_id, entry) {
            if evicted != election_id {
                debug!("Results cache full, dropped results of election {evicted}");
            }
        }
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, election_id: ElectionId) -> Option<ElectionResults> {
        self.get_at(election_id, Instant::now())
    }

    fn put(&self, election_id: ElectionId, results: ElectionResults) {
        self.put_at(election_id, results, Instant::now())
    }

    fn evict(&self, election_id: ElectionId) {
        self.entries().pop(&election_id);
    }
}
