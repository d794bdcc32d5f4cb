pub mod codec;
pub mod history;

pub use codec::{decode_entries, encode_entries};
pub use history::{
    FRESHNESS_WINDOW, MAX_CACHE_ENTRIES, collapse_by_query, evict_over_capacity, find_entry,
    is_fresh, upsert,
};

use std::sync::Arc;
use std::time::SystemTime;

use crate::models::{CacheEntry, JobRecord, SearchKey};
use crate::persistence::{KeyValueStore, PersistenceResult, RECENT_SEARCHES_SLOT};

/// Recent-search history backed by the `recentSearches` slot.
///
/// Entries are kept most recent first, capped at [`MAX_CACHE_ENTRIES`], and
/// unique by [`SearchKey`]. Every upsert rewrites the whole slot.
pub struct SearchCache {
    entries: Vec<CacheEntry>,
    store: Arc<dyn KeyValueStore>,
}

impl SearchCache {
    /// Missing, unreadable or malformed history starts an empty cache.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(RECENT_SEARCHES_SLOT) {
            Ok(Some(raw)) => decode_entries(&raw),
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(
                    kind = ?error.kind,
                    message = %error.message,
                    "failed to read recent searches; starting with empty cache"
                );
                Vec::new()
            }
        };

        tracing::debug!(entries = entries.len(), "loaded recent search cache");
        Self { entries, store }
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, key: &SearchKey) -> Option<&CacheEntry> {
        find_entry(&self.entries, key)
    }

    pub fn is_fresh(&self, entry: &CacheEntry, now: SystemTime) -> bool {
        is_fresh(entry, now)
    }

    pub fn fresh_lookup(&self, key: &SearchKey, now: SystemTime) -> Option<&CacheEntry> {
        self.lookup(key).filter(|entry| is_fresh(entry, now))
    }

    /// The in-memory cache is updated even when persisting fails; the error
    /// is returned so the caller can report it.
    pub fn upsert(
        &mut self,
        key: SearchKey,
        results: Vec<JobRecord>,
        now: SystemTime,
    ) -> PersistenceResult<()> {
        self.upsert_deferred(key, results, now).commit()
    }

    /// Like [`SearchCache::upsert`], but hands back the slot write so it can
    /// run off the caller's thread.
    pub fn upsert_deferred(
        &mut self,
        key: SearchKey,
        results: Vec<JobRecord>,
        now: SystemTime,
    ) -> PendingWrite {
        self.entries = upsert(&self.entries, key, results, now);
        PendingWrite {
            store: self.store.clone(),
            encoded: encode_entries(&self.entries),
        }
    }

    pub fn distinct_by_query_newest_first(&self) -> Vec<CacheEntry> {
        collapse_by_query(&self.entries)
    }
}

/// A full snapshot of the history, encoded and waiting to be written.
pub struct PendingWrite {
    store: Arc<dyn KeyValueStore>,
    encoded: PersistenceResult<Vec<u8>>,
}

impl PendingWrite {
    pub fn commit(self) -> PersistenceResult<()> {
        self.store.set(RECENT_SEARCHES_SLOT, &self.encoded?)
    }
}
