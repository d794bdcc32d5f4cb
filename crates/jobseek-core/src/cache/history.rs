use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::models::{CacheEntry, JobRecord, SearchKey};

pub const MAX_CACHE_ENTRIES: usize = 15;
pub const FRESHNESS_WINDOW: Duration = Duration::from_millis(300_000);

pub fn find_entry<'a>(entries: &'a [CacheEntry], key: &SearchKey) -> Option<&'a CacheEntry> {
    entries.iter().find(|entry| entry.key == *key)
}

/// An entry stamped after `now` counts as zero elapsed time.
pub fn is_fresh(entry: &CacheEntry, now: SystemTime) -> bool {
    let elapsed = now
        .duration_since(entry.timestamp)
        .unwrap_or(Duration::ZERO);
    elapsed < FRESHNESS_WINDOW
}

pub fn upsert(
    entries: &[CacheEntry],
    key: SearchKey,
    results: Vec<JobRecord>,
    now: SystemTime,
) -> Vec<CacheEntry> {
    let retained = entries.iter().filter(|entry| entry.key != key).cloned();
    let mut next = Vec::with_capacity(entries.len() + 1);
    next.push(CacheEntry {
        key: key.clone(),
        results,
        timestamp: now,
    });
    next.extend(retained);
    evict_over_capacity(next)
}

pub fn evict_over_capacity(mut entries: Vec<CacheEntry>) -> Vec<CacheEntry> {
    entries.truncate(MAX_CACHE_ENTRIES);
    entries
}

/// History view: one entry per query text, newest first. Filters are
/// ignored here even though lookups match on the full key. Equal timestamps
/// keep the order of `entries`.
pub fn collapse_by_query(entries: &[CacheEntry]) -> Vec<CacheEntry> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut newest: Vec<&CacheEntry> = Vec::new();
    for entry in entries {
        match slots.get(entry.key.query.as_str()) {
            Some(&slot) => {
                if entry.timestamp > newest[slot].timestamp {
                    newest[slot] = entry;
                }
            }
            None => {
                slots.insert(entry.key.query.as_str(), newest.len());
                newest.push(entry);
            }
        }
    }

    newest.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    newest.into_iter().cloned().collect()
}
