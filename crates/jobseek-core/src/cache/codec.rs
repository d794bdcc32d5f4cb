use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::history::{MAX_CACHE_ENTRIES, find_entry};
use crate::models::{CacheEntry, CoreError, CoreErrorKind, CoreResult, JobRecord, SearchKey};

/// On-disk shape of one recent search. Optional filters are written even
/// when empty so a reload reproduces the exact key.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSearch {
    query: String,
    jobs: Vec<JobRecord>,
    timestamp: u64,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    job_type: Option<String>,
    #[serde(default)]
    experience_level: Option<String>,
}

pub fn encode_entries(entries: &[CacheEntry]) -> CoreResult<Vec<u8>> {
    let persisted = entries
        .iter()
        .map(|entry| {
            Ok(PersistedSearch {
                query: entry.key.query.clone(),
                jobs: entry.results.clone(),
                timestamp: to_unix_millis(entry.timestamp)?,
                location: Some(entry.key.location.clone()),
                job_type: Some(entry.key.job_type.clone()),
                experience_level: Some(entry.key.experience_level.clone()),
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    serde_json::to_vec(&persisted).map_err(|error| CoreError {
        kind: CoreErrorKind::Internal,
        message: format!("failed to serialize recent searches: {error}"),
    })
}

/// Never fails: an unreadable slot is an empty history, unreadable records
/// are skipped, duplicate keys keep their first (most recent) occurrence.
pub fn decode_entries(raw: &[u8]) -> Vec<CacheEntry> {
    let records = match serde_json::from_slice::<Vec<Value>>(raw) {
        Ok(records) => records,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "discarding unreadable recent search history"
            );
            return Vec::new();
        }
    };

    let mut entries: Vec<CacheEntry> = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let persisted = match serde_json::from_value::<PersistedSearch>(record) {
            Ok(persisted) => persisted,
            Err(error) => {
                tracing::debug!(index, error = %error, "dropping malformed recent search record");
                continue;
            }
        };

        let entry = CacheEntry {
            key: SearchKey::new(
                persisted.query,
                persisted.location.as_deref(),
                persisted.job_type.as_deref(),
                persisted.experience_level.as_deref(),
            ),
            results: persisted.jobs,
            timestamp: from_unix_millis(persisted.timestamp),
        };

        if find_entry(&entries, &entry.key).is_some() {
            tracing::debug!(index, query = %entry.key.query, "dropping duplicate recent search record");
            continue;
        }
        entries.push(entry);
        if entries.len() == MAX_CACHE_ENTRIES {
            break;
        }
    }

    entries
}

fn to_unix_millis(value: SystemTime) -> CoreResult<u64> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| CoreError {
        kind: CoreErrorKind::InvalidInput,
        message: format!("time before unix epoch is not supported: {error}"),
    })?;
    u64::try_from(duration.as_millis()).map_err(|_| CoreError {
        kind: CoreErrorKind::InvalidInput,
        message: "unix timestamp milliseconds exceed u64 range".to_string(),
    })
}

fn from_unix_millis(value: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(value)
}
