use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::models::{CoreError, CoreErrorKind};
use crate::persistence::{KeyValueStore, PersistenceResult};

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(key.to_string(), value.into());
        }
        store
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock_slots(&self) -> PersistenceResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.slots.lock().map_err(|_| CoreError {
            kind: CoreErrorKind::Internal,
            message: "in-memory key-value store mutex poisoned".to_string(),
        })
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        Ok(self.lock_slots()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        self.lock_slots()?.insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
