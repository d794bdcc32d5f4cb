pub mod memory;

pub use memory::InMemoryKeyValueStore;

use crate::models::CoreError;

pub type PersistenceResult<T> = Result<T, CoreError>;

pub const RECENT_SEARCHES_SLOT: &str = "recentSearches";
pub const DARK_MODE_SLOT: &str = "darkMode";

/// Durable byte slots keyed by name. Writes replace the whole slot.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> PersistenceResult<()>;
}
