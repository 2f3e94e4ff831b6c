//! Key-value storage for dialup state.
//!
//! All persisted state (settings, connection times, bypass markers,
//! pending navigations) lives in a flat map of string keys to JSON
//! values behind the [`KeyValueStore`] trait. The engine only ever talks
//! to the trait, so the backend can be swapped:
//!
//! - [`MemoryStore`] -- process-local map, used by tests and ephemeral runs.
//! - [`JsonFileStore`] -- the same map persisted to a JSON file.
//!
//! No backend offers multi-key transactions. Callers sequence dependent
//! reads and writes themselves.

pub mod file;
pub mod keys;
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use dialup_types::error::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A batch of stored entries keyed by storage key.
pub type StoreMap = BTreeMap<String, serde_json::Value>;

/// Asynchronous string-keyed JSON store.
///
/// Implementations must be shareable across tasks; every method may
/// suspend while the backend performs I/O.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the given keys. Keys with no stored value are absent from
    /// the result.
    async fn get(&self, keys: &[&str]) -> Result<StoreMap>;

    /// Fetch every stored entry.
    async fn get_all(&self) -> Result<StoreMap>;

    /// Insert or overwrite each entry in `items`.
    async fn set(&self, items: StoreMap) -> Result<()>;

    /// Delete the given keys. Missing keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<()>;
}

/// Build a [`StoreMap`] holding a single entry.
pub fn single(key: impl Into<String>, value: serde_json::Value) -> StoreMap {
    let mut map = StoreMap::new();
    map.insert(key.into(), value);
    map
}
