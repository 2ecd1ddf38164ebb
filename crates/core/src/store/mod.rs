//! Persistent key-value store port.
//!
//! The sync core never talks to a storage engine directly; everything durable
//! goes through this trait so transports and tests can swap the backing
//! implementation. A SQLite-backed store ships in `muster-storage-sqlite`;
//! [`MemoryKeyValueStore`] covers tests and ephemeral sessions.

mod memory;

pub use memory::MemoryKeyValueStore;

use async_trait::async_trait;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by key-value store implementations.
///
/// Callers in the sync core log these and carry on: a failed read counts as
/// an absent key, a failed write as a no-op.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage engine rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The blocking store task could not be joined.
    #[error("storage task error: {0}")]
    Task(String),
}

/// Durable string-keyed storage used by the caches and the read overlay.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    async fn remove(&self, key: &str) -> StoreResult<()>;

    async fn get_all_keys(&self) -> StoreResult<Vec<String>>;

    async fn multi_remove(&self, keys: &[String]) -> StoreResult<()>;
}
