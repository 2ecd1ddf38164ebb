//! In-memory key-value store for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{KeyValueStore, StoreError, StoreResult};

/// Process-local store with no persistence across restarts.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }

    async fn get_all_keys(&self) -> StoreResult<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn multi_remove(&self, keys: &[String]) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
