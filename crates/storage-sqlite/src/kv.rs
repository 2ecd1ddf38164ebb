//! SQLite-backed key-value store.
//!
//! One table, one connection. Calls come in on the async runtime and hop to
//! the blocking pool for the actual SQLite work, so slow disks never stall
//! the sync engines.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use muster_core::store::{KeyValueStore, StoreError, StoreResult};

/// Durable [`KeyValueStore`] over a single SQLite database file.
///
/// Cheap to clone; clones share the connection.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Open the store at `path`, creating the database file and schema on
    /// first use.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn =
            Connection::open(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        debug!("Opened kv store at {}", path.display());
        Self::initialize(conn)
    }

    /// In-memory store for tests and ephemeral sessions.
    pub fn in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Backend(e.to_string()))?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> StoreResult<Self> {
        configure_pragmas(&conn).map_err(|e| StoreError::Backend(e.to_string()))?;
        init_schema(&conn).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("connection mutex poisoned".to_string()))?;
            op(&guard).map_err(|e| StoreError::Backend(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn configure_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;",
    )
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                .map(|_| ())
        })
        .await
    }

    async fn get_all_keys(&self) -> StoreResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await
    }

    async fn multi_remove(&self, keys: &[String]) -> StoreResult<()> {
        let keys = keys.to_vec();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("DELETE FROM kv_store WHERE key = ?1")?;
            for key in &keys {
                stmt.execute(params![key])?;
            }
            Ok(())
        })
        .await
    }
}
