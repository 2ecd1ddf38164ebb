//! SQLite persistence for the muster sync core.
//!
//! Implements the core's key-value store port over a single-file database,
//! giving cached pages and the notification read overlay a durable home
//! between app launches.

pub mod kv;

// Re-export for convenience
pub use kv::SqliteKeyValueStore;
