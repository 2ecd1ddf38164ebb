//! Error types surfaced through resource state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure recorded in resource state instead of being thrown at callers.
///
/// Serializes as `{"kind": ..., "message": ...}` so shells can render it as
/// plain data.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SyncError {
    /// Transport failure, timeout, non-2xx response or rejected credentials.
    #[error("network failure: {0}")]
    Network(String),

    /// No usable cached copy for the requested key.
    #[error("cache miss: {0}")]
    CacheMiss(String),

    /// A payload could not be encoded or decoded.
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl SyncError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn cache_miss(message: impl Into<String>) -> Self {
        Self::CacheMiss(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_error_serializes_as_tagged_data() {
        let err = SyncError::network("connection refused");
        let json = serde_json::to_string(&err).expect("serialize sync error");
        assert_eq!(
            json,
            r#"{"kind":"network","message":"connection refused"}"#
        );
    }

    #[test]
    fn sync_error_round_trips_every_kind() {
        for err in [
            SyncError::network("a"),
            SyncError::cache_miss("b"),
            SyncError::serialization("c"),
        ] {
            let json = serde_json::to_string(&err).expect("serialize");
            let back: SyncError = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, err);
        }
    }
}
