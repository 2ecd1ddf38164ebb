//! Error types for the yard operations API client.

use muster_core::SyncError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure raised by the REST client before it reaches the sync core.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, TLS, timeout, connection reset.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered 2xx but the body did not decode.
    #[error("Failed to decode response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx response, with the server's message when it sent one.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The session token was missing or unusable.
    #[error("Authentication error: {0}")]
    Auth(String),
}

/// How a caller should react to a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Transient; retry with backoff.
    Retryable,
    /// Will not succeed without a code or data change.
    Permanent,
    /// Needs a fresh login before anything else.
    ReauthRequired,
}

impl ApiError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            ApiError::Http(_) => RetryClass::Retryable,
            ApiError::Json(_) => RetryClass::Permanent,
            ApiError::Api { status, .. } => classify_http_status(*status),
            ApiError::Auth(_) => RetryClass::ReauthRequired,
        }
    }
}

fn classify_http_status(status: u16) -> RetryClass {
    match status {
        401 | 403 => RetryClass::ReauthRequired,
        408 | 429 => RetryClass::Retryable,
        500..=599 => RetryClass::Retryable,
        _ => RetryClass::Permanent,
    }
}

/// Collapse client failures into the two kinds the sync state can hold:
/// undecodable payloads are serialization failures, everything else reads
/// as the network being unavailable.
impl From<ApiError> for SyncError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Json(decode) => SyncError::serialization(decode.to_string()),
            other => SyncError::network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_http_status_for_retry_policy() {
        assert_eq!(classify_http_status(401), RetryClass::ReauthRequired);
        assert_eq!(classify_http_status(403), RetryClass::ReauthRequired);
        assert_eq!(classify_http_status(408), RetryClass::Retryable);
        assert_eq!(classify_http_status(429), RetryClass::Retryable);
        assert_eq!(classify_http_status(500), RetryClass::Retryable);
        assert_eq!(classify_http_status(503), RetryClass::Retryable);
        assert_eq!(classify_http_status(400), RetryClass::Permanent);
        assert_eq!(classify_http_status(404), RetryClass::Permanent);
        assert_eq!(classify_http_status(422), RetryClass::Permanent);
    }

    #[test]
    fn api_errors_fold_into_network_sync_errors() {
        let err = SyncError::from(ApiError::api(503, "maintenance window"));
        assert_eq!(
            err,
            SyncError::network("API error (503): maintenance window")
        );

        let err = SyncError::from(ApiError::auth("no session"));
        assert_eq!(err, SyncError::network("Authentication error: no session"));
    }

    #[test]
    fn decode_failures_fold_into_serialization_sync_errors() {
        let decode = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = SyncError::from(ApiError::Json(decode));
        assert!(matches!(err, SyncError::Serialization(_)));
    }
}
