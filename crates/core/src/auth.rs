//! Access token boundary.
//!
//! The sync core never performs logins or refreshes tokens; it asks the shell
//! for the current bearer token at request time. A missing or rejected token
//! shows up downstream as an ordinary network failure.

use std::sync::RwLock;

/// Source of the bearer token used for API calls.
pub trait AccessTokenProvider: Send + Sync {
    /// Current session token, if any.
    fn access_token(&self) -> Option<String>;
}

/// Token holder for shells that manage the session elsewhere.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the stored token, or clear it on logout.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }
}

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|slot| slot.clone())
    }
}
