//! API credentials injected into the login flow at construction.
//!
//! The flow never reads credentials from ambient global state: the default
//! pair is passed to [`crate::LoginSession::start`], and an advanced-settings
//! override (when enabled) shadows it per attempt.

/// An `(api_id, api_hash)` pair identifying the application to the auth
/// service.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApiCredentials {
    pub api_id:   i32,
    pub api_hash: String,
}

impl ApiCredentials {
    pub fn new(api_id: i32, api_hash: impl Into<String>) -> Self {
        Self { api_id, api_hash: api_hash.into() }
    }
}
