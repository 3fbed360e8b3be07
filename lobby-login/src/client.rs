//! The auth backend contract consumed by the login flow.
//!
//! [`AuthClient`] abstracts over whatever actually performs the network
//! login exchange so the state machine can be driven against a production
//! backend or the bundled [`crate::InMemoryAuthServer`].

use crate::credentials::ApiCredentials;
use crate::errors::{AuthError, SignInError};

// ─── LoginRequest ─────────────────────────────────────────────────────────────

/// Arguments to a login attempt.
///
/// A code-step attempt carries `code` + `phone_number`; a password-step
/// attempt carries `password` + the previously entered `code`.
#[derive(Clone, Debug, Default)]
pub struct LoginRequest {
    pub code:         Option<String>,
    pub password:     Option<String>,
    pub phone_number: Option<String>,
}

impl LoginRequest {
    /// Request for completing the code step.
    pub fn with_code(code: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            code:         Some(code.into()),
            phone_number: Some(phone.into()),
            ..Default::default()
        }
    }

    /// Request for completing the 2FA password step.
    pub fn with_password(password: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            code:     Some(code.into()),
            ..Default::default()
        }
    }
}

// ─── Trait ────────────────────────────────────────────────────────────────────

/// An abstraction over the service that performs the actual authentication
/// exchange.
///
/// Exactly one call may be outstanding per [`crate::LoginSession`] at a time;
/// the session's busy gate enforces this, so implementations do not need
/// their own request queueing.
#[allow(async_fn_in_trait)]
pub trait AuthClient {
    /// Ask the service to deliver a verification code to `phone`.
    async fn send_code(
        &self,
        phone:       &str,
        credentials: &ApiCredentials,
    ) -> Result<(), AuthError>;

    /// Attempt to establish the session with the collected fields.
    async fn login(&self, request: LoginRequest) -> Result<(), SignInError>;

    /// Returns `true` if a session is already established.
    async fn status(&self) -> Result<bool, AuthError>;

    /// Invalidate the current session.
    async fn logout(&self) -> Result<(), AuthError>;
}
