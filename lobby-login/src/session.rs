//! Async login session — drives a [`LoginFlow`] against an [`AuthClient`].
//!
//! # Full flow
//!
//! ```rust,no_run
//! use lobby_login::{ApiCredentials, InMemoryAuthServer, LoginSession, Outcome, Step};
//!
//! # async fn demo() {
//! let server = InMemoryAuthServer::new().with_code("22222");
//! let mut session = LoginSession::start(server, ApiCredentials::new(12345, "abcdef")).await;
//!
//! *session.phone_number_mut() = "+15551234567".into();
//! assert_eq!(session.submit().await, Outcome::CodeSent);
//!
//! *session.verification_code_mut() = "22222".into();
//! match session.submit().await {
//!     Outcome::Connected      => println!("signed in"),
//!     Outcome::PasswordNeeded => { /* collect the 2FA password and submit again */ }
//!     _                       => eprintln!("{}", session.last_error().unwrap_or("?")),
//! }
//! # }
//! ```

use tracing::warn;

use crate::client::{AuthClient, LoginRequest};
use crate::credentials::ApiCredentials;
use crate::errors::AuthError;
use crate::flow::{AuthCall, LoginFlow, Outcome, Settled, Step};

// ─── LoginSession ─────────────────────────────────────────────────────────────

/// One user-facing login session: a [`LoginFlow`] plus the backend client it
/// submits against.
///
/// Created on page entry, discarded on navigation away or by
/// [`logout`](Self::logout). All methods take `&mut self`, so at most one
/// backend call is ever outstanding; the flow's busy gate additionally
/// swallows duplicate submits from re-entrant drivers.
pub struct LoginSession<C> {
    client: C,
    flow:   LoginFlow,
}

impl<C: AuthClient> LoginSession<C> {
    /// Create a session and run the startup status check.
    ///
    /// If the backend already holds an established session, the flow lands
    /// directly on [`Step::Connected`] with no user interaction. A failed
    /// probe is non-fatal: the flow stays on [`Step::Phone`].
    pub async fn start(client: C, defaults: ApiCredentials) -> Self {
        let mut flow = LoginFlow::new(defaults);
        match client.status().await {
            Ok(true)  => flow.resume_connected(),
            Ok(false) => {}
            Err(e)    => warn!("[lobby] status check failed ({e}) — showing login form"),
        }
        Self { client, flow }
    }

    // ── Actions ────────────────────────────────────────────────────────────

    /// Submit the current step's field against the backend.
    ///
    /// Routes by the active step (password over code over phone), awaits the
    /// backend call, and applies the result. Returns [`Outcome::Ignored`]
    /// without touching the backend when the flow is busy, connected, or the
    /// required field is empty.
    pub async fn submit(&mut self) -> Outcome {
        let Some(pending) = self.flow.begin_submit() else {
            return Outcome::Ignored;
        };
        let ticket = pending.ticket();
        let settled = match pending.call {
            AuthCall::SendCode { phone, credentials } => {
                Settled::SendCode(self.client.send_code(&phone, &credentials).await)
            }
            AuthCall::SignIn { code, phone } => {
                Settled::Login(self.client.login(LoginRequest::with_code(code, phone)).await)
            }
            AuthCall::CheckPassword { password, code } => {
                Settled::Login(self.client.login(LoginRequest::with_password(password, code)).await)
            }
        };
        self.flow.resolve(ticket, settled)
    }

    /// Abandon the current attempt and return to the phone step.
    ///
    /// Purely local: does not contact the backend and does not cancel an
    /// in-flight call (its result is discarded when it settles).
    pub fn restart(&mut self) {
        self.flow.restart();
    }

    /// Toggle advanced-settings mode (per-attempt credential override).
    pub fn toggle_advanced_settings(&mut self) {
        self.flow.toggle_advanced_settings();
    }

    /// Invalidate the backend session and discard this login session.
    pub async fn logout(self) -> Result<(), AuthError> {
        self.client.logout().await
    }

    // ── Presentation accessors ─────────────────────────────────────────────

    pub fn step(&self) -> &Step {
        self.flow.step()
    }

    pub fn is_busy(&self) -> bool {
        self.flow.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.flow.last_error()
    }

    pub fn phone_number(&self) -> &str {
        self.flow.phone_number()
    }

    pub fn phone_number_mut(&mut self) -> &mut String {
        self.flow.phone_number_mut()
    }

    pub fn verification_code(&self) -> &str {
        self.flow.verification_code()
    }

    pub fn verification_code_mut(&mut self) -> &mut String {
        self.flow.verification_code_mut()
    }

    pub fn two_factor_password(&self) -> &str {
        self.flow.two_factor_password()
    }

    pub fn two_factor_password_mut(&mut self) -> &mut String {
        self.flow.two_factor_password_mut()
    }

    pub fn advanced_settings(&self) -> bool {
        self.flow.advanced_settings()
    }

    pub fn override_credentials_mut(&mut self) -> Option<&mut ApiCredentials> {
        self.flow.override_credentials_mut()
    }

    /// The underlying flow, for drivers that need direct access.
    pub fn flow(&self) -> &LoginFlow {
        &self.flow
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
