//! In-process auth service for demos and tests.
//!
//! [`InMemoryAuthServer`] implements [`AuthClient`] against state held in
//! memory: a configurable expected verification code, an optional 2FA
//! password (with hint), failure injection, and call counters.
//!
//! It also implements `AuthClient` for `&InMemoryAuthServer`, so a test can
//! hand a borrow to [`crate::LoginSession`] and keep inspecting the server.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::client::{AuthClient, LoginRequest};
use crate::credentials::ApiCredentials;
use crate::errors::{AuthError, ServiceError, SignInError};

// ─── InMemoryAuthServer ───────────────────────────────────────────────────────

/// An ephemeral auth service holding everything in memory.
///
/// Defaults: expected code `"22222"`, no 2FA password, not authorized.
pub struct InMemoryAuthServer {
    state:   Mutex<ServerState>,
    latency: Option<Duration>,
}

struct ServerState {
    expected_code:  String,
    password:       Option<String>,
    hint:           Option<String>,
    authorized:     bool,
    code_sent_to:   Option<String>,
    next_send_fail: Option<ServiceError>,
    send_code_calls: u32,
    login_calls:     u32,
}

impl InMemoryAuthServer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServerState {
                expected_code:   "22222".to_string(),
                password:        None,
                hint:            None,
                authorized:      false,
                code_sent_to:    None,
                next_send_fail:  None,
                send_code_calls: 0,
                login_calls:     0,
            }),
            latency: None,
        }
    }

    /// Set the verification code the server expects.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.state.get_mut().expected_code = code.into();
        self
    }

    /// Enable 2FA with the given password and optional hint.
    pub fn with_password(mut self, password: impl Into<String>, hint: Option<&str>) -> Self {
        let s = self.state.get_mut();
        s.password = Some(password.into());
        s.hint = hint.map(str::to_string);
        self
    }

    /// Start with an already established session (startup-check shortcut).
    pub fn already_authorized(mut self) -> Self {
        self.state.get_mut().authorized = true;
        self
    }

    /// Delay every call by `latency` to simulate a slow network.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next `send_code` call fail with `err`.
    pub async fn inject_send_code_failure(&self, err: ServiceError) {
        self.state.lock().await.next_send_fail = Some(err);
    }

    /// How many times `send_code` was reached.
    pub async fn send_code_calls(&self) -> u32 {
        self.state.lock().await.send_code_calls
    }

    /// How many times `login` was reached.
    pub async fn login_calls(&self) -> u32 {
        self.state.lock().await.login_calls
    }

    /// The phone the last code was delivered to, if any.
    pub async fn code_sent_to(&self) -> Option<String> {
        self.state.lock().await.code_sent_to.clone()
    }

    async fn simulate_latency(&self) {
        if let Some(d) = self.latency {
            sleep(d).await;
        }
    }

    async fn do_send_code(
        &self,
        phone:       &str,
        credentials: &ApiCredentials,
    ) -> Result<(), AuthError> {
        self.simulate_latency().await;
        let mut s = self.state.lock().await;
        s.send_code_calls += 1;
        if let Some(err) = s.next_send_fail.take() {
            return Err(AuthError::Service(err));
        }
        if credentials.api_id == 0 || credentials.api_hash.is_empty() {
            return Err(AuthError::Service(ServiceError::parse(400, "API_ID_INVALID")));
        }
        s.code_sent_to = Some(phone.to_string());
        Ok(())
    }

    async fn do_login(&self, request: LoginRequest) -> Result<(), SignInError> {
        self.simulate_latency().await;
        let mut s = self.state.lock().await;
        s.login_calls += 1;

        if let Some(password) = &request.password {
            return match &s.password {
                Some(expected) if password == expected => {
                    s.authorized = true;
                    Ok(())
                }
                _ => Err(SignInError::Other(AuthError::Service(
                    ServiceError::parse(400, "PASSWORD_HASH_INVALID"),
                ))),
            };
        }

        let Some(code) = &request.code else {
            return Err(SignInError::Other(AuthError::Service(
                ServiceError::parse(400, "PHONE_CODE_EMPTY"),
            )));
        };
        if s.code_sent_to.is_none() {
            return Err(SignInError::Other(AuthError::Service(
                ServiceError::parse(400, "PHONE_CODE_EXPIRED"),
            )));
        }
        if *code != s.expected_code {
            return Err(SignInError::InvalidCode);
        }
        if s.password.is_some() {
            return Err(SignInError::PasswordRequired { hint: s.hint.clone() });
        }
        s.authorized = true;
        Ok(())
    }

    async fn do_status(&self) -> Result<bool, AuthError> {
        self.simulate_latency().await;
        Ok(self.state.lock().await.authorized)
    }

    async fn do_logout(&self) -> Result<(), AuthError> {
        self.simulate_latency().await;
        let mut s = self.state.lock().await;
        s.authorized = false;
        s.code_sent_to = None;
        Ok(())
    }
}

impl Default for InMemoryAuthServer {
    fn default() -> Self { Self::new() }
}

impl AuthClient for InMemoryAuthServer {
    async fn send_code(&self, phone: &str, credentials: &ApiCredentials) -> Result<(), AuthError> {
        self.do_send_code(phone, credentials).await
    }
    async fn login(&self, request: LoginRequest) -> Result<(), SignInError> {
        self.do_login(request).await
    }
    async fn status(&self) -> Result<bool, AuthError> {
        self.do_status().await
    }
    async fn logout(&self) -> Result<(), AuthError> {
        self.do_logout().await
    }
}

impl AuthClient for &InMemoryAuthServer {
    async fn send_code(&self, phone: &str, credentials: &ApiCredentials) -> Result<(), AuthError> {
        self.do_send_code(phone, credentials).await
    }
    async fn login(&self, request: LoginRequest) -> Result<(), SignInError> {
        self.do_login(request).await
    }
    async fn status(&self) -> Result<bool, AuthError> {
        self.do_status().await
    }
    async fn logout(&self) -> Result<(), AuthError> {
        self.do_logout().await
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> ApiCredentials {
        ApiCredentials::new(12345, "0123456789abcdef")
    }

    #[tokio::test]
    async fn code_must_be_requested_before_login() {
        let server = InMemoryAuthServer::new();
        let err = server.do_login(LoginRequest::with_code("22222", "+1555")).await.unwrap_err();
        assert!(matches!(err, SignInError::Other(e) if e.is("PHONE_CODE_EXPIRED")));
    }

    #[tokio::test]
    async fn wrong_code_is_invalid_code() {
        let server = InMemoryAuthServer::new();
        server.do_send_code("+1555", &creds()).await.unwrap();
        let err = server.do_login(LoginRequest::with_code("11111", "+1555")).await.unwrap_err();
        assert!(matches!(err, SignInError::InvalidCode));
    }

    #[tokio::test]
    async fn password_gate_reports_hint() {
        let server = InMemoryAuthServer::new().with_password("hunter2", Some("pet name"));
        server.do_send_code("+1555", &creds()).await.unwrap();
        let err = server.do_login(LoginRequest::with_code("22222", "+1555")).await.unwrap_err();
        match err {
            SignInError::PasswordRequired { hint } => assert_eq!(hint.as_deref(), Some("pet name")),
            other => panic!("expected PasswordRequired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn logout_clears_authorization() {
        let server = InMemoryAuthServer::new().already_authorized();
        assert!(server.do_status().await.unwrap());
        server.do_logout().await.unwrap();
        assert!(!server.do_status().await.unwrap());
    }

    #[tokio::test]
    async fn zero_api_id_is_rejected() {
        let server = InMemoryAuthServer::new();
        let err = server.do_send_code("+1555", &ApiCredentials::new(0, "")).await.unwrap_err();
        assert!(err.is("API_ID_INVALID"));
    }
}
