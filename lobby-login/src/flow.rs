//! The login state machine, independent of any I/O.
//!
//! [`LoginFlow`] owns the sequence of authentication steps, the fields
//! collected at each step, validation gating, and error-to-step transitions.
//! It never performs network calls itself: [`LoginFlow::begin_submit`] hands
//! out the [`AuthCall`] to issue, and [`LoginFlow::resolve`] applies the
//! call's result once it settles. [`crate::LoginSession`] wires the two ends
//! to an [`crate::AuthClient`].
//!
//! Exactly one step is active at any time — guaranteed by [`Step`] being a
//! single tagged enum rather than a set of boolean flags.

use tracing::{debug, info, warn};

use crate::credentials::ApiCredentials;
use crate::errors::{AuthError, SignInError};

/// Informational notice stored in `last_error` when a login attempt is
/// redirected to the password step. Not a hard failure.
pub const TWO_FACTOR_NOTICE: &str =
    "Two-factor authentication is enabled. Enter your cloud password to continue.";

// ─── Step ─────────────────────────────────────────────────────────────────────

/// The currently active stage of the login flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Collecting the phone number (initial).
    Phone,
    /// Collecting the verification code delivered to the phone.
    Code,
    /// Collecting the 2FA cloud password.
    Password {
        /// The password hint set by the account owner, if any.
        hint: Option<String>,
    },
    /// The session is established (terminal until logout).
    Connected,
}

impl Step {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ─── AuthCall / Ticket / Pending ──────────────────────────────────────────────

/// A call the flow wants issued against the auth backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthCall {
    /// Deliver a verification code to the phone.
    SendCode { phone: String, credentials: ApiCredentials },
    /// Complete the code step.
    SignIn { code: String, phone: String },
    /// Complete the 2FA password step.
    CheckPassword { password: String, code: String },
}

/// Identifies which attempt a pending call belongs to.
///
/// [`LoginFlow::restart`] starts a new attempt; resolving a ticket from an
/// older attempt is a no-op, so a stale in-flight call can never move the
/// flow after the user has walked away from that step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    attempt: u64,
}

/// A call handed out by [`LoginFlow::begin_submit`], waiting to be resolved.
#[derive(Debug)]
pub struct Pending {
    ticket: Ticket,
    /// The call to issue against the backend.
    pub call: AuthCall,
}

impl Pending {
    /// The ticket to pass back to [`LoginFlow::resolve`].
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

// ─── Settled / Outcome ────────────────────────────────────────────────────────

/// The result of a previously issued [`AuthCall`].
#[derive(Debug)]
pub enum Settled {
    /// Result of [`AuthCall::SendCode`].
    SendCode(Result<(), AuthError>),
    /// Result of [`AuthCall::SignIn`] or [`AuthCall::CheckPassword`].
    Login(Result<(), SignInError>),
}

/// What a submit attempt amounted to, for the presentation layer to turn
/// into a notice (or nothing).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happened: the flow was busy, already connected, or a required
    /// field was empty. No backend call was made.
    Ignored,
    /// The verification code is on its way; now on [`Step::Code`].
    CodeSent,
    /// The session is established; now on [`Step::Connected`].
    Connected,
    /// A 2FA password is additionally required; now on [`Step::Password`].
    PasswordNeeded,
    /// The call failed; the message is in [`LoginFlow::last_error`] and the
    /// step did not change.
    Failed,
    /// The result belonged to an attempt that was since restarted; dropped.
    Stale,
}

// ─── LoginFlow ────────────────────────────────────────────────────────────────

/// Mutable state of one login attempt sequence.
///
/// Created per login page/screen and discarded on navigation away. Reaching
/// [`Step::Connected`] is terminal: the only way out is an explicit logout,
/// which discards the whole flow.
#[derive(Debug)]
pub struct LoginFlow {
    step:                 Step,
    phone_number:         String,
    verification_code:    String,
    two_factor_password:  String,
    defaults:             ApiCredentials,
    override_credentials: Option<ApiCredentials>,
    busy:                 bool,
    last_error:           Option<String>,
    attempt:              u64,
}

impl LoginFlow {
    /// Create a flow on [`Step::Phone`] with the given default credentials.
    pub fn new(defaults: ApiCredentials) -> Self {
        Self {
            step:                 Step::Phone,
            phone_number:         String::new(),
            verification_code:    String::new(),
            two_factor_password:  String::new(),
            defaults,
            override_credentials: None,
            busy:                 false,
            last_error:           None,
            attempt:              0,
        }
    }

    // ── Presentation accessors ─────────────────────────────────────────────

    pub fn step(&self) -> &Step {
        &self.step
    }

    /// `true` exactly while a backend call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The last failure message, cleared at the start of every new attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn phone_number_mut(&mut self) -> &mut String {
        &mut self.phone_number
    }

    pub fn verification_code(&self) -> &str {
        &self.verification_code
    }

    pub fn verification_code_mut(&mut self) -> &mut String {
        &mut self.verification_code
    }

    pub fn two_factor_password(&self) -> &str {
        &self.two_factor_password
    }

    pub fn two_factor_password_mut(&mut self) -> &mut String {
        &mut self.two_factor_password
    }

    // ── Advanced settings ──────────────────────────────────────────────────

    /// Whether advanced-settings mode (credential override) is on.
    pub fn advanced_settings(&self) -> bool {
        self.override_credentials.is_some()
    }

    /// Toggle advanced-settings mode. Turning it on seeds the override with
    /// the injected defaults; turning it off discards any edits.
    pub fn toggle_advanced_settings(&mut self) {
        self.override_credentials = match self.override_credentials.take() {
            Some(_) => None,
            None    => Some(self.defaults.clone()),
        };
    }

    /// The editable override pair, when advanced-settings mode is on.
    pub fn override_credentials_mut(&mut self) -> Option<&mut ApiCredentials> {
        self.override_credentials.as_mut()
    }

    /// Credentials the next attempt will use: the override if present,
    /// otherwise the injected defaults.
    pub fn effective_credentials(&self) -> &ApiCredentials {
        self.override_credentials.as_ref().unwrap_or(&self.defaults)
    }

    // ── Transitions ────────────────────────────────────────────────────────

    /// Mark the flow as already authorized, skipping every form step.
    ///
    /// Used by the startup status check when the backend reports an
    /// established session.
    pub fn resume_connected(&mut self) {
        info!("[lobby] already authorized — skipping login form");
        self.step = Step::Connected;
        self.busy = false;
        self.last_error = None;
    }

    /// Validate the current step and hand out the call to issue, or `None`
    /// if nothing should happen.
    ///
    /// Routing is most-advanced-step-first: password over code over phone.
    /// Returns `None` (silently, no notice) when a call is already in
    /// flight, when the flow is connected, or when the step's required field
    /// is empty.
    pub fn begin_submit(&mut self) -> Option<Pending> {
        if self.busy {
            debug!("[lobby] submit ignored — a call is already in flight");
            return None;
        }
        let call = match &self.step {
            Step::Connected => return None,
            Step::Password { .. } => {
                if self.two_factor_password.is_empty() {
                    return None;
                }
                AuthCall::CheckPassword {
                    password: self.two_factor_password.clone(),
                    code:     self.verification_code.trim().to_string(),
                }
            }
            Step::Code => {
                if self.verification_code.is_empty() {
                    return None;
                }
                AuthCall::SignIn {
                    code:  self.verification_code.trim().to_string(),
                    phone: self.phone_number.clone(),
                }
            }
            Step::Phone => {
                if self.phone_number.is_empty() {
                    return None;
                }
                AuthCall::SendCode {
                    phone:       self.phone_number.clone(),
                    credentials: self.effective_credentials().clone(),
                }
            }
        };
        self.busy = true;
        self.last_error = None;
        Some(Pending { ticket: Ticket { attempt: self.attempt }, call })
    }

    /// Apply the result of a call previously handed out by
    /// [`begin_submit`](Self::begin_submit).
    ///
    /// Every path leaves the flow resubmittable: `busy` is cleared and the
    /// step is valid regardless of the result.
    pub fn resolve(&mut self, ticket: Ticket, settled: Settled) -> Outcome {
        if ticket.attempt != self.attempt {
            // The attempt was restarted while this call was in flight.
            debug!("[lobby] dropping result of a superseded login attempt");
            return Outcome::Stale;
        }
        self.busy = false;
        match settled {
            Settled::SendCode(Ok(())) => {
                info!("[lobby] verification code sent ✓");
                self.step = Step::Code;
                Outcome::CodeSent
            }
            Settled::Login(Ok(())) => {
                info!("[lobby] signed in ✓");
                self.step = Step::Connected;
                Outcome::Connected
            }
            Settled::Login(Err(SignInError::PasswordRequired { hint }))
                if self.step == Step::Code =>
            {
                info!("[lobby] 2FA password required — switching to password step");
                self.last_error = Some(TWO_FACTOR_NOTICE.to_string());
                self.step = Step::Password { hint };
                Outcome::PasswordNeeded
            }
            Settled::SendCode(Err(e)) => {
                warn!("[lobby] send_code failed: {e}");
                self.last_error = Some(e.to_string());
                Outcome::Failed
            }
            Settled::Login(Err(e)) => {
                warn!("[lobby] login failed: {e}");
                self.last_error = Some(e.to_string());
                Outcome::Failed
            }
        }
    }

    /// Abandon the current attempt: clear all entered fields and errors and
    /// return to [`Step::Phone`]. Never contacts the backend; an in-flight
    /// call is not cancelled, but its eventual result resolves as
    /// [`Outcome::Stale`].
    ///
    /// No-op once connected.
    pub fn restart(&mut self) {
        if self.step.is_connected() {
            return;
        }
        self.attempt += 1;
        self.busy = false;
        self.step = Step::Phone;
        self.phone_number.clear();
        self.verification_code.clear();
        self.two_factor_password.clear();
        self.last_error = None;
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;

    fn flow() -> LoginFlow {
        LoginFlow::new(ApiCredentials::new(12345, "0123456789abcdef"))
    }

    fn send_code_ok(f: &mut LoginFlow) {
        let p = f.begin_submit().expect("phone submit must produce a call");
        f.resolve(p.ticket(), Settled::SendCode(Ok(())));
    }

    #[test]
    fn empty_phone_never_submits() {
        let mut f = flow();
        assert!(f.begin_submit().is_none());
        assert_eq!(*f.step(), Step::Phone);
        assert!(!f.is_busy());
    }

    #[test]
    fn phone_submit_transitions_to_code_and_keeps_phone() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        let p = f.begin_submit().unwrap();
        assert!(f.is_busy(), "busy while the call is in flight");
        assert!(matches!(p.call, AuthCall::SendCode { ref phone, .. } if phone == "+15551234567"));

        let out = f.resolve(p.ticket(), Settled::SendCode(Ok(())));
        assert_eq!(out, Outcome::CodeSent);
        assert_eq!(*f.step(), Step::Code);
        assert_eq!(f.phone_number(), "+15551234567");
        assert!(!f.is_busy());
    }

    #[test]
    fn phone_submit_failure_stays_on_phone_with_message() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        let p = f.begin_submit().unwrap();
        let err = AuthError::Service(ServiceError::parse(400, "PHONE_NUMBER_INVALID"));
        let out = f.resolve(p.ticket(), Settled::SendCode(Err(err)));
        assert_eq!(out, Outcome::Failed);
        assert_eq!(*f.step(), Step::Phone);
        assert!(f.last_error().unwrap().contains("PHONE_NUMBER_INVALID"));
        assert!(!f.is_busy(), "flow must be resubmittable after failure");
    }

    #[test]
    fn duplicate_submit_while_busy_is_ignored() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        let first = f.begin_submit();
        assert!(first.is_some());
        // Exactly one call may be outstanding: the second submit yields nothing.
        assert!(f.begin_submit().is_none());
        assert!(f.begin_submit().is_none());
    }

    #[test]
    fn code_submit_redirects_to_password_on_2fa() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        send_code_ok(&mut f);

        *f.verification_code_mut() = "22222".into();
        let p = f.begin_submit().unwrap();
        let out = f.resolve(
            p.ticket(),
            Settled::Login(Err(SignInError::PasswordRequired { hint: Some("pet name".into()) })),
        );
        assert_eq!(out, Outcome::PasswordNeeded);
        assert_eq!(*f.step(), Step::Password { hint: Some("pet name".into()) });
        assert_eq!(f.verification_code(), "22222", "code must be preserved for the password step");
        assert_eq!(f.last_error(), Some(TWO_FACTOR_NOTICE));
    }

    #[test]
    fn code_submit_failure_stays_on_code() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        send_code_ok(&mut f);

        *f.verification_code_mut() = "11111".into();
        let p = f.begin_submit().unwrap();
        let out = f.resolve(p.ticket(), Settled::Login(Err(SignInError::InvalidCode)));
        assert_eq!(out, Outcome::Failed);
        assert_eq!(*f.step(), Step::Code);
        assert!(f.last_error().is_some());
    }

    #[test]
    fn password_submit_carries_code_and_connects() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        send_code_ok(&mut f);
        *f.verification_code_mut() = "22222".into();
        let p = f.begin_submit().unwrap();
        f.resolve(p.ticket(), Settled::Login(Err(SignInError::PasswordRequired { hint: None })));

        *f.two_factor_password_mut() = "hunter2".into();
        let p = f.begin_submit().unwrap();
        assert_eq!(
            p.call,
            AuthCall::CheckPassword { password: "hunter2".into(), code: "22222".into() }
        );
        let out = f.resolve(p.ticket(), Settled::Login(Ok(())));
        assert_eq!(out, Outcome::Connected);
        assert!(f.step().is_connected());
    }

    #[test]
    fn connected_is_terminal() {
        let mut f = flow();
        f.resume_connected();
        assert!(f.begin_submit().is_none());
        f.restart();
        assert!(f.step().is_connected(), "restart must not leave Connected");
    }

    #[test]
    fn restart_clears_everything() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        send_code_ok(&mut f);
        *f.verification_code_mut() = "22222".into();
        let p = f.begin_submit().unwrap();
        f.resolve(p.ticket(), Settled::Login(Err(SignInError::PasswordRequired { hint: None })));
        *f.two_factor_password_mut() = "hunter2".into();

        f.restart();
        assert_eq!(*f.step(), Step::Phone);
        assert!(f.phone_number().is_empty());
        assert!(f.verification_code().is_empty());
        assert!(f.two_factor_password().is_empty());
        assert!(f.last_error().is_none());
        assert!(!f.is_busy());
    }

    #[test]
    fn stale_result_after_restart_is_dropped() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        let p = f.begin_submit().unwrap();

        // User restarts while the call is still in flight.
        f.restart();
        *f.phone_number_mut() = "+15559876543".into();

        let out = f.resolve(p.ticket(), Settled::SendCode(Ok(())));
        assert_eq!(out, Outcome::Stale);
        assert_eq!(*f.step(), Step::Phone, "stale success must not advance the step");
        assert_eq!(f.phone_number(), "+15559876543");
    }

    #[test]
    fn new_attempt_clears_previous_error() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        let p = f.begin_submit().unwrap();
        f.resolve(p.ticket(), Settled::SendCode(Err(AuthError::Dropped)));
        assert!(f.last_error().is_some());

        let p = f.begin_submit().unwrap();
        assert!(f.last_error().is_none(), "error must be cleared when a new attempt starts");
        f.resolve(p.ticket(), Settled::SendCode(Ok(())));
    }

    #[test]
    fn advanced_settings_toggle_overrides_and_falls_back() {
        let mut f = flow();
        assert!(!f.advanced_settings());
        assert_eq!(f.effective_credentials().api_id, 12345);

        f.toggle_advanced_settings();
        let creds = f.override_credentials_mut().expect("override editable when enabled");
        creds.api_id = 999;
        creds.api_hash = "fedcba9876543210".into();
        assert_eq!(f.effective_credentials().api_id, 999);

        *f.phone_number_mut() = "+15551234567".into();
        let p = f.begin_submit().unwrap();
        assert!(matches!(
            p.call,
            AuthCall::SendCode { ref credentials, .. } if credentials.api_id == 999
        ));
        f.resolve(p.ticket(), Settled::SendCode(Err(AuthError::Dropped)));

        // Toggling off discards the edits and falls back to the defaults.
        f.toggle_advanced_settings();
        assert!(!f.advanced_settings());
        assert_eq!(f.effective_credentials().api_id, 12345);
    }

    #[test]
    fn flood_wait_error_is_displayed_without_moving() {
        let mut f = flow();
        *f.phone_number_mut() = "+15551234567".into();
        let p = f.begin_submit().unwrap();
        let err = AuthError::Service(ServiceError::parse(420, "FLOOD_WAIT_30"));
        f.resolve(p.ticket(), Settled::SendCode(Err(err)));
        assert_eq!(*f.step(), Step::Phone);
        assert!(f.last_error().unwrap().contains("FLOOD_WAIT"));
        assert!(f.last_error().unwrap().contains("30"));
    }
}
