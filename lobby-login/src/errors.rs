//! Error types for lobby-login.
//!
//! The auth backend reports failures in the Telegram RPC style
//! (`PHONE_CODE_INVALID`, `FLOOD_WAIT_30`), so the hierarchy keeps the
//! name/value split and wildcard matching that style calls for.

use std::{fmt, io};

// ─── ServiceError ─────────────────────────────────────────────────────────────

/// An error returned by the auth service in response to a call.
///
/// Numeric values are stripped from the name and placed in [`ServiceError::value`].
///
/// # Example
/// `FLOOD_WAIT_30` → `ServiceError { code: 420, name: "FLOOD_WAIT", value: Some(30) }`
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceError {
    /// HTTP-like status code.
    pub code: i32,
    /// Error name in SCREAMING_SNAKE_CASE with digits removed.
    pub name: String,
    /// Numeric suffix extracted from the name, if any.
    pub value: Option<u32>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service error {}: {}", self.code, self.name)?;
        if let Some(v) = self.value {
            write!(f, " (value: {v})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Parse a raw service error message like `"FLOOD_WAIT_30"` into a `ServiceError`.
    pub fn parse(code: i32, message: &str) -> Self {
        // Try to find a numeric suffix after the last underscore.
        // e.g. "FLOOD_WAIT_30" → name = "FLOOD_WAIT", value = Some(30)
        if let Some(idx) = message.rfind('_') {
            let suffix = &message[idx + 1..];
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(v) = suffix.parse::<u32>() {
                    let name = message[..idx].to_string();
                    return Self { code, name, value: Some(v) };
                }
            }
        }
        Self { code, name: message.to_string(), value: None }
    }

    /// Match on the error name, with optional wildcard prefix/suffix `'*'`.
    ///
    /// # Examples
    /// - `err.is("FLOOD_WAIT")` — exact match
    /// - `err.is("PHONE_CODE_*")` — starts-with match
    /// - `err.is("*_INVALID")` — ends-with match
    pub fn is(&self, pattern: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix('*') {
            self.name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            self.name.ends_with(suffix)
        } else {
            self.name == pattern
        }
    }
}

// ─── AuthError ────────────────────────────────────────────────────────────────

/// The error type returned from any [`crate::AuthClient`] method that talks
/// to the auth service.
#[derive(Debug)]
pub enum AuthError {
    /// The service rejected the request.
    Service(ServiceError),
    /// Network / I/O failure before a service response arrived.
    Io(io::Error),
    /// The request was dropped (e.g. the backing connection shut down).
    Dropped,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(e) => write!(f, "{e}"),
            Self::Io(e)      => write!(f, "I/O error: {e}"),
            Self::Dropped    => write!(f, "request dropped"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<io::Error> for AuthError {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}

impl AuthError {
    /// Returns `true` if this is the named service error (supports `'*'` wildcards).
    pub fn is(&self, pattern: &str) -> bool {
        match self {
            Self::Service(e) => e.is(pattern),
            _                => false,
        }
    }
}

// ─── SignInError ──────────────────────────────────────────────────────────────

/// Errors returned by [`crate::AuthClient::login`].
///
/// The login flow matches on these variants; it never inspects message
/// substrings to discover what went wrong.
#[derive(Debug)]
pub enum SignInError {
    /// 2FA is enabled; an additional password step is needed.
    PasswordRequired {
        /// The password hint set by the account owner, if any.
        hint: Option<String>,
    },
    /// The code entered was wrong or has expired.
    InvalidCode,
    /// Any other error.
    Other(AuthError),
}

impl fmt::Display for SignInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PasswordRequired { hint: Some(h) } => write!(f, "2FA password required (hint: {h})"),
            Self::PasswordRequired { hint: None }    => write!(f, "2FA password required"),
            Self::InvalidCode                        => write!(f, "invalid or expired code"),
            Self::Other(e)                           => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SignInError {}

impl From<AuthError> for SignInError {
    fn from(e: AuthError) -> Self { Self::Other(e) }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
