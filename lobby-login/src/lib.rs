//! # lobby-login
//!
//! Async phone → code → 2FA login state machine with a pluggable auth
//! backend.
//!
//! ## Features
//! - Single tagged [`Step`] enum (`Phone | Code | Password | Connected`) —
//!   exactly one step is ever active, by construction
//! - Sans-IO [`LoginFlow`] core: validation gating, error-to-step mapping,
//!   busy gate, stale-attempt discarding
//! - Async [`LoginSession`] driver over any [`AuthClient`]
//! - Structured error signals ([`SignInError::PasswordRequired`] carries the
//!   password hint) — no message-substring sniffing
//! - Constructor-injected [`ApiCredentials`] with an advanced-settings
//!   override, no ambient global configuration
//! - Startup status check: an already-authorized backend skips the form
//! - Bundled [`InMemoryAuthServer`] for demos and tests

#![deny(unsafe_code)]

mod client;
mod credentials;
mod errors;
mod server;
mod session;
pub mod flow;

pub use client::{AuthClient, LoginRequest};
pub use credentials::ApiCredentials;
pub use errors::{AuthError, ServiceError, SignInError};
pub use flow::{LoginFlow, Outcome, Step, TWO_FACTOR_NOTICE};
pub use server::InMemoryAuthServer;
pub use session::LoginSession;
