//! lobby-app — interactive login flow walkthrough.
//!
//! Drives the lobby-login state machine against the bundled in-memory auth
//! service, so the whole phone → code → 2FA sequence can be exercised
//! offline. The expected code and password hint are printed as you go.
//!
//! Run:
//!   cargo run -p lobby-app

use std::io::{self, BufRead, Write};
use std::time::Duration;

use lobby_login::{ApiCredentials, AuthClient, InMemoryAuthServer, LoginSession, Outcome, Step};

// ── Demo fixtures ─────────────────────────────────────────────────────────────
const API_ID:        i32  = 12345;
const API_HASH:      &str = "0123456789abcdef";
const DEMO_CODE:     &str = "22222";
const DEMO_PASSWORD: &str = "hunter2";
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Enable logging: RUST_LOG=lobby_login=info cargo run -p lobby-app
    if std::env::var("RUST_LOG").is_err() {
        // SAFETY: single-threaded at this point, no other threads reading env
        unsafe { std::env::set_var("RUST_LOG", "lobby_login=info,lobby_app=info"); }
    }
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let server = InMemoryAuthServer::new()
        .with_code(DEMO_CODE)
        .with_password(DEMO_PASSWORD, Some("the classic xkcd one"))
        .with_latency(Duration::from_millis(300));

    let mut session = LoginSession::start(&server, ApiCredentials::new(API_ID, API_HASH)).await;

    println!("📟 lobby login demo — type `restart` at any prompt to start over\n");

    while !session.step().is_connected() {
        let step = session.step().clone();
        let input = match &step {
            Step::Phone => prompt("Phone number (e.g. +15551234567): ")?,
            Step::Code  => prompt(&format!("Verification code (demo code: {DEMO_CODE}): "))?,
            Step::Password { hint } => {
                let hint = hint.as_deref().unwrap_or("(no hint)");
                prompt(&format!("2FA password (hint: {hint}): "))?
            }
            Step::Connected => break,
        };

        if input == "restart" {
            session.restart();
            println!("↩ Starting over\n");
            continue;
        }

        match &step {
            Step::Phone           => *session.phone_number_mut() = input,
            Step::Code            => *session.verification_code_mut() = input,
            Step::Password { .. } => *session.two_factor_password_mut() = input,
            Step::Connected       => break,
        }

        report(session.submit().await, &session);
    }

    println!("\n👋 Logging out again …");
    session.logout().await?;
    println!("✓ Done");
    Ok(())
}

fn report<C: AuthClient>(outcome: Outcome, session: &LoginSession<C>) {
    match outcome {
        Outcome::CodeSent       => println!("✅ Code sent\n"),
        Outcome::Connected      => println!("✅ Signed in"),
        Outcome::PasswordNeeded => println!("🔐 {}\n", session.last_error().unwrap_or("")),
        Outcome::Failed         => println!("✗ {}\n", session.last_error().unwrap_or("login failed")),
        // Empty input or a duplicate submit: nothing to report.
        Outcome::Ignored | Outcome::Stale => {}
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{msg}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
