use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokenward::prelude::*;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Characters of each token shown in the session table.
const TABLE_TOKEN_CHARS: usize = 10;

type LabService = SessionService<OsTokenGenerator, Arc<ManualClock>>;

/// Renders one request the way the login page would: a greeting (or a
/// login prompt) followed by the active-sessions table.
fn render(view: &RequestView) -> String {
    let mut out = String::new();

    match &view.session {
        Some(session) => {
            let _ = writeln!(out, "Welcome, {}", session.identity);
            let _ = writeln!(out, "Expires in: {} seconds", session.expires_in_secs());
        }
        None => {
            let _ = writeln!(out, "Not logged in");
        }
    }

    let _ = writeln!(out, "{:<3} {:<10} {:<16} {:>14}", "#", "User", "Token", "Expires In (s)");
    for (idx, row) in view.live.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<3} {:<10} {:<16} {:>14}",
            idx + 1,
            row.identity,
            row.token.truncated(TABLE_TOKEN_CHARS),
            row.expires_in_secs()
        );
    }
    out
}

fn step(title: &str, view: &RequestView) {
    println!("--- {title} ---");
    print!("{}", render(view));
    println!();
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

/// Plays a scripted session lifecycle against a manual clock, so five
/// minutes of "waiting" takes no time at all.
fn walkthrough(service: &LabService, clock: &ManualClock) -> Result<(), TokenwardError> {
    step("anonymous visit", &service.handle_request(None));

    let alice = service.login("alice")?;
    step("alice logs in", &service.handle_request(Some(alice.as_str())));

    clock.advance(Duration::from_secs(120));
    let bob = service.login("bob")?;
    step("two minutes later, bob logs in", &service.handle_request(Some(bob.as_str())));

    // The token is the only secret: replaying it from another client works.
    step(
        "alice's cookie replayed from a second browser",
        &service.handle_request(Some(alice.as_str())),
    );

    service.logout(Some(bob.as_str()));
    step("bob logs out", &service.handle_request(Some(bob.as_str())));

    clock.advance(Duration::from_secs(181));
    step("alice's session runs out", &service.handle_request(Some(alice.as_str())));

    println!(
        "final view as JSON: {}",
        serde_json::to_string(&service.handle_request(None)).unwrap_or_default()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tokenward::telemetry::init_tracing();

    let clock = Arc::new(ManualClock::default());
    let service = SessionService::builder()
        .default_ttl_secs(300)
        .build_with(OsTokenGenerator::new, Arc::clone(&clock));

    tracing::info!(
        cookie_max_age_secs = service.cookie_max_age_secs(),
        "session lab starting"
    );
    walkthrough(&service, &clock)?;

    service.shutdown().await;
    Ok(())
}
