//! Standalone lock state probe.
//!
//! Prints the screen status and exits with code 1 when the screen is
//! locked and 0 when it is unlocked. Note the inversion: "locked" is the
//! non-zero outcome, so `lock-check && echo unlocked` reads naturally.
//! A failed probe counts as unlocked, like in the bot.

use desk_guard::platform::NativeScreen;
use desk_guard::screen::{lock_check_outcome, EXIT_UNLOCKED, STATUS_UNLOCKED};
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("desk_guard=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (status, code) = match NativeScreen::new() {
        Ok(screen) => lock_check_outcome(&screen),
        Err(e) => {
            tracing::warn!(error = %e, "Lock state backend unavailable");
            (STATUS_UNLOCKED, EXIT_UNLOCKED)
        }
    };

    println!("{}", status);
    ExitCode::from(code)
}
