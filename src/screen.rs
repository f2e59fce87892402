//! Screen lock state query and lock command.
//!
//! The boolean query fails open: when the platform probe cannot answer,
//! the screen is reported as unlocked. [`query_lock_state`] keeps the
//! unknown case visible for callers that need it.

use crate::error::Result;
use crate::platform::ScreenLock;
use std::thread;
use std::time::Duration;

/// Status text sent when the screen is locked.
pub const STATUS_LOCKED: &str = "Экран заблокирован";

/// Status text sent when the screen is unlocked (or the probe failed).
pub const STATUS_UNLOCKED: &str = "Экран разблокирован";

/// Result of probing the session lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    Unlocked,
    /// The probe failed.
    Unknown,
}

impl LockState {
    /// Collapses the state to a boolean, treating `Unknown` as unlocked.
    pub fn is_locked(self) -> bool {
        matches!(self, LockState::Locked)
    }
}

/// Probes the lock state without hiding probe failures.
pub fn query_lock_state(screen: &dyn ScreenLock) -> LockState {
    match screen.is_locked() {
        Ok(true) => LockState::Locked,
        Ok(false) => LockState::Unlocked,
        Err(e) => {
            tracing::warn!(error = %e, "Lock state probe failed");
            LockState::Unknown
        }
    }
}

/// Returns whether the screen is locked. Probe failures count as unlocked.
pub fn is_screen_locked(screen: &dyn ScreenLock) -> bool {
    query_lock_state(screen).is_locked()
}

/// Human-readable lock status.
pub fn screen_status(screen: &dyn ScreenLock) -> &'static str {
    if is_screen_locked(screen) {
        STATUS_LOCKED
    } else {
        STATUS_UNLOCKED
    }
}

/// Exit code of `lock-check` when the screen is unlocked.
pub const EXIT_UNLOCKED: u8 = 0;

/// Exit code of `lock-check` when the screen is locked.
pub const EXIT_LOCKED: u8 = 1;

/// Status line and exit code for the `lock-check` binary.
///
/// The exit code is inverted against the usual convention: locked is the
/// non-zero outcome. A failed lock state query counts as unlocked.
///
/// # Returns
/// `(STATUS_LOCKED, EXIT_LOCKED)` or `(STATUS_UNLOCKED, EXIT_UNLOCKED)`.
pub fn lock_check_outcome(screen: &dyn ScreenLock) -> (&'static str, u8) {
    if is_screen_locked(screen) {
        (STATUS_LOCKED, EXIT_LOCKED)
    } else {
        (STATUS_UNLOCKED, EXIT_UNLOCKED)
    }
}

/// Locks the screen and waits `grace` for the transition to finish.
pub fn lock_screen(screen: &dyn ScreenLock, grace: Duration) -> Result<()> {
    screen.lock_now()?;
    tracing::info!(grace_ms = grace.as_millis() as u64, "Screen lock requested");
    if !grace.is_zero() {
        thread::sleep(grace);
    }
    Ok(())
}
