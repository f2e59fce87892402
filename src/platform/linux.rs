//! Linux backend: `loginctl` for the session lock, X11 for the cursor.

use super::{CursorControl, Position, ScreenLock};
use crate::error::{GuardError, Result};
use std::process::Command;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;
use x11rb::NONE;

/// Lock state and lock command through systemd-logind.
pub struct LoginctlScreen {
    session: String,
}

impl LoginctlScreen {
    /// Targets `$XDG_SESSION_ID`, or the caller's own session when unset.
    pub fn new() -> Result<Self> {
        let session = std::env::var("XDG_SESSION_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "self".to_string());
        Ok(Self { session })
    }

    fn loginctl(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("loginctl").args(args).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GuardError::Platform(format!(
                "loginctl {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl ScreenLock for LoginctlScreen {
    fn is_locked(&self) -> Result<bool> {
        let hint = self.loginctl(&[
            "show-session",
            &self.session,
            "--property=LockedHint",
            "--value",
        ])?;
        parse_locked_hint(&hint)
    }

    fn lock_now(&self) -> Result<()> {
        self.loginctl(&["lock-session", &self.session])?;
        Ok(())
    }
}

fn parse_locked_hint(value: &str) -> Result<bool> {
    match value {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(GuardError::Platform(format!(
            "unexpected LockedHint value {:?}",
            other
        ))),
    }
}

/// Cursor access on the default X display.
pub struct X11Cursor {
    conn: RustConnection,
    root: Window,
}

impl X11Cursor {
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| GuardError::Platform(format!("cannot connect to X server: {}", e)))?;
        let root = conn.setup().roots[screen_num].root;
        Ok(Self { conn, root })
    }
}

fn x11_error(e: impl std::fmt::Display) -> GuardError {
    GuardError::Platform(format!("X11 request failed: {}", e))
}

impl CursorControl for X11Cursor {
    fn position(&self) -> Result<Position> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(x11_error)?
            .reply()
            .map_err(x11_error)?;
        Ok(Position::new(reply.root_x.into(), reply.root_y.into()))
    }

    fn move_to(&self, position: Position) -> Result<()> {
        let x = i16::try_from(position.x)
            .map_err(|_| GuardError::Platform(format!("x out of range: {}", position.x)))?;
        let y = i16::try_from(position.y)
            .map_err(|_| GuardError::Platform(format!("y out of range: {}", position.y)))?;

        self.conn
            .warp_pointer(NONE, self.root, 0, 0, 0, 0, x, y)
            .map_err(x11_error)?;
        self.conn.flush().map_err(x11_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locked_hint() {
        assert!(parse_locked_hint("yes").unwrap());
        assert!(!parse_locked_hint("no").unwrap());
        assert!(parse_locked_hint("").is_err());
    }

    #[test]
    #[ignore] // Requires X11 display
    fn test_query_pointer() {
        let cursor = X11Cursor::new().unwrap();
        let pos = cursor.position().unwrap();
        println!("Cursor at {}", pos);
    }
}
