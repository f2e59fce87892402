//! Platform backends for the lock probe, lock command and cursor access.
//!
//! Each target gets a `NativeScreen` and a `NativeCursor`. Targets without a
//! backend get stubs that report [`crate::error::GuardError::Unsupported`].

pub mod types;

pub use types::{CursorControl, Position, ScreenLock};

#[cfg(windows)]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(windows)]
pub use self::windows::{WindowsCursor as NativeCursor, WindowsScreen as NativeScreen};

#[cfg(target_os = "linux")]
pub use linux::{LoginctlScreen as NativeScreen, X11Cursor as NativeCursor};

#[cfg(not(any(windows, target_os = "linux")))]
use crate::error::{GuardError, Result};

#[cfg(not(any(windows, target_os = "linux")))]
pub struct NativeScreen;

#[cfg(not(any(windows, target_os = "linux")))]
impl NativeScreen {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
impl ScreenLock for NativeScreen {
    fn is_locked(&self) -> Result<bool> {
        Err(GuardError::Unsupported("lock state query"))
    }

    fn lock_now(&self) -> Result<()> {
        Err(GuardError::Unsupported("screen lock"))
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
pub struct NativeCursor;

#[cfg(not(any(windows, target_os = "linux")))]
impl NativeCursor {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
impl CursorControl for NativeCursor {
    fn position(&self) -> Result<Position> {
        Err(GuardError::Unsupported("cursor position"))
    }

    fn move_to(&self, _position: Position) -> Result<()> {
        Err(GuardError::Unsupported("cursor movement"))
    }
}
