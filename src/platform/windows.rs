//! Windows backend built on [`crate::winapi_utils`].

use super::{CursorControl, Position, ScreenLock};
use crate::error::{GuardError, Result};
use crate::winapi_utils::{get_cursor_pos, is_logon_ui_active, lock_workstation, set_cursor_pos};

fn win_error(e: ::windows::core::Error) -> GuardError {
    GuardError::Platform(e.to_string())
}

/// Lock state from the logon UI process, lock through `LockWorkStation`.
pub struct WindowsScreen;

impl WindowsScreen {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

impl ScreenLock for WindowsScreen {
    fn is_locked(&self) -> Result<bool> {
        is_logon_ui_active().map_err(win_error)
    }

    fn lock_now(&self) -> Result<()> {
        lock_workstation().map_err(win_error)
    }
}

pub struct WindowsCursor;

impl WindowsCursor {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

impl CursorControl for WindowsCursor {
    fn position(&self) -> Result<Position> {
        let (x, y) = get_cursor_pos().map_err(win_error)?;
        Ok(Position::new(x, y))
    }

    fn move_to(&self, position: Position) -> Result<()> {
        set_cursor_pos(position.x, position.y).map_err(win_error)
    }
}
