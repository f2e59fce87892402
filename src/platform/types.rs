use crate::error::Result;
use std::fmt;

/// A cursor position in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Session lock queries and commands.
pub trait ScreenLock: Send + Sync {
    /// Reports whether the interactive session is locked. May fail.
    fn is_locked(&self) -> Result<bool>;

    /// Asks the OS to lock the session immediately.
    fn lock_now(&self) -> Result<()>;
}

/// Reading and moving the mouse cursor.
pub trait CursorControl: Send + Sync {
    fn position(&self) -> Result<Position>;
    fn move_to(&self, position: Position) -> Result<()>;
}
