//! Cursor position WinAPI wrappers.

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

/// Gets the cursor position in screen coordinates.
///
/// Fails when the calling desktop is not the input desktop (for example
/// while the workstation is locked).
pub fn get_cursor_pos() -> windows::core::Result<(i32, i32)> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point)? };
    Ok((point.x, point.y))
}

/// Moves the cursor to the given screen coordinates.
pub fn set_cursor_pos(x: i32, y: i32) -> windows::core::Result<()> {
    unsafe { SetCursorPos(x, y) }
}
