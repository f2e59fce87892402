//! Workstation session wrappers.

use super::process::is_process_running;
use windows::Win32::System::Shutdown::LockWorkStation;

/// Process that owns the lock and logon screens.
pub const LOGON_UI_PROCESS: &str = "LogonUI.exe";

/// Requests an immediate workstation lock.
///
/// The call only starts the lock; the switch to the secure desktop
/// completes asynchronously.
pub fn lock_workstation() -> windows::core::Result<()> {
    unsafe { LockWorkStation() }
}

/// Returns true while the logon UI is running, which is the case for the
/// lock screen.
pub fn is_logon_ui_active() -> windows::core::Result<bool> {
    is_process_running(LOGON_UI_PROCESS)
}
