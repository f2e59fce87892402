//! Process-related WinAPI wrappers.
//!
//! Provides a safe abstraction for walking the system process list,
//! used to detect the logon screen process.

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};

/// RAII wrapper for a ToolHelp snapshot handle.
///
/// Automatically closes the handle when dropped to prevent handle leaks.
struct SnapshotHandle(HANDLE);

impl SnapshotHandle {
    /// Takes a snapshot of all processes in the system.
    fn processes() -> windows::core::Result<Self> {
        let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)? };
        Ok(Self(handle))
    }

    fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for SnapshotHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn exe_name(entry: &PROCESSENTRY32W) -> String {
    let len = entry
        .szExeFile
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(entry.szExeFile.len());
    String::from_utf16_lossy(&entry.szExeFile[..len])
}

/// Lists the executable names of all running processes.
///
/// Unlike opening each process, the snapshot also sees processes owned
/// by SYSTEM (such as `LogonUI.exe`).
///
/// # Example
/// ```ignore
/// use desk_guard::winapi_utils::list_process_names;
///
/// for name in list_process_names().unwrap() {
///     println!("{}", name);
/// }
/// ```
pub fn list_process_names() -> windows::core::Result<Vec<String>> {
    let snapshot = SnapshotHandle::processes()?;

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut names = Vec::new();
    unsafe {
        Process32FirstW(snapshot.as_raw(), &mut entry)?;
        loop {
            names.push(exe_name(&entry));
            if Process32NextW(snapshot.as_raw(), &mut entry).is_err() {
                break;
            }
        }
    }

    Ok(names)
}

/// Returns true if a process with the given executable name is running.
///
/// # Arguments
/// * `exe` - Executable file name such as `LogonUI.exe`. The comparison
///   ignores ASCII case.
///
/// # Returns
/// Whether any process in a fresh snapshot has that name, or the WinAPI
/// error if the snapshot could not be taken.
///
/// # Example
/// ```ignore
/// use desk_guard::winapi_utils::is_process_running;
///
/// if is_process_running("logonui.exe").unwrap() {
///     println!("lock screen is up");
/// }
/// ```
pub fn is_process_running(exe: &str) -> windows::core::Result<bool> {
    Ok(list_process_names()?
        .iter()
        .any(|name| name.eq_ignore_ascii_case(exe)))
}
