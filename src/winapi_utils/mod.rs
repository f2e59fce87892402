//! Safe wrappers around Windows API calls.
//!
//! This module provides safe Rust abstractions over unsafe WinAPI functions
//! for process enumeration, cursor access and workstation locking.

pub mod cursor;
pub mod process;
pub mod session;

pub use cursor::*;
pub use process::*;
pub use session::*;
