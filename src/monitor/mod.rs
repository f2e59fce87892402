//! Core monitoring logic.
//!
//! This module contains the guard-mode cursor watcher: the polling thread,
//! its start/stop state machine and the alert sink it reports to.

pub mod cursor_watcher;

pub use cursor_watcher::*;
