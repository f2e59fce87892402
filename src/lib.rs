//! desk-guard - chat-controlled workstation guard.
//!
//! Lets an operator check or force the screen lock and toggle a guard mode
//! that reports mouse movement, all through bot commands.

pub mod bot;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod monitor;
pub mod platform;
pub mod screen;

#[cfg(windows)]
pub mod winapi_utils;

mod test_utils;

pub use error::{GuardError, Result};
