//! Error types for desk-guard.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("configuration file {0} not found")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, GuardError>;
