//! Startup configuration.
//!
//! The configuration is a small JSON file read once at startup. The polling
//! interval is stored as text (`check_cursor_setting`) and parsed here, so a
//! malformed value is caught before the bot connects.

use crate::error::{GuardError, Result};
use crate::platform::Position;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "DESK_GUARD_CONFIG";

/// Config file name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Raw on-disk layout of `config.json`.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    #[serde(default)]
    bot_token: String,

    #[serde(default)]
    check_cursor_setting: String,

    #[serde(default = "default_start_x")]
    guard_start_x: i32,

    #[serde(default = "default_start_y")]
    guard_start_y: i32,

    #[serde(default = "default_lock_grace_millis")]
    lock_grace_millis: u64,

    #[serde(default = "default_api_url")]
    api_url: String,

    #[serde(default = "default_poll_timeout_secs")]
    poll_timeout_secs: u64,
}

fn default_start_x() -> i32 {
    500
}

fn default_start_y() -> i32 {
    300
}

fn default_lock_grace_millis() -> u64 {
    1000
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_timeout_secs() -> u64 {
    60
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token.
    pub bot_token: String,

    /// How often guard mode samples the cursor.
    pub check_interval: Duration,

    /// Where guard mode parks the cursor when it starts.
    pub guard_start: Position,

    /// Pause after a lock request so the session can finish locking.
    pub lock_grace: Duration,

    /// Base URL of the Bot API.
    pub api_url: String,

    /// Long-poll timeout for `getUpdates`.
    pub poll_timeout: Duration,
}

impl Config {
    /// Loads the configuration from the first location that exists.
    ///
    /// Lookup order: `$DESK_GUARD_CONFIG`, `./config.json`, then
    /// `<config dir>/desk-guard/config.json`.
    ///
    /// # Returns
    /// The validated configuration. Returns [`GuardError::ConfigNotFound`]
    /// when no file exists, [`GuardError::Json`] when the file is not valid
    /// JSON and [`GuardError::Config`] when a value is rejected.
    ///
    /// # Example
    /// ```no_run
    /// use desk_guard::config::Config;
    ///
    /// std::env::set_var("DESK_GUARD_CONFIG", "/etc/desk-guard/config.json");
    /// let config = Config::load().unwrap();
    /// println!("polling every {:?}", config.check_interval);
    /// ```
    pub fn load() -> Result<Self> {
        let path = Self::locate()?;
        tracing::info!(path = %path.display(), "Loading configuration");
        Self::from_file(&path)
    }

    /// Loads and validates a specific config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GuardError::ConfigNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parses and validates configuration from JSON text.
    pub fn from_json(contents: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(contents)?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self> {
        let bot_token = raw.bot_token.trim().to_string();
        if bot_token.is_empty() {
            return Err(GuardError::Config("bot_token is not set".to_string()));
        }

        let check_millis = parse_interval_millis(&raw.check_cursor_setting)?;

        let api_url = raw.api_url.trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(GuardError::Config("api_url is empty".to_string()));
        }

        if raw.poll_timeout_secs == 0 {
            return Err(GuardError::Config(
                "poll_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bot_token,
            check_interval: Duration::from_millis(check_millis),
            guard_start: Position::new(raw.guard_start_x, raw.guard_start_y),
            lock_grace: Duration::from_millis(raw.lock_grace_millis),
            api_url,
            poll_timeout: Duration::from_secs(raw.poll_timeout_secs),
        })
    }

    fn locate() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(local);
        }

        if let Some(dir) = dirs::config_dir() {
            let user = dir.join("desk-guard").join(CONFIG_FILE_NAME);
            if user.exists() {
                return Ok(user);
            }
        }

        Err(GuardError::ConfigNotFound(local))
    }
}

/// Parses the textual polling interval. Must be a positive integer.
fn parse_interval_millis(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    match trimmed.parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(millis),
        Ok(_) => Err(GuardError::Config(
            "check_cursor_setting must be greater than zero".to_string(),
        )),
        Err(e) => Err(GuardError::Config(format!(
            "check_cursor_setting {:?} is not a number: {}",
            trimmed, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config =
            Config::from_json(r#"{"bot_token": "123:abc", "check_cursor_setting": "250"}"#)
                .unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.check_interval, Duration::from_millis(250));
        assert_eq!(config.guard_start, Position::new(500, 300));
        assert_eq!(config.lock_grace, Duration::from_secs(1));
        assert_eq!(config.api_url, "https://api.telegram.org");
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_optional_fields_override_defaults() {
        let config = Config::from_json(
            r#"{
                "bot_token": "t",
                "check_cursor_setting": " 40 ",
                "guard_start_x": 10,
                "guard_start_y": 20,
                "lock_grace_millis": 0,
                "api_url": "http://localhost:8081/",
                "poll_timeout_secs": 5
            }"#,
        )
        .unwrap();

        assert_eq!(config.check_interval, Duration::from_millis(40));
        assert_eq!(config.guard_start, Position::new(10, 20));
        assert_eq!(config.lock_grace, Duration::ZERO);
        assert_eq!(config.api_url, "http://localhost:8081");
        assert_eq!(config.poll_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let err = Config::from_json(r#"{"bot_token": "  ", "check_cursor_setting": "100"}"#)
            .unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = Config::from_json(r#"{"check_cursor_setting": "100"}"#).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_unparsable_interval_is_rejected() {
        for value in ["", "abc", "-5", "0", "1.5"] {
            let json = format!(
                r#"{{"bot_token": "t", "check_cursor_setting": "{}"}}"#,
                value
            );
            let err = Config::from_json(&json).unwrap_err();
            assert!(
                matches!(err, GuardError::Config(_)),
                "value {:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, GuardError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, GuardError::ConfigNotFound(p) if p == path));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"bot_token": "42:xyz", "check_cursor_setting": "1000"}}"#
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.bot_token, "42:xyz");
        assert_eq!(config.check_interval, Duration::from_secs(1));
    }
}
