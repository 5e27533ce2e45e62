//! Client configuration, read from the environment (and `.env` via dotenvy).
//!
//! Every value has a default; a malformed value is logged and replaced by the
//! default so a bad `.env` never stops the client from starting.

use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_SESSION_PATH: &str = "ecopreco_session";
pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every request path is appended to.
    pub api_url: String,
    /// Directory of the sled database holding the session.
    pub session_path: String,
    pub page_size: u32,
    pub timeout: Duration,
    /// When set, password recovery posts to `/auth/forgot-password`.
    pub password_recovery_endpoint: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_path: DEFAULT_SESSION_PATH.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            password_recovery_endpoint: false,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        load_env_file();

        let page_size = match try_load("ECOPRECO_PAGE_SIZE", DEFAULT_PAGE_SIZE) {
            0 => {
                warn!("ECOPRECO_PAGE_SIZE must be positive, using default: {DEFAULT_PAGE_SIZE}");
                DEFAULT_PAGE_SIZE
            }
            n => n,
        };

        Self {
            api_url: try_load("ECOPRECO_API_URL", DEFAULT_API_URL.to_string()),
            session_path: try_load("ECOPRECO_SESSION_PATH", DEFAULT_SESSION_PATH.to_string()),
            page_size,
            timeout: Duration::from_secs(try_load("ECOPRECO_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            password_recovery_endpoint: try_load("ECOPRECO_PASSWORD_RECOVERY_ENDPOINT", false),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_session_path(mut self, session_path: impl Into<String>) -> Self {
        self.session_path = session_path.into();
        self
    }
}

/// Load `.env` from the working directory or its parents into the process
/// environment. Variables already set win. Binaries call this before
/// `logging::init` so the log settings can come from the file too.
pub fn load_env_file() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) => {
            debug!("No .env file loaded: {e}");
            None
        }
    }
}

/// Same as [`load_env_file`] for an explicit file.
pub fn load_env_file_from(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), "Could not load env file: {e}");
            false
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            debug!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_load_falls_back_on_missing_and_invalid() {
        env::remove_var("ECOPRECO_TEST_MISSING");
        assert_eq!(try_load("ECOPRECO_TEST_MISSING", 7u32), 7);

        env::set_var("ECOPRECO_TEST_INVALID", "not-a-number");
        assert_eq!(try_load("ECOPRECO_TEST_INVALID", 9u64), 9);

        env::set_var("ECOPRECO_TEST_VALID", " 25 ");
        assert_eq!(try_load("ECOPRECO_TEST_VALID", 9u64), 25);

        env::set_var("ECOPRECO_TEST_BOOL", "true");
        assert!(try_load("ECOPRECO_TEST_BOOL", false));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::default()
            .with_api_url("http://example.test/api")
            .with_session_path("/tmp/session");
        assert_eq!(config.api_url, "http://example.test/api");
        assert_eq!(config.session_path, "/tmp/session");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(!config.password_recovery_endpoint);
    }
}
