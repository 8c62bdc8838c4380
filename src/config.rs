//! Session configuration parsed from environment variables.
//!
//! - `SD_API_BASE_URL`: auth service root, default `http://localhost:8000`
//! - `SD_SESSION_DIR`: snapshot directory, default `$HOME/.sd-browser`
//! - `SD_AUTH_REQUEST_TIMEOUT_SECS`: default 30
//! - `SD_AUTH_CONNECT_TIMEOUT_SECS`: default 10

use std::path::PathBuf;

use crate::auth::AuthTimeouts;
use crate::auth::http::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const SESSION_DIR_NAME: &str = ".sd-browser";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL `{0}` (expected http:// or https://)")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api_base_url: String,
    pub session_dir: PathBuf,
    pub timeouts: AuthTimeouts,
}

impl SessionConfig {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `SD_API_BASE_URL` is set to something that is not
    /// an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = parse_base_url(lookup("SD_API_BASE_URL").as_deref().unwrap_or(DEFAULT_API_BASE_URL))?;
        let session_dir = lookup("SD_SESSION_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| default_session_dir(lookup("HOME")), PathBuf::from);
        let timeouts = AuthTimeouts {
            request_secs: parse_or(lookup("SD_AUTH_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(lookup("SD_AUTH_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { api_base_url, session_dir, timeouts })
    }

    /// Replace the API base URL (e.g. from a CLI flag).
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an http(s) URL.
    pub fn with_api_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = parse_base_url(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if has_host {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

fn parse_or(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn default_session_dir(home: Option<String>) -> PathBuf {
    match home.filter(|h| !h.trim().is_empty()) {
        Some(home) => PathBuf::from(home).join(SESSION_DIR_NAME),
        None => PathBuf::from(SESSION_DIR_NAME),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
