//! Runtime configuration from the environment.

use std::path::PathBuf;

use thiserror::Error;

pub const API_URL_ENV: &str = "BLOGDESK_API_URL";
pub const SESSION_DIR_ENV: &str = "BLOGDESK_SESSION_DIR";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL {0:?}: expected http:// or https://")]
    InvalidApiUrl(String),

    #[error("failed to resolve OS app data directory - set {SESSION_DIR_ENV}")]
    NoSessionDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base URL.
    pub api_url: String,
    /// Where the session record and token are kept.
    pub session_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let session_dir = match get(SESSION_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_session_dir()?,
        };

        Self { api_url, session_dir }.validated()
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Result<Self, ConfigError> {
        self.api_url = api_url.into();
        self.validated()
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let url = self.api_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(self)
        } else {
            Err(ConfigError::InvalidApiUrl(self.api_url))
        }
    }
}

/// `{app_data_dir}/blogdesk`, falling back to `~/.local/share/blogdesk`.
fn default_session_dir() -> Result<PathBuf, ConfigError> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoSessionDir)?;
    dir.push("blogdesk");
    Ok(dir)
}
