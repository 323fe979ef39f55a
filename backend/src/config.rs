use std::path::PathBuf;
use std::str::FromStr;

use dashboard_frontend::{LoadLimits, SessionConfig, DEFAULT_API_BASE};

pub const DEFAULT_STORE_PATH: &str = "dashboard_store.json";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_REQUEST_ATTEMPTS: usize = 2;

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub store_path: PathBuf,
    pub timeout_ms: u64,
    pub request_attempts: usize,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_owned(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            request_attempts: DEFAULT_REQUEST_ATTEMPTS,
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by `DASHBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(base) = lookup("DASHBOARD_API_BASE") {
            config.api_base = base;
        }
        if let Some(path) = lookup("DASHBOARD_STORE") {
            config.store_path = PathBuf::from(path);
        }
        if let Some(timeout_ms) = number(&lookup, "DASHBOARD_TIMEOUT_MS")? {
            config.timeout_ms = timeout_ms;
        }
        if let Some(attempts) = number(&lookup, "DASHBOARD_ATTEMPTS")? {
            config.request_attempts = attempts;
        }

        let limits: &mut LoadLimits = &mut config.session.limits;
        if let Some(limit) = limit(&lookup, "DASHBOARD_USER_LIMIT")? {
            limits.users = limit;
        }
        if let Some(limit) = limit(&lookup, "DASHBOARD_POST_LIMIT")? {
            limits.posts = limit;
        }
        if let Some(limit) = limit(&lookup, "DASHBOARD_COMMENT_LIMIT")? {
            limits.comments = limit;
        }
        if let Some(limit) = limit(&lookup, "DASHBOARD_COMMENT_PREVIEW")? {
            limits.comment_preview = limit;
        }

        Ok(config)
    }
}

fn number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(None),
    }
}

/// Like [`number`], but `0` lifts the cap.
fn limit(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Option<usize>>, ConfigError> {
    Ok(number::<usize>(lookup, key)?.map(|limit| (limit > 0).then_some(limit)))
}
