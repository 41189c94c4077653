//! Process configuration, read once from the environment at startup.
//!
//! Parsing goes through a lookup closure so tests can feed values without
//! touching the process environment.

use crate::github::EnsureOptions;
use crate::upload::naming::{ExtensionSource, NamingStrategy};
use axum::http::Uri;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Configuration errors. Cloneable so a misconfigured server can report the
/// same error on every request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing GitHub Env Vars: {}", .0.join(", "))]
    MissingEnvVars(Vec<&'static str>),

    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("GitHub client setup failed: {0}")]
    ClientSetup(String),
}

/// Where uploads are committed, and with which credential.
#[derive(Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    token: String,
}

impl DestinationConfig {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Everything the upload workflow needs past the HTTP layer.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub destination: DestinationConfig,
    pub api_url: String,
    pub raw_url: String,
    pub api_timeout: Duration,
    pub ensure_destination: bool,
    pub naming: NamingStrategy,
    pub extension_source: ExtensionSource,
    pub ensure: EnsureOptions,
}

impl UploaderConfig {
    /// Defaults for everything except the destination itself.
    #[must_use]
    pub fn new(destination: DestinationConfig) -> Self {
        Self {
            destination,
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            api_timeout: Duration::from_secs(30),
            ensure_destination: true,
            naming: NamingStrategy::default(),
            extension_source: ExtensionSource::default(),
            ensure: EnsureOptions::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = get("GITHUB_TOKEN");
        let owner = get("GITHUB_OWNER");
        let repo = get("GITHUB_REPO");

        let missing: Vec<&'static str> = [
            ("GITHUB_TOKEN", token.is_none()),
            ("GITHUB_OWNER", owner.is_none()),
            ("GITHUB_REPO", repo.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(token), Some(owner), Some(repo)) = (token, owner, repo) else {
            return Err(ConfigError::MissingEnvVars(missing));
        };

        let branch = get("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let mut config = Self::new(DestinationConfig::new(owner, repo, branch, token));

        if let Some(url) = get("GITHUB_API_URL") {
            config.api_url = parse_base_url("GITHUB_API_URL", url)?;
        }
        if let Some(url) = get("GITHUB_RAW_URL") {
            config.raw_url = parse_base_url("GITHUB_RAW_URL", url)?;
        }
        if let Some(value) = get("GITHUB_API_TIMEOUT_SECS") {
            config.api_timeout = Duration::from_secs(parse_number("GITHUB_API_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = get("UPLOAD_ENSURE_DESTINATION") {
            config.ensure_destination = parse_bool("UPLOAD_ENSURE_DESTINATION", &value)?;
        }
        if let Some(value) = get("UPLOAD_NAMING") {
            config.naming = value.parse().map_err(|reason| invalid("UPLOAD_NAMING", &value, reason))?;
        }
        if let Some(value) = get("UPLOAD_EXTENSION_SOURCE") {
            config.extension_source = value
                .parse()
                .map_err(|reason| invalid("UPLOAD_EXTENSION_SOURCE", &value, reason))?;
        }
        if let Some(value) = get("UPLOAD_BASE_BRANCHES") {
            let branches: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect();
            if branches.is_empty() {
                return Err(invalid("UPLOAD_BASE_BRANCHES", &value, "no branch names"));
            }
            config.ensure.base_branches = branches;
        }
        if let Some(value) = get("UPLOAD_REPO_POLL_ATTEMPTS") {
            let attempts: usize = parse_number("UPLOAD_REPO_POLL_ATTEMPTS", &value)?;
            if attempts == 0 {
                return Err(invalid("UPLOAD_REPO_POLL_ATTEMPTS", &value, "must be at least 1"));
            }
            config.ensure.poll_attempts = attempts;
        }
        if let Some(value) = get("UPLOAD_REPO_POLL_DELAY_MS") {
            config.ensure.poll_delay =
                Duration::from_millis(parse_number("UPLOAD_REPO_POLL_DELAY_MS", &value)?);
        }

        Ok(config)
    }
}

/// Settings for the HTTP listener and intake.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub spool_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            spool_dir: std::env::temp_dir(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(value) = get("BIND_ADDR") {
            config.bind_addr = value
                .parse()
                .map_err(|e: std::net::AddrParseError| invalid("BIND_ADDR", &value, e))?;
        }
        if let Some(value) = get("UPLOAD_MAX_BYTES") {
            let limit: usize = parse_number("UPLOAD_MAX_BYTES", &value)?;
            if limit == 0 {
                return Err(invalid("UPLOAD_MAX_BYTES", &value, "must be greater than zero"));
            }
            config.max_upload_bytes = limit;
        }
        if let Some(value) = get("UPLOAD_SPOOL_DIR") {
            let dir = PathBuf::from(&value);
            if !dir.is_dir() {
                return Err(invalid("UPLOAD_SPOOL_DIR", &value, "not a directory"));
            }
            config.spool_dir = dir;
        }

        Ok(config)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e| invalid(var, value, e))
}

/// Absolute `http(s)` base URL.
fn parse_base_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    let uri: Uri = value.parse().map_err(|e| invalid(var, &value, e))?;
    match (uri.scheme_str(), uri.authority()) {
        (Some("http" | "https"), Some(_)) => Ok(value),
        _ => Err(invalid(var, &value, "expected an absolute http(s) URL")),
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, value, "expected true or false")),
    }
}
