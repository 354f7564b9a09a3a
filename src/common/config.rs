//! Configuration file handling
//!
//! Settings are layered: config file, then `IDEA_API_*` environment
//! variables, then command-line flags.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

pub const ENV_BASE_URL: &str = "IDEA_API_BASE_URL";
pub const ENV_EMAIL: &str = "IDEA_API_EMAIL";
pub const ENV_PASSWORD: &str = "IDEA_API_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "IDEA_API_TIMEOUT_SECS";

/// Main configuration structure, as read from `config.toml`
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// API location
    #[serde(default)]
    pub api: ApiConfig,

    /// Login credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// API location
#[derive(Debug, Deserialize, Default)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix
    pub base_url: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CredentialsConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// HTTP client settings
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout; the transport default applies when unset
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("idea-api-e2e/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings used to open a session
#[derive(Clone)]
pub struct Settings {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply `IDEA_API_*` environment variables from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using a custom lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.api.base_url = Some(url);
        }
        if let Some(email) = lookup(ENV_EMAIL) {
            self.credentials.email = Some(email);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.credentials.password = Some(password);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("{ENV_TIMEOUT_SECS} must be a number of seconds: {e}"))
            })?;
            self.http.timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Replace file and environment values with any given on the command line
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.base_url {
            self.api.base_url = Some(url.clone());
        }
        if let Some(email) = &overrides.email {
            self.credentials.email = Some(email.clone());
        }
        if let Some(password) = &overrides.password {
            self.credentials.password = Some(password.clone());
        }
        if let Some(secs) = overrides.timeout_secs {
            self.http.timeout_secs = Some(secs);
        }
    }

    /// Merge command-line overrides and validate into [`Settings`]
    pub fn resolve(mut self, overrides: &Overrides) -> Result<Settings> {
        self.apply_overrides(overrides);

        let base_url = self
            .api
            .base_url
            .map(|url| normalize_base_url(&url))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| missing("API base URL", "--base-url", ENV_BASE_URL))?;

        let email = self
            .credentials
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| missing("login email", "--email", ENV_EMAIL))?;

        let password = self
            .credentials
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("login password", "--password", ENV_PASSWORD))?;

        Ok(Settings {
            base_url,
            email: email.trim().to_string(),
            password,
            timeout: self.http.timeout_secs.map(Duration::from_secs),
            user_agent: self.http.user_agent,
        })
    }
}

impl Settings {
    /// Load config file and environment, then apply command-line overrides
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let mut config = Config::load()?;
        config.apply_env()?;
        config.resolve(overrides)
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn missing(what: &str, flag: &str, env: &str) -> Error {
    Error::Config(format!(
        "No {what} configured. Pass {flag}, set {env}, or add it to config.toml"
    ))
}

/// Trim whitespace and trailing slashes so paths can be appended directly
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
