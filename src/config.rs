//! Configuration for downloads
//!
//! Settings are layered: built-in defaults, then the optional TOML config
//! file, then environment variables, then command-line flags (applied by
//! the CLI). Credentials resolve in the opposite order of specificity:
//! flags beat the environment, the environment beats the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::services::sheet_fetcher::{Credentials, RetryPolicy};
use crate::constants::{
    DEFAULT_DELIMITER, DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BACKOFF_SECS, DEFAULT_SKIP_ROWS, ENV_ACCESS_TOKEN, ENV_API_KEY,
};
use crate::{Error, Result};

/// Top-level configuration, mirrored by the TOML config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
}

/// Stored credentials; either field may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

/// Retry tuning for transient fetch failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_secs: DEFAULT_INITIAL_BACKOFF_SECS,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
        }
    }
}

impl RetryConfig {
    /// Convert into the policy the fetch retrier consumes
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_secs(self.initial_backoff_secs),
            max_backoff: Duration::from_secs(self.max_backoff_secs),
        }
    }
}

/// Defaults for the emitted delimited text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub delimiter: char,
    pub skip_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            skip_rows: DEFAULT_SKIP_ROWS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read config file {}", path.display()), e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!("invalid config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the layered configuration: defaults, then the config file (an
    /// explicitly given path must exist; the default path may be absent),
    /// then credential environment variables
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "loading config file");
                    Self::from_file(&path)?
                }
                _ => Config::default(),
            },
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay credentials from the process environment
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.is_empty() {
                self.credentials.api_key = Some(key);
            }
        }
        if let Ok(token) = std::env::var(ENV_ACCESS_TOKEN) {
            if !token.is_empty() {
                self.credentials.access_token = Some(token);
            }
        }
    }

    /// Check invariants the type system cannot express
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::configuration("retry.max_attempts must be at least 1"));
        }
        if self.retry.initial_backoff_secs > self.retry.max_backoff_secs {
            return Err(Error::configuration(
                "retry.initial_backoff_secs must not exceed retry.max_backoff_secs",
            ));
        }
        Ok(())
    }

    /// Resolve the credentials to use, access token winning over API key
    ///
    /// The CLI overlays `--api-key`/`--access-token` before calling this.
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        if let Some(token) = &self.credentials.access_token {
            return Ok(Credentials::AccessToken(token.clone()));
        }
        if let Some(key) = &self.credentials.api_key {
            return Ok(Credentials::ApiKey(key.clone()));
        }
        Err(Error::configuration(format!(
            "no credentials: pass --api-key/--access-token, set {ENV_API_KEY} or \
             {ENV_ACCESS_TOKEN}, or add a [credentials] section to the config file"
        )))
    }
}

/// Default location of the config file (`~/.config/sheetload/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sheetload").join("config.toml"))
}
