use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jobseek_core::models::{CoreError, CoreErrorKind, CoreResult};
use jobseek_core::service::http::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};

pub const ENDPOINT_ENV: &str = "JOBSEEK_ENDPOINT";
pub const DATABASE_ENV: &str = "JOBSEEK_DATABASE";

/// Client settings. Precedence, lowest first: defaults, JSON config file,
/// environment, command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub database_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/api".to_string(),
            database_path: PathBuf::from("jobseek.sqlite3"),
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
    }

    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let raw = fs::read_to_string(path).map_err(|error| CoreError {
            kind: CoreErrorKind::InvalidInput,
            message: format!("failed to read config file '{}': {error}", path.display()),
        })?;
        Self::from_json(&raw).map_err(|error| CoreError {
            kind: error.kind,
            message: format!("{} ({})", error.message, path.display()),
        })
    }

    pub fn from_json(raw: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|error| CoreError {
            kind: CoreErrorKind::InvalidInput,
            message: format!("invalid config: {error}"),
        })?;
        config.validated()
    }

    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|value| !value.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(database) = lookup(DATABASE_ENV).filter(|value| !value.trim().is_empty()) {
            self.database_path = PathBuf::from(database);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validated(self) -> CoreResult<Self> {
        if self.request_timeout_secs == 0 {
            return Err(CoreError {
                kind: CoreErrorKind::InvalidInput,
                message: "request_timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.endpoint.trim().is_empty() {
            return Err(CoreError {
                kind: CoreErrorKind::InvalidInput,
                message: "endpoint must not be empty".to_string(),
            });
        }
        Ok(self)
    }
}
