//! # Ledger Configuration
//!
//! Sources, lowest precedence first: built-in defaults, a YAML file, and
//! `UNICHAIN_*` environment variables.
//!
//! ```yaml
//! format_version: "1.0"
//! replica_timeout_ms: 2000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_FORMAT_VERSION: &str = "UNICHAIN_FORMAT_VERSION";
pub const ENV_REPLICA_TIMEOUT_MS: &str = "UNICHAIN_REPLICA_TIMEOUT_MS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Written into every new block's `formatVersion`.
    pub format_version: String,
    /// Upper bound on a single replica's validation call.
    pub replica_timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            format_version: "1.0".to_string(),
            replica_timeout_ms: 2000,
        }
    }
}

impl LedgerConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(version) = lookup(ENV_FORMAT_VERSION) {
            self.format_version = version;
        }
        if let Some(raw) = lookup(ENV_REPLICA_TIMEOUT_MS) {
            self.replica_timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_REPLICA_TIMEOUT_MS,
                value: raw.clone(),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.format_version.trim().is_empty() {
            return Err(ConfigError::Invalid("format_version must not be empty".into()));
        }
        if self.replica_timeout_ms == 0 {
            return Err(ConfigError::Invalid("replica_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn replica_timeout(&self) -> Duration {
        Duration::from_millis(self.replica_timeout_ms)
    }
}
