//! Configuration
//!
//! Wait ceilings, the fixtures directory and logging, loadable from YAML.
//! Missing fields fall back to defaults.
//!
//! ```yaml
//! wait:
//!   timeout_ms: 10000
//!   poll_interval_ms: 25
//! fixtures_dir: cypress/fixtures
//! logging:
//!   filter: probar_netwait=debug
//!   format: json
//! ```

use crate::logging::LoggingConfig;
use crate::result::NetwaitResult;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetwaitConfig {
    /// Default options for every `wait_for_*` command
    pub wait: WaitOptions,
    /// Directory fixture mocks are read from
    pub fixtures_dir: PathBuf,
    /// Logging setup
    pub logging: LoggingConfig,
}

impl Default for NetwaitConfig {
    fn default() -> Self {
        Self {
            wait: WaitOptions::default(),
            fixtures_dir: PathBuf::from("fixtures"),
            logging: LoggingConfig::default(),
        }
    }
}

impl NetwaitConfig {
    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> NetwaitResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> NetwaitResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> NetwaitResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> NetwaitResult<()> {
        self.wait.validate()
    }

    /// Replace the wait options
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Replace the fixtures directory
    #[must_use]
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Replace the logging setup
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}
