mod client;
mod errors;
mod logging;

pub use client::{ClientConfig, DohMethod};
pub use errors::ConfigError;
pub use logging::LoggingConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

const LOCAL_CONFIG_PATH: &str = "ferrous-dig.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ferrous-dig/config.toml";

/// Main configuration structure for ferrous-dig
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Query transport settings (timeout, EDNS, DoH method)
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-dig.toml in current directory
    /// 3. /etc/ferrous-dig/config.toml
    /// 4. Default configuration
    ///
    /// Command-line overrides are applied last, then the result is validated.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.client.timeout_ms = timeout_ms;
        }
        if let Some(dnssec_ok) = overrides.dnssec_ok {
            self.client.dnssec_ok = dnssec_ok;
        }
        if let Some(method) = overrides.doh_method {
            self.client.doh_method = method;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.validate()
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub timeout_ms: Option<u64>,
    pub dnssec_ok: Option<bool>,
    pub doh_method: Option<DohMethod>,
    pub log_level: Option<String>,
}
