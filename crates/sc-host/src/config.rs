//! Host configuration with validation and versioning.

use crate::{HostError, HostResult, LoggingSettings, SidecarSettings};

use std::panic::Location;
use std::path::Path;

use error_location::ErrorLocation;
use sc_facade::FacadeConfig;
use serde::{Deserialize, Serialize};

/// Configuration version for migration support.
/// Increment when adding new fields or changing structure.
pub const CONFIG_VERSION: u32 = 1;

pub const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_PROGRAM: &str = "api";
const DEFAULT_SHUTDOWN_COMMAND: &str = "sidecar shutdown";
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_RETENTION: u32 = 7;
const DEFAULT_LOG_FILE_PREFIX: &str = "sidecar-desktop";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Sidecar process settings
    #[serde(default)]
    pub sidecar: SidecarSettings,

    /// How clients reach the sidecar's HTTP surface
    #[serde(default)]
    pub backend: FacadeConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

// === Default Value Functions ===

fn default_version() -> u32 {
    CONFIG_VERSION
}
pub(crate) fn default_program() -> String {
    DEFAULT_PROGRAM.into()
}
pub(crate) fn default_shutdown_command() -> String {
    DEFAULT_SHUTDOWN_COMMAND.into()
}
pub(crate) fn default_shutdown_timeout() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_SECS
}
pub(crate) fn default_true() -> bool {
    true
}
pub(crate) fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.into()
}
pub(crate) fn default_log_dir() -> String {
    DEFAULT_LOG_DIR.into()
}
pub(crate) fn default_log_retention() -> u32 {
    DEFAULT_LOG_RETENTION
}
pub(crate) fn default_log_file_prefix() -> String {
    DEFAULT_LOG_FILE_PREFIX.into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            sidecar: SidecarSettings::default(),
            backend: FacadeConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

// === Configuration Operations ===

impl AppConfig {
    /// Load config from file, creating default if not exists.
    pub fn load_or_create(config_dir: &Path) -> HostResult<Self> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let mut config: Self =
                toml::from_str(&content).map_err(|e| HostError::config_invalid(e.to_string()))?;

            // Migrate if needed
            if config.version < CONFIG_VERSION {
                config = Self::migrate(config);
                config.save(config_dir)?;
            }

            config.validate()?;
            Ok(config)
        } else {
            std::fs::create_dir_all(config_dir).map_err(|source| HostError::DataDirCreation {
                path: config_dir.to_path_buf(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;
            let config = Self::default();
            config.save(config_dir)?;
            Ok(config)
        }
    }

    /// Save config to file atomically.
    ///
    /// Uses write-to-temp-then-rename pattern to prevent
    /// partial writes if the process is interrupted.
    pub fn save(&self, config_dir: &Path) -> HostResult<()> {
        let config_path = config_dir.join(CONFIG_FILENAME);
        let content =
            toml::to_string_pretty(self).map_err(|e| HostError::config_invalid(e.to_string()))?;

        let temp_path = config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, &content)?;
        std::fs::rename(&temp_path, &config_path)?;

        Ok(())
    }

    /// Migrate config from older version.
    fn migrate(mut config: Self) -> Self {
        // Version 0 -> 1: backend addressing moved into its own table
        if config.version == 0 {
            config.backend = FacadeConfig::default();
            config.version = 1;
        }

        config
    }

    /// Validate configuration values.
    pub fn validate(&self) -> HostResult<()> {
        self.backend.validate().map_err(HostError::config_invalid)?;

        if self.sidecar.program.trim().is_empty() {
            return Err(HostError::config_invalid("Sidecar program must not be empty"));
        }

        let command = &self.sidecar.shutdown_command;
        if command.trim().is_empty() || command.contains('\n') {
            return Err(HostError::config_invalid(
                "Shutdown command must be a single non-empty line",
            ));
        }

        if self.sidecar.shutdown_timeout_secs == 0 {
            return Err(HostError::config_invalid("Shutdown timeout must be > 0"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(HostError::config_invalid(format!(
                "Log level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
