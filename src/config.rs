//! Configuration handling for the forms demo

use crate::error::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Length bounds used by the built-in password and nickname rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub password_min: usize,
    pub password_max: usize,
    pub name_min: usize,
    pub name_max: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            password_min: 6,
            password_max: 32,
            name_min: 2,
            name_max: 20,
        }
    }
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bounds for password/nickname rules
    pub limits: ValidationLimits,
    /// Simulated account-service latency in milliseconds
    pub mock_latency_ms: u64,
    /// Maximum number of operation log entries kept
    pub operation_log_capacity: usize,
    /// Persist the operation log between runs
    pub persist_operation_log: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            limits: ValidationLimits::default(),
            mock_latency_ms: 600,
            operation_log_capacity: 200,
            persist_operation_log: true,
        }
    }
}

impl AppConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "ageless", "ageless-forms")
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for logs and the persisted operation log
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(write_err)
    }

    /// Reject bounds no input could satisfy
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.password_min > limits.password_max {
            return Err(ConfigError::Invalid {
                message: format!(
                    "password_min ({}) exceeds password_max ({})",
                    limits.password_min, limits.password_max
                ),
            });
        }
        if limits.name_min > limits.name_max {
            return Err(ConfigError::Invalid {
                message: format!(
                    "name_min ({}) exceeds name_max ({})",
                    limits.name_min, limits.name_max
                ),
            });
        }
        if self.operation_log_capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "operation_log_capacity must be positive".to_string(),
            });
        }
        Ok(())
    }
}
