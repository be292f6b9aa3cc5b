//! Configuration loading for the TALA TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    /// UI tick interval.
    pub tick_interval_ms: u64,
    /// Interval of the background token refresh.
    pub token_refresh_interval_ms: u64,
    /// Refresh is skipped once the user has been idle this long.
    pub idle_threshold_ms: u64,
    /// Page sizes the grid cycles through, e.g. [10, 20, 50, 100].
    pub page_size_options: Vec<u64>,
    /// JSON file the migrator loads pre-parsed rows from.
    pub migrator_inbox_path: PathBuf,
    pub persistence_path: PathBuf,
    pub error_log_path: PathBuf,
    pub log_path: PathBuf,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or TALA_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: TuiConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.auth.access_token.trim().is_empty() || self.auth.refresh_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth",
                reason: "access_token and refresh_token must be provided".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.token_refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "token_refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.idle_threshold_ms <= self.token_refresh_interval_ms {
            return Err(ConfigError::InvalidValue {
                field: "idle_threshold_ms",
                reason: "must exceed token_refresh_interval_ms".to_string(),
            });
        }
        if self.page_size_options.is_empty() || self.page_size_options.contains(&0) {
            return Err(ConfigError::InvalidValue {
                field: "page_size_options",
                reason: "must list at least one non-zero page size".to_string(),
            });
        }
        for path_field in [
            ("migrator_inbox_path", &self.migrator_inbox_path),
            ("persistence_path", &self.persistence_path),
            ("error_log_path", &self.error_log_path),
            ("log_path", &self.log_path),
        ] {
            if path_field.1.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: path_field.0,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.theme.name.to_ascii_lowercase() != "terra" {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "only 'terra' is supported".to_string(),
            });
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("TALA_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
