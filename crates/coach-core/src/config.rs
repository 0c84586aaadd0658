//! Daemon configuration.
//!
//! Plain key=value file, one entry per line, `#` comments allowed.
//! Precedence: CLI flags > config file > defaults.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid config line: {0}")]
    InvalidLine(String),
    #[error("invalid integer value for {key}: {value}")]
    InvalidInt { key: String, value: String },
    #[error("invalid float value for {key}: {value}")]
    InvalidFloat { key: String, value: String },
}

/// Daemon configuration values.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,

    // Language model settings
    pub llm_model: String,
    pub llm_temperature: f64,
    pub llm_max_tokens: u32,

    /// Path to the course catalog CSV. Missing or unreadable files fall
    /// back to the built-in sample catalog.
    pub catalog_path: PathBuf,

    /// Idle age after which a session is eligible for sweeping.
    pub session_max_age_hours: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 7760,
            llm_model: "gpt-4o-mini".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 1000,
            catalog_path: PathBuf::from("comprehensive_course_mapping.csv"),
            session_max_age_hours: 24,
        }
    }
}

impl Config {
    /// Load config from a file, merging with defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.load_file(path)?;
        Ok(config)
    }

    /// Load and merge values from a config file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_content(&content)
    }

    /// Parse config content (key=value format).
    fn parse_content(&mut self, content: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine(line.to_string()));
            };

            let key = key.trim();
            let value = Self::unquote(value.trim());
            self.apply_value(key, &value)?;
        }
        Ok(())
    }

    /// Remove surrounding quotes from a value.
    fn unquote(value: &str) -> String {
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            return value[1..value.len() - 1].to_string();
        }
        value.to_string()
    }

    fn apply_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "port" => self.port = Self::parse_int(key, value)? as u16,
            "llm_model" => self.llm_model = value.to_string(),
            "llm_temperature" => {
                self.llm_temperature = value.parse().map_err(|_| ConfigError::InvalidFloat {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            "llm_max_tokens" => self.llm_max_tokens = Self::parse_int(key, value)?,
            "catalog_path" => self.catalog_path = PathBuf::from(value),
            "session_max_age_hours" => self.session_max_age_hours = Self::parse_int(key, value)?,
            _ => {
                // Warn but don't fail for unknown keys.
                eprintln!("Warning: unknown config key: {key}");
            }
        }
        Ok(())
    }

    fn parse_int(key: &str, value: &str) -> Result<u32, ConfigError> {
        value.parse().map_err(|_| ConfigError::InvalidInt {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Resolve the catalog path against a base directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.catalog_path.is_relative() {
            self.catalog_path = base.join(&self.catalog_path);
        }
    }
}
