//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/shelf/config.toml)
//! 3. Environment variables (SHELF_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix
const ENV_PREFIX: &str = "SHELF";

/// Default library backend
const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/";

/// Default public catalog search endpoint
const DEFAULT_CATALOG_URL: &str = "https://openlibrary.org/search.json";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for local state (saved login, debug log)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the personal library backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Public catalog search endpoint
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Timeout for searches and login calls
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Timeout for add/remove calls
    #[serde(default = "default_mutation_timeout")]
    pub mutation_timeout_secs: u64,

    /// Save credentials after a successful login for auto-login
    #[serde(default = "default_true")]
    pub remember_login: bool,

    /// Log file for the TUI (defaults to data_dir/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend_url: default_backend_url(),
            catalog_url: default_catalog_url(),
            read_timeout_secs: default_read_timeout(),
            mutation_timeout_secs: default_mutation_timeout(),
            remember_login: true,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SHELF_DATA_DIR, SHELF_BACKEND_URL, ...)
    /// 2. Config file (~/.config/shelf/config.toml or SHELF_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_BACKEND_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.backend_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_CATALOG_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.catalog_url = val;
            }
        }

        if let Some(secs) = env_timeout("READ_TIMEOUT") {
            self.read_timeout_secs = secs;
        }

        if let Some(secs) = env_timeout("MUTATION_TIMEOUT") {
            self.mutation_timeout_secs = secs;
        }

        if let Ok(val) = std::env::var(format!("{}_REMEMBER_LOGIN", ENV_PREFIX)) {
            self.remember_login = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SHELF_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shelf")
            .join("config.toml")
    }

    /// Path of the saved login used for auto-login
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("credentials.toml")
    }

    /// Path of the TUI debug log
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn mutation_timeout(&self) -> Duration {
        Duration::from_secs(self.mutation_timeout_secs)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shelf")
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_read_timeout() -> u64 {
    30
}

fn default_mutation_timeout() -> u64 {
    10
}

/// Whole seconds from `SHELF_<name>`; zero and unparseable values are ignored
fn env_timeout(name: &str) -> Option<u64> {
    let val = std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok()?;
    val.trim().parse().ok().filter(|&secs| secs > 0)
}

fn default_true() -> bool {
    true
}
