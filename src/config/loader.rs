//! Configuration loader with file resolution.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use std::path::{Path, PathBuf};

/// Config file name looked for in the current directory.
const CONFIG_FILE_NAME: &str = "crash-harness.toml";

/// Environment variable for an explicit config path.
const CONFIG_PATH_ENV: &str = "CRASH_HARNESS_CONFIG";

/// Configuration loader with resolution logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `CRASH_HARNESS_CONFIG` environment variable (explicit path)
    /// 2. `./crash-harness.toml` (current directory)
    /// 3. `~/.config/crash-harness/crash-harness.toml` (XDG on Linux/macOS,
    ///    the platform equivalent elsewhere)
    /// 4. Built-in defaults (no file required)
    pub fn load() -> ConfigResult<Self> {
        match resolve_config_path() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::with_defaults()),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let config = load_from_file(&path)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        Self {
            config_path: None,
            config: Config::default(),
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    // 3. Platform config directory
    if let Some(dirs) = directories::ProjectDirs::from("", "", "crash-harness") {
        let path = dirs.config_dir().join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
