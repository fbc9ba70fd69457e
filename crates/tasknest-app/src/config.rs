use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration loaded from `config.toml` in the config
/// directory.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Storage-related settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Input-handling settings.
    #[serde(default)]
    pub input: InputConfig,
}

/// `[storage]` configuration block.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the record file path.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// `[input]` configuration block.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Whether `add` scans for due-date phrases.
    #[serde(default = "default_date_extraction")]
    pub date_extraction: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            date_extraction: default_date_extraction(),
        }
    }
}

const fn default_date_extraction() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from `dir/config.toml`, falling back to defaults
    /// when the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = dir.as_ref().join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        Ok(config)
    }

    /// Resolve the record file path, preferring the config override.
    #[must_use]
    pub fn data_path(&self, fallback: PathBuf) -> PathBuf {
        self.storage.path.clone().unwrap_or(fallback)
    }
}
