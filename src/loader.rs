//! Configuration loader
//!
//! Reads YAML or JSON documents into a validated [`SwanConfig`].

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::config::SwanConfig;

/// Environment variable naming the configuration directory
pub const CONFIG_DIR_VAR: &str = "SWAN_CONFIG_DIR";

pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Create loader from SWAN_CONFIG_DIR env var or default to "config"
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_DIR_VAR) {
            Ok(dir) => Self::new(dir),
            Err(_) => Self::new("config"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load `name` relative to the configuration directory
    pub fn load(&self, name: &str) -> Result<SwanConfig> {
        self.load_file(self.config_dir.join(name))
    }

    /// Load an explicit path. The extension picks the format.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<SwanConfig> {
        let path = path.as_ref();
        info!("Loading SWAN configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let raw: serde_json::Value = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            other => {
                return Err(anyhow!(
                    "Unsupported configuration format {:?} for {}, expected yaml, yml or json",
                    other.unwrap_or(""),
                    path.display()
                ))
            }
        };

        let config = SwanConfig::from_value(raw)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        info!(
            "Loaded configuration with {} output location(s)",
            config.output().map(|o| o.locations().len()).unwrap_or(0)
        );
        Ok(config)
    }
}
