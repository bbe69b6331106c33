//! File-based configuration store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, error, info};

use veil_core::{Error, Result};

/// Persisted configuration: external-provider API keys plus the location of
/// the mapping database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VeilConfig {
    /// Path of the redaction mapping database.
    pub db_path: Option<PathBuf>,

    /// OpenAI API key for the external summarization collaborator.
    pub openai_key: Option<String>,

    /// Gemini API key for the external summarization collaborator.
    pub gemini_key: Option<String>,
}

/// Which keys are configured, without exposing key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
    pub openai_configured: bool,
    pub gemini_configured: bool,
}

/// Owns the config file: load at startup, mutate via a setter, persist on
/// every change.
#[derive(Debug)]
pub struct FileConfigStore {
    config_path: PathBuf,
    config: VeilConfig,
}

impl FileConfigStore {
    /// Load configuration from `config_path`. A missing file yields the
    /// default configuration; it is created on the first persisted change.
    ///
    /// # Errors
    /// - `Error::Io` if the file exists but can't be read
    /// - `Error::Config` if the file isn't valid TOML
    pub fn load(config_path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = expand_tilde(config_path.into())?;

        let config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|e| {
                error!("Failed to read config file: {}", e);
                Error::Io(e)
            })?;
            toml::from_str(&contents).map_err(|e| {
                error!("Failed to parse config file: {}", e);
                Error::Config(format!("Invalid TOML: {}", e))
            })?
        } else {
            debug!("No config file at {:?}, starting from defaults", config_path);
            VeilConfig::default()
        };

        info!("Loaded configuration from {:?}", config_path);
        Ok(Self {
            config_path,
            config,
        })
    }

    /// The current configuration.
    pub fn config(&self) -> &VeilConfig {
        &self.config
    }

    /// Which provider keys are set.
    pub fn status(&self) -> KeyStatus {
        KeyStatus {
            openai_configured: self.config.openai_key.is_some(),
            gemini_configured: self.config.gemini_key.is_some(),
        }
    }

    /// Set the OpenAI key and persist.
    pub fn set_openai_key(&mut self, key: impl Into<String>) -> Result<()> {
        self.config.openai_key = Some(key.into());
        self.persist()
    }

    /// Set the Gemini key and persist.
    pub fn set_gemini_key(&mut self, key: impl Into<String>) -> Result<()> {
        self.config.gemini_key = Some(key.into());
        self.persist()
    }

    /// Set the mapping-database path and persist.
    pub fn set_db_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.config.db_path = Some(path.into());
        self.persist()
    }

    /// Drop all provider keys and persist.
    pub fn clear_keys(&mut self) -> Result<()> {
        self.config.openai_key = None;
        self.config.gemini_key = None;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.config)
            .map_err(|e| Error::Config(format!("TOML serialization error: {}", e)))?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        std::fs::write(&self.config_path, contents).map_err(|e| {
            error!("Failed to write config file: {}", e);
            Error::Io(e)
        })?;

        debug!("Persisted configuration to {:?}", self.config_path);
        Ok(())
    }
}

/// Expand tilde (~) in path
fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    if path.starts_with("~") {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(path.strip_prefix("~").expect("path starts with ~")))
    } else {
        Ok(path)
    }
}
