//! Configuration management for autocommit
//!
//! The configuration holds the OpenAI API key, the model and the sampling
//! temperature. It is persisted as TOML; every field is optional on disk so
//! that a partially completed setup can be stored and resumed later.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Model;
use crate::validation::{validate_api_key, validate_model, validate_temperature};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "AUTOCOMMIT_CONFIG";

/// A complete configuration
///
/// Only built from values that passed their validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub model: Model,
    pub temperature: f32,
}

/// Configuration file structure
///
/// # Example TOML
///
/// ```toml
/// api_key = "sk-..."
/// model = "gpt-3.5-turbo-16k"
/// temperature = 0.3
/// ```
///
/// A field holding a value of the wrong type (`temperature = "0.3"`) is read
/// as absent, so it is asked again and overwritten instead of making the
/// whole file unreadable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<String>,
    /// Kept as a string so that an unknown model in the file is reported
    /// and replaced instead of failing the whole parse
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<f32>,
}

/// Read an optional field, mapping a type mismatch to `None`
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<toml::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.try_into().ok()))
}

impl StoredConfig {
    /// Stored API key, if present and valid
    pub fn valid_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|key| validate_api_key(key).is_ok())
    }

    /// Stored model, if present and valid
    pub fn valid_model(&self) -> Option<Model> {
        self.model
            .as_deref()
            .and_then(|name| validate_model(name).ok())
    }

    /// Stored temperature, if present and valid
    pub fn valid_temperature(&self) -> Option<f32> {
        self.temperature
            .filter(|value| validate_temperature(*value).is_ok())
    }

    /// The complete configuration, if every field is present and valid
    pub fn to_config(&self) -> Option<Config> {
        Some(Config {
            api_key: self.valid_api_key()?.to_string(),
            model: self.valid_model()?,
            temperature: self.valid_temperature()?,
        })
    }
}

/// Persistent storage for the configuration
///
/// Setters write through immediately; callers validate values before
/// calling them.
pub trait ConfigStore {
    /// Whether a configuration has been stored before
    fn is_stored(&self) -> bool;

    /// Read the stored fields; an absent store yields an empty config
    fn load(&self) -> Result<StoredConfig>;

    fn set_api_key(&mut self, api_key: &str) -> Result<()>;

    fn set_model(&mut self, model: Model) -> Result<()>;

    fn set_temperature(&mut self, temperature: f32) -> Result<()>;
}

/// Config store backed by a TOML file
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file; it does not need to exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$AUTOCOMMIT_CONFIG`, or `autocommit/config.toml` in the
    /// user's config directory
    ///
    /// # Errors
    ///
    /// * No config directory can be determined for this platform
    pub fn default_location() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(Self::new(path));
        }

        let dir = dirs::config_dir().context("Could not determine the user config directory")?;
        Ok(Self::new(dir.join("autocommit").join("config.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, apply: impl FnOnce(&mut StoredConfig)) -> Result<()> {
        let mut stored = self.load()?;
        apply(&mut stored);
        self.save(&stored)
    }

    fn save(&self, stored: &StoredConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let content = toml::to_string_pretty(stored).context("Failed to serialize config")?;
        fs::write(&self.path, content).context(format!(
            "Failed to write config file: {}",
            self.path.display()
        ))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).context(
                format!("Failed to restrict permissions of {}", self.path.display()),
            )?;
        }

        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn is_stored(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<StoredConfig> {
        if !self.is_stored() {
            return Ok(StoredConfig::default());
        }

        let content = fs::read_to_string(&self.path).context(format!(
            "Failed to read config file: {}",
            self.path.display()
        ))?;
        toml::from_str(&content).context(format!(
            "Failed to parse config file as TOML: {}",
            self.path.display()
        ))
    }

    fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        self.update(|stored| stored.api_key = Some(api_key.to_string()))
    }

    fn set_model(&mut self, model: Model) -> Result<()> {
        self.update(|stored| stored.model = Some(model.as_str().to_string()))
    }

    fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        self.update(|stored| stored.temperature = Some(temperature))
    }
}
