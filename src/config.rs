//! Configuration management for jellyplay
//!
//! Handles config file loading/saving and device profile selection.
//! Config is stored at ~/.config/jellyplay/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::capabilities::{CapabilityProfile, CapabilityRegistry};

/// Name of the built-in profile, always available
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown device profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Device-class capability profiles by name
    pub profiles: BTreeMap<String, CapabilityProfile>,
}

impl Config {
    /// Get config file path (~/.config/jellyplay/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jellyplay").join("config.toml"))
    }

    /// Load config from the default location, or return default if not found
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a file that may not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Explicit path when given, otherwise the default location
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)
    }

    /// Save config to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Profile name to use: explicit request, then config default, then built-in
    pub fn active_profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Build the capability registry for a profile.
    ///
    /// `default` is the built-in registry unless the config file defines a
    /// profile with that name.
    pub fn registry(&self, requested: Option<&str>) -> Result<CapabilityRegistry, ConfigError> {
        let name = self.active_profile_name(requested);
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.registry()),
            None if name == DEFAULT_PROFILE => Ok(CapabilityRegistry::default()),
            None => Err(ConfigError::UnknownProfile {
                name: name.to_string(),
                available: self.profile_names().join(", "),
            }),
        }
    }

    /// All selectable profile names, built-in first
    pub fn profile_names(&self) -> Vec<String> {
        let mut names = vec![DEFAULT_PROFILE.to_string()];
        names.extend(
            self.profiles
                .keys()
                .filter(|k| k.as_str() != DEFAULT_PROFILE)
                .cloned(),
        );
        names
    }
}
