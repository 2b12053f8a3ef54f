use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Runtime settings for the plugin manager and the MIME engine.
///
/// These stand in for the user settings and command-line switches of a host
/// application: which units are switched on or off, which are under test,
/// and where rule files live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Platform name matched against each unit's platform specification
    pub host_platform: Option<String>,

    /// Units switched on in settings even if disabled by default
    pub enabled_plugins: Vec<String>,

    /// Units switched off in settings
    pub disabled_plugins: Vec<String>,

    /// Units loaded regardless of settings; `all` addresses every unit
    pub force_enabled: Vec<String>,

    /// Units never loaded; `all` addresses every unit
    pub force_disabled: Vec<String>,

    /// Units under test; their Test dependencies get enabled
    pub test_plugins: Vec<String>,

    /// Directories searched for plugin manifests
    pub plugin_paths: Vec<PathBuf>,

    /// Glob rule files loaded into the MIME database, in order
    pub glob_files: Vec<PathBuf>,

    /// Arguments passed to each unit's initialization, by unit name
    pub plugin_arguments: HashMap<String, Vec<String>>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self, StorageSystemError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;
        let data = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageSystemError::FileNotFound(path.to_path_buf())
            } else {
                StorageSystemError::io(e, "read_config", path.to_path_buf())
            }
        })?;
        let mut config = Self::deserialize(&data, format)?;
        log::debug!("Loaded configuration from {}", path.display());

        // Relative rule and plugin paths are relative to the config file.
        if let Some(base) = path.parent() {
            for glob_file in &mut config.glob_files {
                if glob_file.is_relative() {
                    *glob_file = base.join(&glob_file);
                }
            }
            for plugin_path in &mut config.plugin_paths {
                if plugin_path.is_relative() {
                    *plugin_path = base.join(&plugin_path);
                }
            }
        }
        Ok(config)
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, StorageSystemError> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self).map_err(|e| StorageSystemError::SerializationError {
                format: "JSON".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(&self).map_err(|e| StorageSystemError::SerializationError {
                format: "YAML".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(&self).map_err(|e| StorageSystemError::SerializationError {
                format: "TOML".to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, StorageSystemError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| StorageSystemError::DeserializationError {
                format: "JSON".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| StorageSystemError::DeserializationError {
                format: "YAML".to_string(),
                source: Box::new(e),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| StorageSystemError::DeserializationError {
                format: "TOML".to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// The configured host platform, or `"<os> (<arch>)"` of this process
    pub fn host_platform(&self) -> String {
        self.host_platform
            .clone()
            .unwrap_or_else(|| format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH))
    }

    /// Arguments for the unit called `name`
    pub fn arguments_for(&self, name: &str) -> &[String] {
        self.plugin_arguments.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_force_enabled(&self, name: &str) -> bool {
        list_contains(&self.force_enabled, name)
    }

    pub fn is_force_disabled(&self, name: &str) -> bool {
        list_contains(&self.force_disabled, name)
    }
}

fn list_contains(list: &[String], name: &str) -> bool {
    list.iter()
        .any(|entry| entry.eq_ignore_ascii_case(name) || entry.eq_ignore_ascii_case(constants::ALL_PLUGINS_KEYWORD))
}
