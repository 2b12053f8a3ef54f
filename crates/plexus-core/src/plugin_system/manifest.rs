use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::plugin_system::dependency::{DependencyKind, PluginDependency};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::PluginVersion;

/// Describes a command-line argument a plugin understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescription {
    pub name: String,
    #[serde(default)]
    pub parameter: String,
    #[serde(default)]
    pub description: String,
}

/// Represents a plugin manifest that describes a plugin
#[derive(Debug, Clone, Serialize)]
pub struct PluginManifest {
    /// Stable plugin name, used to match dependencies
    pub name: String,

    /// Plugin version
    pub version: String,

    /// Lowest version of itself this plugin stays compatible with
    pub compat_version: String,

    pub vendor: String,
    pub category: String,
    pub description: String,
    pub copyright: String,
    pub license: String,
    pub url: String,

    /// Regular expression restricting the host platforms this plugin runs on
    pub platform: Option<String>,

    /// Command-line arguments the plugin understands
    pub arguments: Vec<ArgumentDescription>,

    /// Plugin dependencies
    pub dependencies: Vec<PluginDependency>,

    /// Required plugins can not be disabled
    pub required: bool,
    pub experimental: bool,
    pub deprecated: bool,
    pub disabled_by_default: bool,

    /// Can be loaded after startup without restarting the host
    pub soft_loadable: bool,

    /// Shared library implementing the plugin, for native units
    pub library: Option<String>,

    /// Archive bundling the plugin, for archive units
    pub archive: Option<String>,

    /// Directory the manifest was read from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

// --- Intermediate structs for deserialization ---

#[derive(Deserialize, Debug)]
struct RawDependencyInfo {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawPluginManifest {
    name: String,
    version: String,
    #[serde(default)]
    compat_version: Option<String>,
    #[serde(default)]
    vendor: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    copyright: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    arguments: Vec<ArgumentDescription>,
    #[serde(default)]
    dependencies: Vec<RawDependencyInfo>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    experimental: bool,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    disabled_by_default: bool,
    #[serde(default)]
    soft_loadable: bool,
    #[serde(default)]
    library: Option<String>,
    #[serde(default)]
    archive: Option<String>,
}

// --- End Intermediate structs ---

impl PluginManifest {
    /// Create a new plugin manifest whose compat version equals its version
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            compat_version: version.to_string(),
            vendor: String::new(),
            category: String::new(),
            description: String::new(),
            copyright: String::new(),
            license: String::new(),
            url: String::new(),
            platform: None,
            arguments: Vec::new(),
            dependencies: Vec::new(),
            required: false,
            experimental: false,
            deprecated: false,
            disabled_by_default: false,
            soft_loadable: false,
            library: None,
            archive: None,
            base_dir: PathBuf::new(),
        }
    }

    /// Parses and validates a JSON manifest read from `path`.
    pub fn from_json_str(content: &str, path: &Path) -> Result<Self, PluginSystemError> {
        let raw: RawPluginManifest = serde_json::from_str(content).map_err(|e| PluginSystemError::ManifestError {
            path: path.to_path_buf(),
            message: format!("Failed to parse manifest JSON: {}", e),
            source: Some(Box::new(e)),
        })?;

        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for raw_dep in raw.dependencies {
            let kind = match raw_dep.kind.as_deref() {
                Some(text) => text.parse::<DependencyKind>().map_err(|e| manifest_error(path, e.to_string()))?,
                None => DependencyKind::Required,
            };
            dependencies.push(PluginDependency {
                name: raw_dep.name,
                version: raw_dep.version.unwrap_or_else(|| "0".to_string()),
                kind,
            });
        }

        let manifest = PluginManifest {
            compat_version: raw.compat_version.unwrap_or_else(|| raw.version.clone()),
            name: raw.name,
            version: raw.version,
            vendor: raw.vendor,
            category: raw.category,
            description: raw.description,
            copyright: raw.copyright,
            license: raw.license,
            url: raw.url,
            platform: raw.platform.filter(|p| !p.is_empty()),
            arguments: raw.arguments,
            dependencies,
            required: raw.required,
            experimental: raw.experimental,
            deprecated: raw.deprecated,
            disabled_by_default: raw.disabled_by_default,
            soft_loadable: raw.soft_loadable,
            library: raw.library,
            archive: raw.archive,
            base_dir: path.parent().unwrap_or_else(|| Path::new("")).to_path_buf(),
        };

        manifest.validate(path)?;
        Ok(manifest)
    }

    /// Checks the fields the resolver depends on.
    pub fn validate(&self, path: &Path) -> Result<(), PluginSystemError> {
        if self.name.trim().is_empty() {
            return Err(manifest_error(path, "Plugin name must not be empty".to_string()));
        }
        PluginVersion::parse(&self.version)
            .map_err(|e| manifest_error(path, format!("Invalid version of '{}': {}", self.name, e)))?;
        PluginVersion::parse(&self.compat_version)
            .map_err(|e| manifest_error(path, format!("Invalid compatVersion of '{}': {}", self.name, e)))?;
        for dep in &self.dependencies {
            if dep.name.trim().is_empty() {
                return Err(manifest_error(path, format!("Dependency of '{}' has an empty name", self.name)));
            }
            PluginVersion::parse(&dep.version).map_err(|e| {
                manifest_error(path, format!("Invalid version for dependency '{}' of '{}': {}", dep.name, self.name, e))
            })?;
        }
        if let Some(platform) = &self.platform {
            Regex::new(platform).map_err(|e| PluginSystemError::ManifestError {
                path: path.to_path_buf(),
                message: format!("Invalid platform specification '{}': {}", platform, e),
                source: Some(Box::new(e)),
            })?;
        }
        Ok(())
    }

    /// Add a dependency
    pub fn add_dependency(&mut self, dependency: PluginDependency) -> &mut Self {
        self.dependencies.push(dependency);
        self
    }

    /// Whether the plugin is off unless something turns it on
    pub fn is_disabled_by_default(&self) -> bool {
        self.disabled_by_default || self.experimental || self.deprecated
    }
}

fn manifest_error(path: &Path, message: String) -> PluginSystemError {
    PluginSystemError::ManifestError {
        path: path.to_path_buf(),
        message,
        source: None,
    }
}

/// Builder for creating a plugin manifest
pub struct ManifestBuilder {
    manifest: PluginManifest,
}

impl ManifestBuilder {
    /// Create a new manifest builder
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            manifest: PluginManifest::new(name, version),
        }
    }

    pub fn compat_version(mut self, compat_version: &str) -> Self {
        self.manifest.compat_version = compat_version.to_string();
        self
    }

    pub fn vendor(mut self, vendor: &str) -> Self {
        self.manifest.vendor = vendor.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.manifest.category = category.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.manifest.description = description.to_string();
        self
    }

    pub fn platform(mut self, platform: &str) -> Self {
        self.manifest.platform = Some(platform.to_string());
        self
    }

    pub fn argument(mut self, name: &str, parameter: &str, description: &str) -> Self {
        self.manifest.arguments.push(ArgumentDescription {
            name: name.to_string(),
            parameter: parameter.to_string(),
            description: description.to_string(),
        });
        self
    }

    /// Add a required dependency
    pub fn requires(mut self, name: &str, version: &str) -> Self {
        self.manifest.add_dependency(PluginDependency::required(name, version));
        self
    }

    /// Add an optional dependency
    pub fn optional(mut self, name: &str, version: &str) -> Self {
        self.manifest.add_dependency(PluginDependency::optional(name, version));
        self
    }

    /// Add a test dependency
    pub fn test_dependency(mut self, name: &str, version: &str) -> Self {
        self.manifest.add_dependency(PluginDependency::test(name, version));
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.manifest.required = required;
        self
    }

    pub fn experimental(mut self, experimental: bool) -> Self {
        self.manifest.experimental = experimental;
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.manifest.deprecated = deprecated;
        self
    }

    pub fn disabled_by_default(mut self, disabled: bool) -> Self {
        self.manifest.disabled_by_default = disabled;
        self
    }

    pub fn soft_loadable(mut self, soft_loadable: bool) -> Self {
        self.manifest.soft_loadable = soft_loadable;
        self
    }

    pub fn library(mut self, library: &str) -> Self {
        self.manifest.library = Some(library.to_string());
        self
    }

    /// Build the manifest
    pub fn build(self) -> PluginManifest {
        self.manifest
    }
}
