use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strength of a dependency edge between two units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// The dependent cannot run without the provider
    #[default]
    Required,
    /// The provider is used when present
    Optional,
    /// The provider is only force-loaded while the dependent is under test
    Test,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Required => "required",
            DependencyKind::Optional => "optional",
            DependencyKind::Test => "test",
        }
    }
}

impl FromStr for DependencyKind {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "required" => Ok(DependencyKind::Required),
            "optional" => Ok(DependencyKind::Optional),
            "test" => Ok(DependencyKind::Test),
            other => Err(DependencyError::Other(format!("Unknown dependency type '{}'", other))),
        }
    }
}

/// Represents a dependency on another plugin.
///
/// Equality and hashing are structural over name, version text and kind, so
/// the same dependency declared twice maps to a single resolved provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginDependency {
    /// The name of the required plugin
    pub name: String,

    /// Lowest version of the provider that satisfies this dependency
    pub version: String,

    /// Whether this is a hard requirement, an optional or a test dependency
    #[serde(rename = "type", default)]
    pub kind: DependencyKind,
}

/// Error that can occur when resolving dependencies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// No known unit provides the required dependency
    #[error("Could not resolve dependency '{name}({version})'")]
    MissingPlugin { name: String, version: String },

    /// A unit with the right name exists, but its version range does not cover the request
    #[error("Could not resolve dependency '{name}({required})': found version '{actual}' compatible down to '{compat}'")]
    IncompatibleVersion {
        name: String,
        required: String,
        actual: String,
        compat: String,
    },

    /// Dependency cycle detected; lists the participants in walk order, ending with the re-entered unit
    #[error("Circular dependency detected:\n{}", .0.join(" depends on\n"))]
    CyclicDependency(Vec<String>),

    /// A provider this unit needs failed, so this unit cannot proceed
    #[error("Cannot load plugin because dependency failed to load: {provider}\nReason: {reason}")]
    BlockedBy { provider: String, reason: String },

    /// Other dependency resolution error
    #[error("Dependency error: {0}")]
    Other(String),
}

impl PluginDependency {
    /// Create a new required dependency
    pub fn required(name: &str, version: &str) -> Self {
        Self::new(name, version, DependencyKind::Required)
    }

    /// Create a new optional dependency
    pub fn optional(name: &str, version: &str) -> Self {
        Self::new(name, version, DependencyKind::Optional)
    }

    /// Create a new test dependency
    pub fn test(name: &str, version: &str) -> Self {
        Self::new(name, version, DependencyKind::Test)
    }

    pub fn new(name: &str, version: &str, kind: DependencyKind) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            kind,
        }
    }

    pub fn is_required(&self) -> bool {
        self.kind == DependencyKind::Required
    }
}

impl fmt::Display for PluginDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DependencyKind::Required => write!(f, "{}({})", self.name, self.version),
            kind => write!(f, "{}({}, {})", self.name, self.version, kind.as_str()),
        }
    }
}
