//! # Plexus Core Plugin System Errors
//!
//! Defines error types specific to the Plexus Plugin System.
//!
//! [`PluginSystemError`] covers failures that are returned to a caller:
//! manifest parsing and discovery, unknown plugins, illegal state
//! transitions and backend lookup. Failures that belong to a single unit
//! (missing providers, cycles, a backend step that reported an error) are
//! recorded on the unit instead and surface through
//! `PluginUnit::error_string`.
use std::path::PathBuf;

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::state::PluginState;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin manifest error for '{path}': {message}")]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin '{plugin_id}' cannot move from state '{from}' to '{to}'")]
    InvalidTransition {
        plugin_id: String,
        from: PluginState,
        to: PluginState,
    },

    #[error("No backend registered for plugin kind '{kind}' (plugin '{plugin_id}')")]
    MissingBackend {
        plugin_id: String,
        kind: String,
    },

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),

    #[error("Manifest discovery failed for '{path}': {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
