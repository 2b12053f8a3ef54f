//! # Plexus Plugin System
//!
//! Discovers plugin metadata, resolves the dependencies between plugin
//! units, orders them providers-first and drives each unit through its
//! lifecycle (`Read` → `Resolved` → `Loaded` → `Initialized` → `Running` →
//! `Stopped` → `Deleted`).
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`version`]**: The dotted version grammar and its ordering.
//! - **[`dependency`]**: Dependency declarations ([`PluginDependency`]) and the
//!   errors resolution can report.
//! - **[`manifest`]**: Plugin metadata ([`PluginManifest`]) as read from JSON or
//!   assembled with [`ManifestBuilder`](manifest::ManifestBuilder).
//! - **[`unit`]**: A single plugin unit ([`PluginUnit`]): metadata, enablement
//!   flags, resolved providers and lifecycle state.
//! - **[`resolver`]**: Graph walks over the unit arena: load ordering, cycle
//!   detection, indirect enablement.
//! - **[`registry`]**: The unit arena ([`PluginRegistry`]).
//! - **[`traits`]**: The [`Plugin`] and [`PluginBackend`] seams.
//! - **[`backend`]**: [`StaticBackend`], for units compiled into the host.
//! - **[`loader`]**: Manifest discovery ([`ManifestSource`]).
//! - **[`manager`]**: The orchestrator ([`PluginManager`]).
//! - **[`error`]**: [`PluginSystemError`].
pub mod backend;
pub mod dependency;
pub mod error;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod traits;
pub mod unit;
pub mod version;

pub use backend::StaticBackend;
pub use dependency::{DependencyError, DependencyKind, PluginDependency};
pub use error::PluginSystemError;
pub use loader::{DirectoryManifestSource, ManifestSource};
pub use manager::{LoadReport, PluginManager};
pub use manifest::PluginManifest;
pub use registry::PluginRegistry;
pub use state::PluginState;
pub use traits::{Plugin, PluginBackend, ShutdownFlag};
pub use unit::{BackendKind, PluginKind, PluginUnit, UnitId};
pub use version::{PluginVersion, VersionError, version_compare};

#[cfg(test)]
mod tests;
