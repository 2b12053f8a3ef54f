use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use regex::Regex;

use crate::plugin_system::dependency::{DependencyError, DependencyKind, PluginDependency};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::state::PluginState;
use crate::plugin_system::version::version_compare;

/// Index of a unit in its registry's arena.
///
/// Resolved dependencies point at slots rather than holding references, so
/// a registry can be rebuilt without leaving dangling back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub(crate) usize);

impl UnitId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a unit's code reaches the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginKind {
    /// A shared library loaded by a native backend
    Native { library_path: PathBuf },
    /// A packaged archive unpacked by an archive backend
    Archive { archive_path: PathBuf, entry: String },
    /// Compiled into the host and registered in-process
    Static,
}

/// Tag of a [`PluginKind`], used to pick the backend that drives a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Native,
    Archive,
    Static,
}

impl PluginKind {
    pub fn backend_kind(&self) -> BackendKind {
        match self {
            PluginKind::Native { .. } => BackendKind::Native,
            PluginKind::Archive { .. } => BackendKind::Archive,
            PluginKind::Static => BackendKind::Static,
        }
    }

    /// Picks the kind a manifest describes: an archive wins over a library,
    /// and a manifest naming neither is a static unit.
    pub fn from_manifest(manifest: &PluginManifest) -> Self {
        if let Some(archive) = &manifest.archive {
            PluginKind::Archive {
                archive_path: manifest.base_dir.join(archive),
                entry: manifest.name.clone(),
            }
        } else if let Some(library) = &manifest.library {
            PluginKind::Native {
                library_path: manifest.base_dir.join(library),
            }
        } else {
            PluginKind::Static
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Native => f.write_str("native"),
            BackendKind::Archive => f.write_str("archive"),
            BackendKind::Static => f.write_str("static"),
        }
    }
}

/// The name/version view of a unit that dependency matching needs
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub id: UnitId,
    pub name: String,
    pub version: String,
    pub compat_version: String,
}

impl ProviderInfo {
    /// True if this provider satisfies `dependency`.
    ///
    /// Names compare ASCII case-insensitively. The provider's version must be
    /// at least the requested one, and its compat version must not be above it.
    pub fn provides(&self, dependency: &PluginDependency) -> bool {
        provides(&self.name, &self.version, &self.compat_version, &dependency.name, &dependency.version)
    }
}

fn provides(name: &str, version: &str, compat_version: &str, wanted_name: &str, wanted_version: &str) -> bool {
    if !name.eq_ignore_ascii_case(wanted_name) {
        return false;
    }
    let new_enough = matches!(
        version_compare(version, wanted_version),
        Some(Ordering::Greater | Ordering::Equal)
    );
    let compatible = matches!(
        version_compare(compat_version, wanted_version),
        Some(Ordering::Less | Ordering::Equal)
    );
    new_enough && compatible
}

/// Why a unit is blocked: the failed provider, and the unit that failed first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCause {
    pub provider: String,
    pub root: String,
    pub reason: String,
}

/// One loadable extension: its metadata plus lifecycle bookkeeping
#[derive(Debug, Clone)]
pub struct PluginUnit {
    manifest: PluginManifest,
    kind: PluginKind,
    state: PluginState,
    error: Option<String>,
    blocked_by: Option<String>,
    platform_regex: Option<Regex>,
    available_for_host: bool,
    enabled_by_settings: bool,
    enabled_indirectly: bool,
    force_enabled: bool,
    force_disabled: bool,
    dependency_specs: HashMap<PluginDependency, UnitId>,
}

impl PluginUnit {
    /// Creates a unit in the `Read` state from parsed metadata
    pub fn from_manifest(manifest: PluginManifest, kind: PluginKind) -> Self {
        let mut error = None;
        let platform_regex = match manifest.platform.as_deref() {
            Some(pattern) => match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    error = Some(format!("Invalid platform specification '{}': {}", pattern, e));
                    None
                }
            },
            None => None,
        };
        let state = if error.is_some() { PluginState::Invalid } else { PluginState::Read };
        let enabled_by_settings = !manifest.is_disabled_by_default();
        Self {
            manifest,
            kind,
            state,
            error,
            blocked_by: None,
            platform_regex,
            available_for_host: true,
            enabled_by_settings,
            enabled_indirectly: false,
            force_enabled: false,
            force_disabled: false,
            dependency_specs: HashMap::new(),
        }
    }

    /// Creates a unit whose metadata could not be read
    pub fn invalid(name: &str, error: impl Into<String>) -> Self {
        let mut unit = Self::from_manifest(PluginManifest::new(name, "0"), PluginKind::Static);
        unit.state = PluginState::Invalid;
        unit.error = Some(error.into());
        unit
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn compat_version(&self) -> &str {
        &self.manifest.compat_version
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    pub fn kind(&self) -> &PluginKind {
        &self.kind
    }

    pub fn dependencies(&self) -> &[PluginDependency] {
        &self.manifest.dependencies
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The recorded error, or an empty string
    pub fn error_string(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }

    /// Name of the failed provider that keeps this unit from proceeding
    pub fn blocked_by(&self) -> Option<&str> {
        self.blocked_by.as_deref()
    }

    /// Resolved providers of this unit's dependencies
    pub fn dependency_specs(&self) -> &HashMap<PluginDependency, UnitId> {
        &self.dependency_specs
    }

    /// Provider ids of the dependencies of the given kind, in declaration order
    pub fn providers_of_kind(&self, kind: DependencyKind) -> Vec<UnitId> {
        self.manifest
            .dependencies
            .iter()
            .filter(|dep| dep.kind == kind)
            .filter_map(|dep| self.dependency_specs.get(dep).copied())
            .collect()
    }

    /// `"name(version)"`, the form used in diagnostics
    pub fn display_name(&self) -> String {
        format!("{}({})", self.name(), self.version())
    }

    pub fn provider_info(&self, id: UnitId) -> ProviderInfo {
        ProviderInfo {
            id,
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
            compat_version: self.manifest.compat_version.clone(),
        }
    }

    /// True if this unit satisfies `dependency` by the name and version rule
    pub fn provides(&self, dependency: &PluginDependency) -> bool {
        provides(self.name(), self.version(), self.compat_version(), &dependency.name, &dependency.version)
    }

    // --- Flags ---

    pub fn is_required(&self) -> bool {
        self.manifest.required
    }

    pub fn is_experimental(&self) -> bool {
        self.manifest.experimental
    }

    pub fn is_deprecated(&self) -> bool {
        self.manifest.deprecated
    }

    pub fn is_soft_loadable(&self) -> bool {
        self.manifest.soft_loadable
    }

    pub fn is_enabled_by_default(&self) -> bool {
        !self.manifest.is_disabled_by_default()
    }

    pub fn is_enabled_by_settings(&self) -> bool {
        self.enabled_by_settings
    }

    pub fn is_enabled_indirectly(&self) -> bool {
        self.enabled_indirectly
    }

    pub fn is_force_enabled(&self) -> bool {
        self.force_enabled
    }

    pub fn is_force_disabled(&self) -> bool {
        self.force_disabled
    }

    pub fn is_available_for_host_platform(&self) -> bool {
        self.available_for_host
    }

    /// Whether the unit takes part in loading
    pub fn is_effectively_enabled(&self) -> bool {
        if !self.available_for_host {
            return false;
        }
        if self.force_enabled || self.enabled_indirectly {
            return true;
        }
        if self.force_disabled {
            return false;
        }
        self.enabled_by_settings
    }

    /// Matches the platform specification against `host`; units without one run everywhere
    pub fn set_host_platform(&mut self, host: &str) {
        self.available_for_host = self
            .platform_regex
            .as_ref()
            .map(|regex| regex.is_match(host))
            .unwrap_or(true);
    }

    pub fn set_enabled_by_settings(&mut self, enabled: bool) {
        if !enabled && self.is_required() {
            log::warn!("Ignoring request to disable required plugin '{}'", self.name());
            return;
        }
        self.enabled_by_settings = enabled;
    }

    pub fn set_force_enabled(&mut self, enabled: bool) {
        self.force_enabled = enabled;
        if enabled {
            self.force_disabled = false;
        }
    }

    pub fn set_force_disabled(&mut self, disabled: bool) {
        if disabled && self.is_required() {
            log::warn!("Ignoring request to force-disable required plugin '{}'", self.name());
            return;
        }
        self.force_disabled = disabled;
        if disabled {
            self.force_enabled = false;
        }
    }

    pub(crate) fn set_enabled_indirectly(&mut self, enabled: bool) {
        self.enabled_indirectly = enabled;
    }

    // --- Resolution ---

    /// Maps each declared dependency to the first provider that satisfies it.
    ///
    /// A missing Required provider records an error naming every dependency
    /// that could not be found; Optional and Test dependencies are simply left
    /// out of the mapping. The state is not promoted here: the registry moves
    /// the unit to `Resolved` once its providers are known to be resolvable.
    pub fn resolve_dependencies(&mut self, providers: &[ProviderInfo]) -> bool {
        if self.has_error() {
            return false;
        }
        if self.state != PluginState::Read && self.state != PluginState::Resolved {
            self.error = Some("Resolving dependencies failed because state != Read".to_string());
            return false;
        }

        let mut resolved = HashMap::new();
        let mut missing = Vec::new();
        for dependency in &self.manifest.dependencies {
            match providers.iter().find(|p| p.provides(dependency)) {
                Some(provider) => {
                    resolved.insert(dependency.clone(), provider.id);
                }
                None if dependency.is_required() => {
                    missing.push(describe_missing(dependency, providers));
                }
                None => {
                    log::debug!("Optional dependency {} of '{}' is not available", dependency, self.name());
                }
            }
        }

        if !missing.is_empty() {
            let message = missing.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
            log::warn!("Plugin '{}' has unresolved dependencies: {}", self.name(), message);
            self.error = Some(message);
            return false;
        }

        self.dependency_specs = resolved;
        true
    }

    /// Providers that must be switched on because this unit is on.
    ///
    /// Follows Required edges, and Test edges when `enable_test_dependencies` is set.
    pub fn dependencies_to_enable(&self, enable_test_dependencies: bool) -> Vec<UnitId> {
        if !self.is_effectively_enabled() {
            return Vec::new();
        }
        self.manifest
            .dependencies
            .iter()
            .filter(|dep| match dep.kind {
                DependencyKind::Required => true,
                DependencyKind::Test => enable_test_dependencies,
                DependencyKind::Optional => false,
            })
            .filter_map(|dep| self.dependency_specs.get(dep).copied())
            .collect()
    }

    // --- Lifecycle ---

    /// Moves the unit to `target`, which must be the next state (or `Deleted`).
    pub fn advance_to(&mut self, target: PluginState) -> Result<(), PluginSystemError> {
        if self.has_error() && target != PluginState::Deleted {
            return Err(PluginSystemError::InvalidTransition {
                plugin_id: self.name().to_string(),
                from: self.state,
                to: target,
            });
        }
        if !self.state.can_transition_to(target) {
            return Err(PluginSystemError::InvalidTransition {
                plugin_id: self.name().to_string(),
                from: self.state,
                to: target,
            });
        }
        log::debug!("Plugin '{}': {} -> {}", self.name(), self.state, target);
        self.state = target;
        Ok(())
    }

    /// Records a failure; the state stays where it is
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("Plugin '{}' failed in state '{}': {}", self.name(), self.state, message);
        self.error = Some(message);
    }

    /// What a dependent needs to know to report this unit as its root cause
    pub fn block_cause(&self) -> BlockCause {
        let reason = if self.has_error() {
            self.error_string().to_string()
        } else if !self.available_for_host {
            "Not available on this platform".to_string()
        } else if !self.is_effectively_enabled() {
            "Disabled".to_string()
        } else {
            String::new()
        };
        BlockCause {
            provider: self.display_name(),
            root: self.blocked_by().unwrap_or(self.name()).to_string(),
            reason,
        }
    }

    /// Records that a provider failed and this unit cannot proceed
    pub fn block(&mut self, cause: BlockCause) {
        let error = DependencyError::BlockedBy {
            provider: cause.provider,
            reason: cause.reason,
        };
        self.fail(error.to_string());
        self.blocked_by = Some(cause.root);
    }

    /// Tears the unit down; reachable from any state
    pub fn kill(&mut self) {
        if self.state != PluginState::Deleted {
            log::debug!("Plugin '{}': {} -> {}", self.name(), self.state, PluginState::Deleted);
        }
        self.state = PluginState::Deleted;
    }
}

fn describe_missing(dependency: &PluginDependency, providers: &[ProviderInfo]) -> DependencyError {
    match providers.iter().find(|p| p.name.eq_ignore_ascii_case(&dependency.name)) {
        Some(candidate) => DependencyError::IncompatibleVersion {
            name: dependency.name.clone(),
            required: dependency.version.clone(),
            actual: candidate.version.clone(),
            compat: candidate.compat_version.clone(),
        },
        None => DependencyError::MissingPlugin {
            name: dependency.name.clone(),
            version: dependency.version.clone(),
        },
    }
}
