use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use crate::plugin_system::dependency::DependencyKind;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::ManifestSource;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::resolver;
use crate::plugin_system::state::PluginState;
use crate::plugin_system::traits::{PluginBackend, ShutdownFlag};
use crate::plugin_system::unit::{BackendKind, PluginKind, PluginUnit, UnitId};
use crate::storage::config::EngineConfig;

/// Outcome of [`PluginManager::load_plugins`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Units that reached `Running`, in load order
    pub running: Vec<String>,
    /// Units that are in error, with their error string
    pub failed: Vec<(String, String)>,
    /// Units that were not loaded because they are disabled
    pub disabled: Vec<String>,
}

/// Orchestrates resolution and the lifecycle of every known unit.
///
/// The manager is an explicit context object: it owns the registry, the
/// backends and the configuration, and nothing in the plugin system reaches
/// for process-wide state.
pub struct PluginManager {
    registry: PluginRegistry,
    backends: HashMap<BackendKind, Box<dyn PluginBackend>>,
    config: EngineConfig,
    delayed_initialize_queue: VecDeque<UnitId>,
    pending_async_shutdown: HashSet<UnitId>,
    shutdown_requested: bool,
}

impl PluginManager {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: PluginRegistry::new(),
            backends: HashMap::new(),
            config,
            delayed_initialize_queue: VecDeque::new(),
            pending_async_shutdown: HashSet::new(),
            shutdown_requested: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Get reference to the plugin registry
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    /// Installs the backend that drives units of `kind`, replacing any previous one
    pub fn register_backend(&mut self, kind: BackendKind, backend: Box<dyn PluginBackend>) {
        self.backends.insert(kind, backend);
    }

    pub fn has_backend(&self, kind: BackendKind) -> bool {
        self.backends.contains_key(&kind)
    }

    /// Adds a unit described by `manifest`; its kind follows the manifest's locator
    pub fn add_manifest(&mut self, manifest: PluginManifest) -> UnitId {
        let kind = PluginKind::from_manifest(&manifest);
        self.registry.register_manifest(manifest, kind)
    }

    pub fn add_unit(&mut self, unit: PluginUnit) -> UnitId {
        self.registry.register_unit(unit)
    }

    /// Adds every unit a manifest source yields. Returns how many were added.
    pub async fn load_manifests(&mut self, source: &dyn ManifestSource) -> Result<usize, PluginSystemError> {
        let units = source.discover().await?;
        let count = units.len();
        for unit in units {
            self.registry.register_unit(unit);
        }
        log::info!("Discovered {} plugin(s) from {}", count, source.describe());
        Ok(count)
    }

    /// Pushes the configured flags onto the units
    fn apply_config(&mut self) {
        let host = self.config.host_platform();
        self.registry.set_host_platform(&host);
        self.registry.set_test_plugins(self.config.test_plugins.iter().cloned());

        for unit in self.registry.units_mut() {
            let name = unit.name().to_string();
            if self.config.enabled_plugins.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                unit.set_enabled_by_settings(true);
            }
            if self.config.disabled_plugins.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                unit.set_enabled_by_settings(false);
            }
            if self.config.is_force_enabled(&name) {
                unit.set_force_enabled(true);
            } else if self.config.is_force_disabled(&name) {
                unit.set_force_disabled(true);
            }
        }
    }

    /// Applies the configuration, resolves all units and returns the
    /// units that were switched on because an enabled unit needs them.
    pub fn resolve(&mut self) -> Vec<String> {
        self.apply_config();
        let enabled = self.registry.resolve();
        enabled
            .into_iter()
            .filter_map(|id| self.registry.get(id).map(|u| u.name().to_string()))
            .collect()
    }

    /// Drives every enabled unit to `Running`.
    ///
    /// Loaded and Initialized run in load order, Running (extension hooks)
    /// runs in reverse load order. Units that got loaded but did not reach
    /// Running are killed. Resolves first if that has not happened yet.
    pub fn load_plugins(&mut self) -> LoadReport {
        if self.registry.load_queue().len() != self.registry.plugin_count() {
            self.resolve();
        }
        let queue: Vec<UnitId> = self.registry.load_queue().to_vec();

        for id in &queue {
            self.load_plugin(*id, PluginState::Loaded);
        }
        for id in &queue {
            self.load_plugin(*id, PluginState::Initialized);
        }
        for id in queue.iter().rev() {
            self.load_plugin(*id, PluginState::Running);
            let unit = &self.registry.units()[id.index()];
            if unit.state() == PluginState::Running && !unit.has_error() {
                self.delayed_initialize_queue.push_back(*id);
            } else if unit.state() >= PluginState::Loaded && unit.state() < PluginState::Deleted {
                self.kill_unit(*id);
            }
        }

        let mut report = LoadReport::default();
        for id in &queue {
            let unit = &self.registry.units()[id.index()];
            if unit.has_error() {
                report.failed.push((unit.name().to_string(), unit.error_string().to_string()));
            } else if unit.state() == PluginState::Running {
                report.running.push(unit.name().to_string());
            } else if !unit.is_effectively_enabled() {
                report.disabled.push(unit.name().to_string());
            }
        }
        log::info!(
            "Plugins loaded: {} running, {} failed, {} disabled",
            report.running.len(),
            report.failed.len(),
            report.disabled.len()
        );
        report
    }

    /// Moves one unit to `dest` if it is exactly one step before it
    fn load_plugin(&mut self, id: UnitId, dest: PluginState) {
        let unit = &self.registry.units()[id.index()];
        if unit.has_error() || unit.state().next() != Some(dest) {
            return;
        }
        if dest == PluginState::Loaded && !unit.is_effectively_enabled() {
            return;
        }

        if matches!(dest, PluginState::Loaded | PluginState::Initialized) {
            // Every Required provider must already have reached `dest`.
            let lagging = unit
                .providers_of_kind(DependencyKind::Required)
                .into_iter()
                .find(|p| self.registry.units()[p.index()].state() != dest);
            if let Some(provider) = lagging {
                let cause = self.registry.units()[provider.index()].block_cause();
                self.registry.units_mut()[id.index()].block(cause);
                return;
            }
        }

        let kind = unit.kind().backend_kind();
        let Some(backend) = self.backends.get_mut(&kind) else {
            let error = PluginSystemError::MissingBackend {
                plugin_id: unit.name().to_string(),
                kind: kind.to_string(),
            };
            self.fail_unit(id, error.to_string());
            return;
        };

        let unit = &self.registry.units()[id.index()];
        let outcome = match dest {
            PluginState::Loaded => backend.load_library(unit),
            PluginState::Initialized => backend.initialize_plugin(unit, self.config.arguments_for(unit.name())),
            PluginState::Running => backend.initialize_extensions(unit),
            _ => Err(format!("Unexpected load target '{}'", dest)),
        };

        match outcome {
            Ok(()) => self.advance(id, dest),
            Err(message) => self.fail_unit(id, message),
        }
    }

    fn advance(&mut self, id: UnitId, dest: PluginState) {
        if let Err(e) = self.registry.units_mut()[id.index()].advance_to(dest) {
            log::error!("{}", e);
        }
    }

    /// Records a failure on `id` and blocks everything that requires it
    fn fail_unit(&mut self, id: UnitId, message: String) {
        self.registry.units_mut()[id.index()].fail(message);
        let cause = self.registry.units()[id.index()].block_cause();
        for dependent in resolver::requiring(self.registry.units(), id) {
            let unit = &mut self.registry.units_mut()[dependent.index()];
            if !unit.has_error() {
                unit.block(cause.clone());
            }
        }
    }

    fn kill_unit(&mut self, id: UnitId) {
        let unit = &self.registry.units()[id.index()];
        if let Some(backend) = self.backends.get_mut(&unit.kind().backend_kind()) {
            backend.kill(unit);
        }
        self.registry.units_mut()[id.index()].kill();
    }

    /// Runs the deferred initialization of every running unit, in the order
    /// the units reached `Running`.
    ///
    /// Returns how many units reported doing work.
    pub fn run_delayed_initialize(&mut self) -> usize {
        let mut busy = 0;
        while let Some(id) = self.delayed_initialize_queue.pop_front() {
            let unit = &self.registry.units()[id.index()];
            if unit.state() != PluginState::Running {
                continue;
            }
            if let Some(backend) = self.backends.get_mut(&unit.kind().backend_kind()) {
                if backend.delayed_initialize(unit) {
                    busy += 1;
                }
            }
        }
        busy
    }

    pub fn pending_delayed_initialize(&self) -> usize {
        self.delayed_initialize_queue.len()
    }

    /// Stops every running unit in reverse load order, then deletes them.
    ///
    /// Units that answer [`ShutdownFlag::Asynchronous`] postpone the delete
    /// pass until each has called [`asynchronous_shutdown_finished`](Self::asynchronous_shutdown_finished).
    /// Returns true if shutdown completed synchronously.
    pub fn shutdown(&mut self) -> bool {
        self.shutdown_requested = true;
        self.delayed_initialize_queue.clear();
        let queue: Vec<UnitId> = self.registry.load_queue().to_vec();

        for id in queue.iter().rev() {
            let unit = &self.registry.units()[id.index()];
            if unit.has_error() || unit.state() != PluginState::Running {
                continue;
            }
            let flag = match self.backends.get_mut(&unit.kind().backend_kind()) {
                Some(backend) => backend.about_to_shutdown(unit),
                None => ShutdownFlag::Synchronous,
            };
            self.advance(*id, PluginState::Stopped);
            if flag == ShutdownFlag::Asynchronous {
                log::debug!("Plugin '{}' shuts down asynchronously", self.registry.units()[id.index()].name());
                self.pending_async_shutdown.insert(*id);
            }
        }

        if self.pending_async_shutdown.is_empty() {
            self.delete_all();
            true
        } else {
            false
        }
    }

    /// Reports that the asynchronous shutdown of `name` finished.
    pub fn asynchronous_shutdown_finished(&mut self, name: &str) -> Result<(), PluginSystemError> {
        let id = self
            .registry
            .id_of(name)
            .ok_or_else(|| PluginSystemError::PluginNotFound(name.to_string()))?;
        self.pending_async_shutdown.remove(&id);
        if self.shutdown_requested && self.pending_async_shutdown.is_empty() {
            self.delete_all();
        }
        Ok(())
    }

    pub fn is_shutdown_pending(&self) -> bool {
        !self.pending_async_shutdown.is_empty()
    }

    fn delete_all(&mut self) {
        let queue: Vec<UnitId> = self.registry.load_queue().to_vec();
        for id in queue.iter().rev() {
            let state = self.registry.units()[id.index()].state();
            if state >= PluginState::Loaded && state < PluginState::Deleted {
                self.kill_unit(*id);
            }
        }
        self.shutdown_requested = false;
    }

    // --- Queries ---

    pub fn unit(&self, name: &str) -> Option<&PluginUnit> {
        self.registry.get_plugin(name)
    }

    pub fn units(&self) -> &[PluginUnit] {
        self.registry.units()
    }

    /// Unit names in load order
    pub fn load_queue(&self) -> Vec<&str> {
        self.registry
            .load_queue()
            .iter()
            .filter_map(|id| self.registry.get(*id).map(|u| u.name()))
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.registry.has_errors()
    }

    /// Every unit that will not run, with the reason to show for it
    pub fn disabled_with_reasons(&self) -> Vec<(String, String)> {
        self.registry
            .units()
            .iter()
            .filter_map(|unit| {
                let reason = if unit.has_error() {
                    unit.error_string().to_string()
                } else if !unit.is_available_for_host_platform() {
                    "Not available on this platform".to_string()
                } else if !unit.is_effectively_enabled() {
                    "Disabled".to_string()
                } else {
                    return None;
                };
                Some((unit.name().to_string(), reason))
            })
            .collect()
    }

    pub fn plugins_required_by(&self, name: &str) -> Result<Vec<String>, PluginSystemError> {
        Ok(self
            .registry
            .plugins_required_by(name)?
            .into_iter()
            .map(|u| u.name().to_string())
            .collect())
    }

    pub fn plugins_requiring(&self, name: &str) -> Result<Vec<String>, PluginSystemError> {
        Ok(self
            .registry
            .plugins_requiring(name)?
            .into_iter()
            .map(|u| u.name().to_string())
            .collect())
    }
}

impl Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("registry", &self.registry)
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
