use std::collections::{HashMap, HashSet};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::resolver;
use crate::plugin_system::state::PluginState;
use crate::plugin_system::unit::{PluginKind, PluginUnit, UnitId};

/// Registry owning every known plugin unit.
///
/// Units live in an arena and refer to each other by [`UnitId`]. Several
/// units may share a name; lookups by name return the first registered one,
/// and dependency matching takes the first unit (in registration order) that
/// satisfies a dependency.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    units: Vec<PluginUnit>,
    /// Lowercased name -> first unit registered under it
    by_name: HashMap<String, UnitId>,
    /// Load order computed by the last call to `resolve`
    load_queue: Vec<UnitId>,
    /// Units whose Test dependencies are enabled
    test_plugins: HashSet<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit built from a manifest
    pub fn register_manifest(&mut self, manifest: PluginManifest, kind: PluginKind) -> UnitId {
        self.register_unit(PluginUnit::from_manifest(manifest, kind))
    }

    /// Register a unit
    pub fn register_unit(&mut self, unit: PluginUnit) -> UnitId {
        let id = UnitId(self.units.len());
        let key = unit.name().to_ascii_lowercase();
        if self.by_name.contains_key(&key) {
            log::warn!(
                "Plugin '{}' is registered more than once; dependencies resolve to the first registration",
                unit.name()
            );
        } else {
            self.by_name.insert(key, id);
        }
        self.units.push(unit);
        self.load_queue.clear();
        id
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_ascii_lowercase())
    }

    pub fn id_of(&self, name: &str) -> Option<UnitId> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn get(&self, id: UnitId) -> Option<&PluginUnit> {
        self.units.get(id.0)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut PluginUnit> {
        self.units.get_mut(id.0)
    }

    pub fn get_plugin(&self, name: &str) -> Option<&PluginUnit> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn get_plugin_mut(&mut self, name: &str) -> Option<&mut PluginUnit> {
        let id = self.id_of(name)?;
        self.get_mut(id)
    }

    pub(crate) fn unit_mut(&mut self, name: &str) -> Result<&mut PluginUnit, PluginSystemError> {
        self.get_plugin_mut(name)
            .ok_or_else(|| PluginSystemError::PluginNotFound(name.to_string()))
    }

    pub fn units(&self) -> &[PluginUnit] {
        &self.units
    }

    pub(crate) fn units_mut(&mut self) -> &mut [PluginUnit] {
        &mut self.units
    }

    pub fn iter_plugins(&self) -> impl Iterator<Item = (UnitId, &PluginUnit)> {
        self.units.iter().enumerate().map(|(i, unit)| (UnitId(i), unit))
    }

    pub fn get_plugin_ids(&self) -> Vec<String> {
        self.units.iter().map(|u| u.name().to_string()).collect()
    }

    pub fn plugin_count(&self) -> usize {
        self.units.len()
    }

    pub fn set_test_plugins<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_plugins = names.into_iter().map(Into::into).collect();
    }

    /// Matches every unit's platform specification against `host`
    pub fn set_host_platform(&mut self, host: &str) {
        for unit in &mut self.units {
            unit.set_host_platform(host);
        }
    }

    /// Enable a plugin (settings level)
    pub fn enable_plugin(&mut self, name: &str) -> Result<(), PluginSystemError> {
        self.unit_mut(name)?.set_enabled_by_settings(true);
        Ok(())
    }

    /// Disable a plugin (settings level); required plugins stay enabled
    pub fn disable_plugin(&mut self, name: &str) -> Result<(), PluginSystemError> {
        self.unit_mut(name)?.set_enabled_by_settings(false);
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.get_plugin(name).is_some_and(|u| u.is_effectively_enabled())
    }

    /// Resolves every unit's dependencies, computes the load queue and
    /// switches on the providers enabled units need.
    ///
    /// Returns the units that were enabled indirectly.
    pub fn resolve(&mut self) -> Vec<UnitId> {
        self.load_queue = resolver::resolve_all(&mut self.units);
        let order: Vec<String> = self.load_queue.iter().map(|id| self.units[id.0].name().to_string()).collect();
        log::info!("Plugin load order: {:?}", order);
        self.enable_dependencies_indirectly()
    }

    /// Recomputes indirect enablement from the current flags
    pub fn enable_dependencies_indirectly(&mut self) -> Vec<UnitId> {
        resolver::enable_dependencies_indirectly(&mut self.units, &self.test_plugins)
    }

    /// Rebuilds the load queue without re-resolving dependencies
    pub fn rebuild_load_queue(&mut self) -> &[UnitId] {
        self.load_queue = resolver::build_load_queue(&mut self.units);
        &self.load_queue
    }

    /// Load order computed by the last `resolve`, providers first
    pub fn load_queue(&self) -> &[UnitId] {
        &self.load_queue
    }

    /// Transitive Required providers of `name`
    pub fn plugins_required_by(&self, name: &str) -> Result<Vec<&PluginUnit>, PluginSystemError> {
        let id = self.id_of(name).ok_or_else(|| PluginSystemError::PluginNotFound(name.to_string()))?;
        Ok(resolver::required_by(&self.units, id).into_iter().map(|i| &self.units[i.0]).collect())
    }

    /// Transitive Required dependents of `name`
    pub fn plugins_requiring(&self, name: &str) -> Result<Vec<&PluginUnit>, PluginSystemError> {
        let id = self.id_of(name).ok_or_else(|| PluginSystemError::PluginNotFound(name.to_string()))?;
        Ok(resolver::requiring(&self.units, id).into_iter().map(|i| &self.units[i.0]).collect())
    }

    pub fn has_errors(&self) -> bool {
        self.units.iter().any(|u| u.has_error())
    }

    pub fn count_in_state(&self, state: PluginState) -> usize {
        self.units.iter().filter(|u| u.state() == state).count()
    }

    /// Drops every unit
    pub fn clear(&mut self) {
        self.units.clear();
        self.by_name.clear();
        self.load_queue.clear();
    }
}
