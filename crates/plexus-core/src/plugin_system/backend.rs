use std::collections::HashMap;

use crate::plugin_system::traits::{Plugin, PluginBackend, ShutdownFlag};
use crate::plugin_system::unit::PluginUnit;

type PluginFactory = Box<dyn Fn() -> Box<dyn Plugin> + Send>;

/// Backend for units compiled into the host.
///
/// Factories are registered by unit name; `load_library` instantiates the
/// plugin object and `kill` drops it.
#[derive(Default)]
pub struct StaticBackend {
    factories: HashMap<String, PluginFactory>,
    instances: HashMap<String, Box<dyn Plugin>>,
}

impl StaticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for the unit called `name`
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Plugin> + Send + 'static,
    {
        self.factories.insert(name.to_ascii_lowercase(), Box::new(factory));
    }

    fn instance(&mut self, unit: &PluginUnit) -> Result<&mut Box<dyn Plugin>, String> {
        self.instances
            .get_mut(&unit.name().to_ascii_lowercase())
            .ok_or_else(|| format!("Plugin '{}' has no instance; it was never loaded", unit.name()))
    }
}

impl std::fmt::Debug for StaticBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticBackend")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("instances", &self.instances.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginBackend for StaticBackend {
    fn load_library(&mut self, unit: &PluginUnit) -> Result<(), String> {
        let key = unit.name().to_ascii_lowercase();
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| format!("No static plugin registered under the name '{}'", unit.name()))?;
        self.instances.insert(key, factory());
        Ok(())
    }

    fn initialize_plugin(&mut self, unit: &PluginUnit, arguments: &[String]) -> Result<(), String> {
        self.instance(unit)?.initialize(arguments)
    }

    fn initialize_extensions(&mut self, unit: &PluginUnit) -> Result<(), String> {
        self.instance(unit)?.extensions_initialized()
    }

    fn delayed_initialize(&mut self, unit: &PluginUnit) -> bool {
        self.instance(unit).map(|p| p.delayed_initialize()).unwrap_or(false)
    }

    fn about_to_shutdown(&mut self, unit: &PluginUnit) -> ShutdownFlag {
        self.instance(unit)
            .map(|p| p.about_to_shutdown())
            .unwrap_or(ShutdownFlag::Synchronous)
    }

    fn kill(&mut self, unit: &PluginUnit) {
        self.instances.remove(&unit.name().to_ascii_lowercase());
    }
}
