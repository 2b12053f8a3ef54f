use crate::plugin_system::unit::PluginUnit;

/// How a unit answered the request to shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownFlag {
    /// The unit finished shutting down inside the call
    Synchronous,
    /// The unit reports completion later through `PluginManager::asynchronous_shutdown_finished`
    Asynchronous,
}

/// Core trait that in-process plugins implement.
///
/// Static units are driven through this trait by
/// [`StaticBackend`](crate::plugin_system::backend::StaticBackend).
pub trait Plugin: Send {
    /// Called once every Required provider is initialized
    fn initialize(&mut self, arguments: &[String]) -> Result<(), String>;

    /// Called in reverse load order once every unit is initialized
    fn extensions_initialized(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Deferred work after startup. Returns true if it did anything noticeable.
    fn delayed_initialize(&mut self) -> bool {
        false
    }

    /// Called in reverse load order when the host shuts down
    fn about_to_shutdown(&mut self) -> ShutdownFlag {
        ShutdownFlag::Synchronous
    }
}

/// Capability that moves units of one [`BackendKind`](crate::plugin_system::unit::BackendKind)
/// through their lifecycle.
///
/// The manager calls these in load-queue order and owns all state
/// bookkeeping; a backend only performs the step and reports failure as a
/// message, which the manager records on the unit.
pub trait PluginBackend: Send {
    /// Makes the unit's code available (e.g. opens a shared library)
    fn load_library(&mut self, unit: &PluginUnit) -> Result<(), String>;

    /// Runs the unit's own initialization
    fn initialize_plugin(&mut self, unit: &PluginUnit, arguments: &[String]) -> Result<(), String>;

    /// Runs the unit's extension hook once all units are initialized
    fn initialize_extensions(&mut self, unit: &PluginUnit) -> Result<(), String>;

    /// Runs deferred startup work
    fn delayed_initialize(&mut self, unit: &PluginUnit) -> bool;

    /// Asks the unit to stop
    fn about_to_shutdown(&mut self, unit: &PluginUnit) -> ShutdownFlag;

    /// Releases everything the backend holds for the unit
    fn kill(&mut self, unit: &PluginUnit);
}
