pub mod kernel;
pub mod mime;
pub mod plugin_system;
pub mod storage;

// Re-export key public types for the binary and embedders
pub use kernel::error::Error as KernelError;
pub use mime::{GlobPattern, GlobPatternDatabase, MimeGlobProvider};
pub use plugin_system::{Plugin, PluginManager, PluginManifest, PluginState};
pub use storage::EngineConfig;
