/// Application name
pub const APP_NAME: &str = "Plexus";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension of plugin manifests discovered on disk
pub const MANIFEST_EXTENSION: &str = "json";

/// Keyword accepted by the force-enable/force-disable lists to address every unit
pub const ALL_PLUGINS_KEYWORD: &str = "all";

/// Weight given to glob rules that do not declare one
pub const DEFAULT_GLOB_WEIGHT: u8 = 50;

/// Highest weight a glob rule may carry
pub const MAX_GLOB_WEIGHT: u8 = 100;
