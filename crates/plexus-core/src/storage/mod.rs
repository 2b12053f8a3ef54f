//! # Plexus Core Storage
//!
//! Reads engine configuration from JSON, YAML or TOML files. The format is
//! picked from the file extension; YAML and TOML sit behind the
//! `yaml-config` and `toml-config` features.
pub mod config;
pub mod error;

pub use config::{ConfigFormat, EngineConfig};
pub use error::StorageSystemError;
