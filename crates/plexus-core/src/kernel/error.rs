//! # Plexus Core Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Each subsystem owns a typed error enum ([`PluginSystemError`],
//! [`MimeError`], [`StorageSystemError`]); this module wraps them so callers
//! that drive several subsystems can use a single `Result` alias.
use std::result::Result as StdResult;

use crate::mime::error::MimeError;
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

/// Top-level error for the Plexus core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed MIME engine error
    #[error("MIME engine error: {0}")]
    Mime(#[from] MimeError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<crate::plugin_system::version::VersionError> for Error {
    fn from(err: crate::plugin_system::version::VersionError) -> Self {
        Error::PluginSystem(PluginSystemError::VersionParsing(err))
    }
}

impl From<crate::plugin_system::dependency::DependencyError> for Error {
    fn from(err: crate::plugin_system::dependency::DependencyError) -> Self {
        Error::PluginSystem(PluginSystemError::DependencyResolution(err))
    }
}
