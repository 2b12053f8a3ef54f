//! # Plexus Core Kernel
//!
//! Shared foundations for the two engines of `plexus-core`.
//!
//! ## Key Components:
//!
//! - **Core Constants**: Provides system-wide constants via the `constants` submodule.
//! - **Error Handling**: Defines the crate-wide error type ([`Error`](error::Error)) and
//!   a `Result` type alias in the `error` submodule. Subsystem errors convert into it.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
