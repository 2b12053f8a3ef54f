//! # Plexus MIME Glob Engine
//!
//! Maps filenames to MIME types through weighted glob patterns.
//!
//! - **[`glob`]**: a single pattern ([`GlobPattern`]), classified once into a
//!   cheap matching shape.
//! - **[`database`]**: the tiered pattern store ([`GlobPatternDatabase`]).
//! - **[`matcher`]**: weight and length ranking of candidate matches.
//! - **[`globs2`]**: the `globs2` rule file reader.
//! - **[`provider`]**: a shared, reloadable database ([`MimeGlobProvider`]).
pub mod database;
pub mod error;
pub mod glob;
pub mod globs2;
pub mod matcher;
pub mod provider;

pub use database::GlobPatternDatabase;
pub use error::MimeError;
pub use glob::{CaseSensitivity, GlobPattern, PatternShape};
pub use matcher::{GlobMatchAccumulator, GlobMatchResult};
pub use provider::MimeGlobProvider;

#[cfg(test)]
mod tests;
