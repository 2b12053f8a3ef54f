use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the MIME glob engine
#[derive(Debug, Error)]
pub enum MimeError {
    /// Glob weights range from 0 to 100
    #[error("Invalid weight {weight} for glob pattern '{pattern}': must be between 0 and 100")]
    InvalidWeight { pattern: String, weight: u8 },

    #[error("Empty glob pattern for MIME type '{mime_type}'")]
    EmptyPattern { mime_type: String },

    /// A rule line could not be understood
    #[error("Syntax error in glob rules at line {line}: {message}")]
    RuleSyntax { line: usize, message: String },

    #[error("I/O error reading glob rules from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
