//! Reader for the shared-mime-info `globs2` rule format.
//!
//! Each line is `weight:mime/type:pattern[:flags]`, where `flags` is a comma
//! separated list and `cs` marks the pattern case-sensitive. Lines starting
//! with `#` are comments. The older `globs` form `mime/type:pattern` is
//! accepted too and gets the default weight.
use std::path::Path;

use tokio::fs;

use crate::kernel::constants::DEFAULT_GLOB_WEIGHT;
use crate::mime::error::MimeError;
use crate::mime::glob::{CaseSensitivity, GlobPattern};

/// Parses one line. Blank lines and comments yield `Ok(None)`.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<GlobPattern>, MimeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let syntax = |message: String| MimeError::RuleSyntax {
        line: line_number,
        message,
    };

    let (weight, rest) = match line.split_once(':') {
        Some((head, tail)) if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) => {
            let weight = head
                .parse::<u8>()
                .map_err(|e| syntax(format!("invalid weight '{}': {}", head, e)))?;
            (weight, tail)
        }
        _ => (DEFAULT_GLOB_WEIGHT, line),
    };

    let mut fields = rest.splitn(3, ':');
    let mime_type = fields.next().unwrap_or("");
    let pattern = fields
        .next()
        .ok_or_else(|| syntax(format!("expected 'type:pattern', found '{}'", line)))?;
    let flags = fields.next().unwrap_or("");

    if mime_type.is_empty() || !mime_type.contains('/') {
        return Err(syntax(format!("invalid MIME type '{}'", mime_type)));
    }

    let case_sensitivity = if flags.split(',').any(|flag| flag.trim() == "cs") {
        CaseSensitivity::Sensitive
    } else {
        CaseSensitivity::Insensitive
    };

    GlobPattern::new(pattern, mime_type, weight, case_sensitivity)
        .map(Some)
        .map_err(|e| syntax(e.to_string()))
}

/// Parses a whole rule file, skipping malformed lines with a warning
pub fn parse_globs2(content: &str) -> Vec<GlobPattern> {
    let mut patterns = Vec::new();
    for (index, line) in content.lines().enumerate() {
        match parse_line(line, index + 1) {
            Ok(Some(glob)) => patterns.push(glob),
            Ok(None) => {}
            Err(e) => log::warn!("Skipping glob rule: {}", e),
        }
    }
    patterns
}

/// Parses a whole rule file, failing on the first malformed line
pub fn parse_globs2_strict(content: &str) -> Result<Vec<GlobPattern>, MimeError> {
    let mut patterns = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if let Some(glob) = parse_line(line, index + 1)? {
            patterns.push(glob);
        }
    }
    Ok(patterns)
}

/// Reads and parses a rule file
pub async fn read_globs2_file(path: &Path) -> Result<Vec<GlobPattern>, MimeError> {
    let content = fs::read_to_string(path).await.map_err(|source| MimeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let patterns = parse_globs2(&content);
    log::debug!("Read {} glob rule(s) from {}", patterns.len(), path.display());
    Ok(patterns)
}
