use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Numeric dot-separated segments, optionally followed by a `_` or `-` suffix.
static VERSION_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)*)(?:[_-]([0-9A-Za-z.]+))?$")
        .expect("version grammar is a valid regex")
});

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version format: '{0}'")]
    InvalidFormat(String),
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// A plugin version such as `4.2`, `4.2.1` or `4.2.1_3`.
///
/// Missing trailing segments compare as `0`, so `2.1` and `2.1.0` are equal.
#[derive(Debug, Clone)]
pub struct PluginVersion {
    text: String,
    segments: Vec<u64>,
    suffix: Option<String>,
}

impl PluginVersion {
    /// Parses a version string, rejecting anything outside the version grammar.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let captures = VERSION_GRAMMAR
            .captures(version)
            .ok_or_else(|| VersionError::InvalidFormat(version.to_string()))?;

        let numeric = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let segments = numeric
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|e| VersionError::ParseError(format!("segment '{}' of '{}': {}", part, version, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            text: version.to_string(),
            segments,
            suffix: captures.get(2).map(|m| m.as_str().to_string()),
        })
    }

    /// The version exactly as it was written
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Numeric segments as written (no zero padding)
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The text after `_` or `-`, if any
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    fn compare_suffix(&self, other: &Self) -> Ordering {
        let mine = self.suffix.as_deref().unwrap_or("");
        let theirs = other.suffix.as_deref().unwrap_or("");
        match (mine.parse::<u64>(), theirs.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            _ => mine.cmp(theirs),
        }
    }
}

impl PartialEq for PluginVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PluginVersion {}

impl PartialOrd for PluginVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PluginVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.compare_suffix(other)
    }
}

impl FromStr for PluginVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginVersion::parse(s)
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Returns true if `version` matches the version grammar.
pub fn is_valid_version(version: &str) -> bool {
    PluginVersion::parse(version).is_ok()
}

/// Compares two version strings.
///
/// Returns `None` when either side is not a valid version; such a version
/// can never satisfy a constraint.
pub fn version_compare(first: &str, second: &str) -> Option<Ordering> {
    let first = PluginVersion::parse(first).ok()?;
    let second = PluginVersion::parse(second).ok()?;
    Some(first.cmp(&second))
}
