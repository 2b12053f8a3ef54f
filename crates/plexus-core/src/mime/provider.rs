use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::mime::database::GlobPatternDatabase;
use crate::mime::error::MimeError;
use crate::mime::glob::GlobPattern;
use crate::mime::globs2;
use crate::mime::matcher::GlobMatchResult;

/// Shares one pattern database between readers.
///
/// Readers take an [`Arc`] snapshot and match against it without holding a
/// lock. A reload builds a complete new database and swaps it in, so a
/// reader sees either the old rules or the new ones, never a mix.
#[derive(Debug, Default)]
pub struct MimeGlobProvider {
    current: RwLock<Arc<GlobPatternDatabase>>,
}

impl MimeGlobProvider {
    pub fn new(database: GlobPatternDatabase) -> Self {
        Self {
            current: RwLock::new(Arc::new(database)),
        }
    }

    /// Reads a rule file and serves its patterns
    pub async fn from_file(path: &Path) -> Result<Self, MimeError> {
        let patterns = globs2::read_globs2_file(path).await?;
        Ok(Self::new(GlobPatternDatabase::from_patterns(patterns)))
    }

    /// The database as of now
    pub fn snapshot(&self) -> Arc<GlobPatternDatabase> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Replaces every rule with `rules`
    pub fn reload<I>(&self, rules: I)
    where
        I: IntoIterator<Item = GlobPattern>,
    {
        let database = Arc::new(GlobPatternDatabase::from_patterns(rules));
        log::info!("Reloaded MIME glob database with {} pattern(s)", database.len());
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = database;
    }

    /// Replaces every rule with the contents of a rule file
    pub async fn reload_from_file(&self, path: &Path) -> Result<(), MimeError> {
        let patterns = globs2::read_globs2_file(path).await?;
        self.reload(patterns);
        Ok(())
    }

    pub fn matching_globs(&self, filename: &str) -> GlobMatchResult {
        self.snapshot().matching_globs(filename)
    }

    /// The first candidate type for `filename`
    pub fn best_match(&self, filename: &str) -> Option<String> {
        self.matching_globs(filename).mime_types.into_iter().next()
    }
}
