use std::collections::HashMap;

use crate::kernel::constants::DEFAULT_GLOB_WEIGHT;
use crate::mime::glob::GlobPattern;
use crate::mime::matcher::{GlobMatchAccumulator, GlobMatchResult};

/// Patterns of one weight tier, unique per (type, pattern)
#[derive(Debug, Clone, Default)]
struct GlobPatternList {
    patterns: Vec<GlobPattern>,
}

impl GlobPatternList {
    fn contains(&self, mime_type: &str, pattern: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.mime_type() == mime_type && p.pattern() == pattern)
    }

    fn add(&mut self, glob: GlobPattern) -> bool {
        if self.contains(glob.mime_type(), glob.pattern()) {
            return false;
        }
        self.patterns.push(glob);
        true
    }

    fn remove_mime_type(&mut self, mime_type: &str) {
        self.patterns.retain(|p| p.mime_type() != mime_type);
    }

    fn match_into<F>(&self, filename: &str, acc: &mut GlobMatchAccumulator, keep: &F)
    where
        F: Fn(&str) -> bool,
    {
        for glob in &self.patterns {
            if keep(glob.mime_type()) && glob.matches(filename) {
                acc.add_match(glob.mime_type(), glob.weight(), glob.pattern());
            }
        }
    }
}

/// Filename pattern database in three tiers.
///
/// Case-insensitive `*.ext` patterns at weight 50 go into buckets keyed by
/// extension; every other pattern goes into the high list (weight above 50)
/// or the low list (50 and below).
#[derive(Debug, Clone, Default)]
pub struct GlobPatternDatabase {
    fast_patterns: HashMap<String, Vec<String>>,
    high_weight: GlobPatternList,
    low_weight: GlobPatternList,
}

impl GlobPatternDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from a batch of patterns
    pub fn from_patterns<I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = GlobPattern>,
    {
        let mut db = Self::new();
        for glob in patterns {
            db.add_glob(glob);
        }
        db
    }

    /// Adds a pattern. Adding the same (type, pattern) pair again changes nothing.
    pub fn add_glob(&mut self, glob: GlobPattern) {
        if glob.weight() == DEFAULT_GLOB_WEIGHT && glob.is_fast_pattern() && !glob.is_case_sensitive() {
            let extension = glob.pattern()[2..].to_lowercase();
            let types = self.fast_patterns.entry(extension).or_default();
            if !types.iter().any(|t| t == glob.mime_type()) {
                types.push(glob.mime_type().to_string());
            }
        } else if glob.weight() > DEFAULT_GLOB_WEIGHT {
            self.high_weight.add(glob);
        } else {
            self.low_weight.add(glob);
        }
    }

    /// Forgets every pattern of `mime_type`. Emptied extension buckets stay.
    pub fn remove_mime_type(&mut self, mime_type: &str) {
        for types in self.fast_patterns.values_mut() {
            types.retain(|t| t != mime_type);
        }
        self.high_weight.remove_mime_type(mime_type);
        self.low_weight.remove_mime_type(mime_type);
    }

    pub fn clear(&mut self) {
        self.fast_patterns.clear();
        self.high_weight.patterns.clear();
        self.low_weight.patterns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fast_patterns.values().all(Vec::is_empty)
            && self.high_weight.patterns.is_empty()
            && self.low_weight.patterns.is_empty()
    }

    /// Number of (type, pattern) pairs stored
    pub fn len(&self) -> usize {
        self.fast_patterns.values().map(Vec::len).sum::<usize>()
            + self.high_weight.patterns.len()
            + self.low_weight.patterns.len()
    }

    /// Every type some pattern maps to, sorted
    pub fn mime_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .fast_patterns
            .values()
            .flatten()
            .cloned()
            .chain(self.high_weight.patterns.iter().map(|p| p.mime_type().to_string()))
            .chain(self.low_weight.patterns.iter().map(|p| p.mime_type().to_string()))
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// Types whose patterns best match `filename`
    pub fn matching_globs(&self, filename: &str) -> GlobMatchResult {
        self.matching_globs_filtered(filename, |_| true)
    }

    /// Like [`matching_globs`](Self::matching_globs), but only types for
    /// which `keep` returns true take part.
    pub fn matching_globs_filtered<F>(&self, filename: &str, keep: F) -> GlobMatchResult
    where
        F: Fn(&str) -> bool,
    {
        let mut acc = GlobMatchAccumulator::new();

        self.high_weight.match_into(filename, &mut acc, &keep);
        if !acc.is_empty() {
            return acc.into_result();
        }

        if let Some(dot) = filename.rfind('.') {
            let extension = filename[dot + 1..].to_lowercase();
            if let Some(types) = self.fast_patterns.get(&extension) {
                let pattern = format!("*.{}", extension);
                for mime_type in types.iter().filter(|t| keep(t.as_str())) {
                    acc.add_match(mime_type, DEFAULT_GLOB_WEIGHT, &pattern);
                }
            }
        }

        // Runs even after a fast hit: `*.tar.bz2` must be able to beat `*.bz2`.
        self.low_weight.match_into(filename, &mut acc, &keep);
        acc.into_result()
    }
}
