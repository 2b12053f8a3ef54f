/// Collects the best-ranked types while patterns are evaluated.
///
/// Ranking: higher weight wins; at equal weight the longer pattern wins;
/// equal weight and length accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobMatchAccumulator {
    mime_types: Vec<String>,
    weight: Option<u8>,
    pattern_length: usize,
    found_suffix: Option<String>,
}

impl GlobMatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a match of `pattern` (with `weight`) for `mime_type`
    pub fn add_match(&mut self, mime_type: &str, weight: u8, pattern: &str) {
        let length = pattern.chars().count();
        let replace = match self.weight {
            None => true,
            Some(best) if weight < best => return,
            Some(best) if weight > best => true,
            Some(_) => {
                if length < self.pattern_length {
                    return;
                }
                length > self.pattern_length
            }
        };

        if replace {
            self.mime_types.clear();
            self.found_suffix = None;
            self.weight = Some(weight);
            self.pattern_length = length;
        }

        if !self.mime_types.iter().any(|t| t == mime_type) {
            self.mime_types.push(mime_type.to_string());
            if let Some(suffix) = pattern.strip_prefix("*.") {
                self.found_suffix = Some(suffix.to_string());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mime_types.is_empty()
    }

    /// Matched types, in the order they were first accepted
    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    /// Weight of the current best tier
    pub fn weight(&self) -> Option<u8> {
        self.weight
    }

    /// Length of the patterns in the current best tier
    pub fn pattern_length(&self) -> usize {
        self.pattern_length
    }

    pub fn found_suffix(&self) -> Option<&str> {
        self.found_suffix.as_deref()
    }

    pub fn into_result(self) -> GlobMatchResult {
        GlobMatchResult {
            mime_types: self.mime_types,
            found_suffix: self.found_suffix,
        }
    }
}

/// Outcome of a filename lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobMatchResult {
    /// Candidate types, best first
    pub mime_types: Vec<String>,
    /// Text after `*.` of the winning suffix pattern, if one won
    pub found_suffix: Option<String>,
}

impl GlobMatchResult {
    pub fn is_empty(&self) -> bool {
        self.mime_types.is_empty()
    }

    pub fn best(&self) -> Option<&str> {
        self.mime_types.first().map(String::as_str)
    }
}
