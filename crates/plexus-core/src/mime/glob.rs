use std::fmt;

use regex::Regex;

use crate::kernel::constants::{DEFAULT_GLOB_WEIGHT, MAX_GLOB_WEIGHT};
use crate::mime::error::MimeError;

/// Whether a pattern distinguishes upper and lower case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSensitivity {
    #[default]
    Insensitive,
    Sensitive,
}

/// Shape a pattern was classified into when it was created.
///
/// Every shape except [`PatternShape::Other`] is matched with plain string
/// comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternShape {
    /// No wildcard at all: `README`
    Literal,
    /// A single leading star: `*.txt`
    Suffix,
    /// A single trailing star: `README*`
    Prefix,
    /// Exactly `[0-9][0-9][0-9].vdr`
    Vdr,
    /// Exactly `*.anim[1-9j]`
    Anim,
    /// Anything else, matched through a regular expression
    Other,
}

/// A filename pattern mapped to a MIME type with a weight
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    mime_type: String,
    weight: u8,
    case_sensitivity: CaseSensitivity,
    shape: PatternShape,
    /// Compiled form of an `Other` pattern; `None` if it failed to compile
    regex: Option<Regex>,
}

impl GlobPattern {
    /// Creates a pattern, classifying it once.
    ///
    /// Case-insensitive patterns are stored lowercased.
    pub fn new(
        pattern: &str,
        mime_type: &str,
        weight: u8,
        case_sensitivity: CaseSensitivity,
    ) -> Result<Self, MimeError> {
        if pattern.is_empty() {
            return Err(MimeError::EmptyPattern {
                mime_type: mime_type.to_string(),
            });
        }
        if weight > MAX_GLOB_WEIGHT {
            return Err(MimeError::InvalidWeight {
                pattern: pattern.to_string(),
                weight,
            });
        }

        let pattern = match case_sensitivity {
            CaseSensitivity::Insensitive => pattern.to_lowercase(),
            CaseSensitivity::Sensitive => pattern.to_string(),
        };
        let shape = classify(&pattern);
        let regex = if shape == PatternShape::Other {
            match Regex::new(&wildcard_to_regex(&pattern)) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    log::warn!("Glob pattern '{}' for '{}' never matches: {}", pattern, mime_type, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            pattern,
            mime_type: mime_type.to_string(),
            weight,
            case_sensitivity,
            shape,
            regex,
        })
    }

    /// Case-insensitive pattern with the default weight of 50
    pub fn with_default_weight(pattern: &str, mime_type: &str) -> Result<Self, MimeError> {
        Self::new(pattern, mime_type, DEFAULT_GLOB_WEIGHT, CaseSensitivity::Insensitive)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn weight(&self) -> u8 {
        self.weight
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitivity == CaseSensitivity::Sensitive
    }

    pub fn shape(&self) -> PatternShape {
        self.shape
    }

    /// True for the `*.ext` form that can live in an extension-keyed bucket:
    /// one star at the start, one dot right after it, no other wildcard.
    pub fn is_fast_pattern(&self) -> bool {
        let p = &self.pattern;
        p.starts_with("*.")
            && p.rfind('*') == Some(0)
            && p.rfind('.') == Some(1)
            && !p.contains('?')
            && !p.contains('[')
    }

    pub fn matches(&self, filename: &str) -> bool {
        let lowered;
        let filename = match self.case_sensitivity {
            CaseSensitivity::Insensitive => {
                lowered = filename.to_lowercase();
                lowered.as_str()
            }
            CaseSensitivity::Sensitive => filename,
        };

        match self.shape {
            PatternShape::Literal => self.pattern == filename,
            PatternShape::Suffix => filename.ends_with(&self.pattern[1..]),
            PatternShape::Prefix => filename.starts_with(&self.pattern[..self.pattern.len() - 1]),
            PatternShape::Vdr => {
                let chars: Vec<char> = filename.chars().collect();
                chars.len() == 7
                    && chars[..3].iter().all(char::is_ascii_digit)
                    && chars[3..].iter().copied().eq(".vdr".chars())
            }
            PatternShape::Anim => {
                let chars: Vec<char> = filename.chars().collect();
                let len = chars.len();
                if len < 6 {
                    return false;
                }
                let last = chars[len - 1];
                let last_ok = matches!(last, '1'..='9' | 'j');
                last_ok && chars[len - 6..len - 1].iter().copied().eq(".anim".chars())
            }
            PatternShape::Other => self.regex.as_ref().is_some_and(|regex| regex.is_match(filename)),
        }
    }
}

impl PartialEq for GlobPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.mime_type == other.mime_type
            && self.weight == other.weight
            && self.case_sensitivity == other.case_sensitivity
    }
}

impl Eq for GlobPattern {}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.weight, self.mime_type, self.pattern)?;
        if self.is_case_sensitive() {
            f.write_str(":cs")?;
        }
        Ok(())
    }
}

/// Picks the cheapest matcher able to handle `pattern`
pub fn classify(pattern: &str) -> PatternShape {
    if pattern.is_empty() {
        return PatternShape::Other;
    }
    let stars = pattern.matches('*').count();
    if !pattern.contains('[') && !pattern.contains('?') {
        if stars == 1 {
            if pattern.starts_with('*') {
                return PatternShape::Suffix;
            }
            if pattern.ends_with('*') {
                return PatternShape::Prefix;
            }
        } else if stars == 0 {
            return PatternShape::Literal;
        }
    }
    match pattern {
        "[0-9][0-9][0-9].vdr" => PatternShape::Vdr,
        "*.anim[1-9j]" => PatternShape::Anim,
        _ => PatternShape::Other,
    }
}

/// Translates a shell wildcard into an anchored regular expression.
///
/// `*` and `?` match any run of characters and any single character; `[...]`
/// is a character class where a leading `!` negates. A `[` without a closing
/// bracket is literal.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str(r"\A");

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut j = i + 1;
                    if matches!(chars[j], '!' | '^') {
                        out.push('^');
                        j += 1;
                    }
                    while j < end {
                        match chars[j] {
                            '-' => out.push('-'),
                            c => out.push_str(&regex::escape(&c.to_string())),
                        }
                        j += 1;
                    }
                    out.push(']');
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push_str(r"\z");
    out
}

/// Index of the `]` closing the class opened at `open`
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if j < chars.len() && matches!(chars[j], '!' | '^') {
        j += 1;
    }
    // A `]` right after the opening bracket is a member, not the end.
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    chars[j.min(chars.len())..]
        .iter()
        .position(|c| *c == ']')
        .map(|offset| j + offset)
}
