//! Low-level scanner that checks a string against the injection pattern
//! library, either reporting structured findings or stripping every match.

use std::borrow::Cow;

use regex::{Captures, Regex, RegexSet};
use serde::{Deserialize, Serialize};

use crate::patterns::{InjectionPattern, PATTERNS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while constructing a [`Scanner`].
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("failed to compile regex pattern: {0}")]
    RegexCompile(#[from] regex::Error),
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// A single match produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The `name` field of the [`InjectionPattern`] that matched.
    pub pattern_name: String,
    /// Human-readable category string (e.g. `"ScriptInjection"`).
    pub category: String,
    /// The literal substring that triggered the match.
    pub matched_text: String,
    /// Byte offset of the match within the scanned text.
    pub offset: usize,
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Compiled scanner backed by a [`RegexSet`] for fast multi-pattern matching,
/// with individual [`Regex`] objects kept alongside for extracting match
/// details and for the removal passes.
pub struct Scanner {
    /// Used to cheaply determine *which* patterns match.
    regex_set: RegexSet,
    /// Parallel vec of individually compiled regexes (same order as
    /// [`PATTERNS`]).
    individual: Vec<Regex>,
}

impl Scanner {
    /// Compile every pattern in the library and return a ready-to-use scanner.
    pub fn new() -> Result<Self, ScannerError> {
        let pattern_strings: Vec<&str> = PATTERNS.iter().map(|p| p.pattern).collect();

        let regex_set = RegexSet::new(&pattern_strings)?;

        let individual = pattern_strings
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            regex_set,
            individual,
        })
    }

    /// Scan `text` and return all findings.
    ///
    /// Every pattern is matched against the original text, so a finding's
    /// offset always refers to `text` itself.  Permitted forms (such as
    /// `data:image/`) are not reported.  The returned [`Vec`] is sorted by
    /// byte offset.
    pub fn scan(&self, text: &str) -> Vec<Finding> {
        let matching_indices = self.regex_set.matches(text);

        let mut findings: Vec<Finding> = Vec::new();

        for idx in matching_indices.into_iter() {
            let pattern_def = &PATTERNS[idx];
            let re = &self.individual[idx];

            for caps in re.captures_iter(text) {
                if is_permitted(pattern_def, &caps) {
                    continue;
                }
                let Some(m) = caps.get(0) else {
                    continue;
                };
                findings.push(Finding {
                    pattern_name: pattern_def.name.to_string(),
                    category: pattern_def.category.to_string(),
                    matched_text: m.as_str().to_string(),
                    offset: m.start(),
                });
            }
        }

        findings.sort_by_key(|f| f.offset);
        findings
    }

    /// Remove every pattern from `text`, pass by pass, then trim surrounding
    /// whitespace.
    ///
    /// Each pass runs on the output of the previous one.  Text that matches
    /// none of the patterns skips the passes entirely.
    pub fn strip(&self, text: &str) -> String {
        if !self.regex_set.is_match(text) {
            return text.trim().to_string();
        }

        let mut current = text.to_string();
        for (pattern_def, re) in PATTERNS.iter().zip(&self.individual) {
            let replaced = if pattern_def.permit_captured {
                re.replace_all(&current, |caps: &Captures<'_>| {
                    if is_permitted(pattern_def, caps) {
                        caps[0].to_string()
                    } else {
                        String::new()
                    }
                })
            } else {
                re.replace_all(&current, "")
            };
            if let Cow::Owned(next) = replaced {
                current = next;
            }
        }

        current.trim().to_string()
    }

    /// Returns the number of patterns in the compiled set.
    pub fn pattern_count(&self) -> usize {
        self.individual.len()
    }
}

fn is_permitted(pattern_def: &InjectionPattern, caps: &Captures<'_>) -> bool {
    pattern_def.permit_captured && caps.get(1).is_some()
}
