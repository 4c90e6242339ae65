//! Injection pattern library.
//!
//! Contains the static catalogue of regex patterns removed from untrusted
//! strings.  The catalogue doubles as the removal pipeline: entries are applied
//! in slice order, each one operating on the output of the previous one, so
//! the order below is part of the observable behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Broad classification of the injection technique a pattern targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternCategory {
    /// Inline `<script>` elements.
    ScriptInjection,
    /// Embedded `<iframe>` elements.
    FrameInjection,
    /// Inline `on*=` event-handler attributes.
    EventHandler,
    /// URI schemes that execute or smuggle content (`javascript:`, `data:`).
    UnsafeScheme,
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScriptInjection => write!(f, "ScriptInjection"),
            Self::FrameInjection => write!(f, "FrameInjection"),
            Self::EventHandler => write!(f, "EventHandler"),
            Self::UnsafeScheme => write!(f, "UnsafeScheme"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern definition
// ---------------------------------------------------------------------------

/// A single removal pattern.
pub struct InjectionPattern {
    /// Short, snake_case identifier used in logs and findings.
    pub name: &'static str,
    /// The family of injection technique this pattern belongs to.
    pub category: PatternCategory,
    /// A regex string (compiled by [`crate::scanner::Scanner`]).
    pub pattern: &'static str,
    /// When set, a match whose first capture group participated is a
    /// permitted form and is left in place.
    pub permit_captured: bool,
}

// ---------------------------------------------------------------------------
// Pattern catalogue
// ---------------------------------------------------------------------------

/// The built-in removal pipeline, in application order.
pub static PATTERNS: &[InjectionPattern] = &[
    // Element passes take the shortest span up to the first closing tag, so
    // text between two separate script blocks survives.
    InjectionPattern {
        name: "script_element",
        category: PatternCategory::ScriptInjection,
        pattern: r"(?is)<script\b.*?</script\s*>",
        permit_captured: false,
    },
    InjectionPattern {
        name: "iframe_element",
        category: PatternCategory::FrameInjection,
        pattern: r"(?is)<iframe\b.*?</iframe\s*>",
        permit_captured: false,
    },
    // Quoted values are removed whole; an unquoted value runs to the next
    // whitespace or tag end.
    InjectionPattern {
        name: "event_handler",
        category: PatternCategory::EventHandler,
        pattern: r#"(?i)on\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#,
        permit_captured: false,
    },
    InjectionPattern {
        name: "javascript_scheme",
        category: PatternCategory::UnsafeScheme,
        pattern: r"(?i)javascript:",
        permit_captured: false,
    },
    // `data:image/...` is allowed; the capture marks it.
    InjectionPattern {
        name: "data_scheme",
        category: PatternCategory::UnsafeScheme,
        pattern: r"(?i)data:(image/)?",
        permit_captured: true,
    },
];
