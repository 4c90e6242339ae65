//! Recursive sanitization of untrusted JSON values.
//!
//! Every function here is pure: the same input always yields the same output
//! and nothing is shared between calls except the compiled pattern set, which
//! is read-only.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scanner::{Finding, Scanner};

/// Process-wide scanner, compiled on first use.
static SCANNER: LazyLock<Scanner> =
    LazyLock::new(|| Scanner::new().expect("built-in patterns must compile"));

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Determines what the request guard does with a payload that carries
/// injection patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeMode {
    /// Remove the patterns and let the cleaned payload through.
    #[default]
    Strip,
    /// Refuse the payload outright.
    Reject,
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Remove script elements, iframe elements, inline event handlers and
/// `javascript:`/`data:` schemes from `s`, then trim it.
///
/// ```rust
/// use input_sanitizer::sanitize_string;
///
/// let out = sanitize_string("<img src=x onerror=alert('XSS')>");
/// assert!(!out.contains("onerror="));
/// ```
pub fn sanitize_string(s: &str) -> String {
    SCANNER.strip(s)
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Return a sanitized copy of `value`.
///
/// Only string leaves change.  Arrays keep their length and order, objects
/// keep their key set and order, and null, booleans and numbers are copied as
/// they are.  There is no depth limit here; run
/// [`is_secure_object`](crate::depth::is_secure_object) first on untrusted
/// payloads.
pub fn sanitize_input(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => Value::Number(n.clone()),
        Value::String(s) => Value::String(sanitize_string(s)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_input).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), sanitize_input(v)))
                .collect(),
        ),
    }
}

/// In-place variant of [`sanitize_input`] for callers that own the value.
pub fn sanitize_input_in_place(value: &mut Value) {
    match value {
        Value::String(s) => *s = sanitize_string(s),
        Value::Array(items) => items.iter_mut().for_each(sanitize_input_in_place),
        Value::Object(map) => map.values_mut().for_each(sanitize_input_in_place),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// A [`Finding`] located inside a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFinding {
    /// RFC 6901 pointer to the string leaf containing the match.
    pub path: String,
    #[serde(flatten)]
    pub finding: Finding,
}

/// Scan every string leaf of `value` and report findings with their location.
///
/// Findings are returned in document order.
pub fn scan_value(value: &Value) -> Vec<ValueFinding> {
    let mut out = Vec::new();
    collect_findings(value, &mut String::new(), &mut out);
    out
}

fn collect_findings(value: &Value, path: &mut String, out: &mut Vec<ValueFinding>) {
    match value {
        Value::String(s) => {
            out.extend(SCANNER.scan(s).into_iter().map(|finding| ValueFinding {
                path: path.clone(),
                finding,
            }));
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                let len = path.len();
                path.push('/');
                path.push_str(&idx.to_string());
                collect_findings(item, path, out);
                path.truncate(len);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let len = path.len();
                path.push('/');
                push_pointer_token(path, key);
                collect_findings(item, path, out);
                path.truncate(len);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn push_pointer_token(path: &mut String, key: &str) {
    for ch in key.chars() {
        match ch {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            _ => path.push(ch),
        }
    }
}
