//! Filename, SQL and form-field validators used by upload handling and form
//! validation.
//!
//! Predicates never error: malformed input simply yields `false`.

use std::sync::LazyLock;

use regex::Regex;

/// Longest filename [`sanitize_filename`] will return, in characters.
pub const MAX_FILENAME_CHARS: usize = 255;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME types accepted for uploads when no explicit list is configured.
pub const DEFAULT_ALLOWED_FILE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "text/csv",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

static SQL_LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[^\r\n]*").expect("line comment pattern must compile"));

static SQL_BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern must compile"));

static SQL_CHAINED_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i);\s*(?:DROP|DELETE|TRUNCATE|ALTER|CREATE|EXECUTE|EXEC)\s")
        .expect("chained statement pattern must compile")
});

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile"));

static CN_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9][0-9]{9}$").expect("phone pattern must compile"));

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

/// Make an uploaded filename safe to store.
///
/// Every character other than ASCII letters and digits, `_`, `-`, `.` and CJK
/// unified ideographs becomes `_`, every `..` is removed, and the result is
/// cut to [`MAX_FILENAME_CHARS`] characters.  The result may be empty.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_filename_char(c) { c } else { '_' })
        .collect();

    replaced
        .replace("..", "")
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect()
}

fn is_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{4E00}'..='\u{9FFF}')
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

/// Strip SQL comments and neutralise chained destructive statements.
///
/// This is defense in depth only; queries must still be parameterised.
pub fn sanitize_sql_input(s: &str) -> String {
    let without_blocks = SQL_BLOCK_COMMENT.replace_all(s, "");
    let without_lines = SQL_LINE_COMMENT.replace_all(&without_blocks, "");
    SQL_CHAINED_STATEMENT
        .replace_all(&without_lines, "; ")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Returns `true` if `mime_type` appears in `allowed` (ASCII case-insensitive,
/// surrounding whitespace ignored).
pub fn is_allowed_file_type<S: AsRef<str>>(mime_type: &str, allowed: &[S]) -> bool {
    let mime_type = mime_type.trim();
    allowed
        .iter()
        .any(|a| a.as_ref().trim().eq_ignore_ascii_case(mime_type))
}

/// Returns `true` if `size` does not exceed `max_size` bytes.
pub fn is_valid_file_size(size: u64, max_size: u64) -> bool {
    size <= max_size
}

/// Loose shape check: something, `@`, something, `.`, something.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Mainland-China mobile number: 11 digits starting with `13`–`19`.
pub fn is_valid_phone(phone: &str) -> bool {
    CN_MOBILE.is_match(phone)
}
