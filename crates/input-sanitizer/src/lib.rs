//! # input-sanitizer
//!
//! Neutralises script and markup injection in untrusted input arriving at the
//! AnesGuardian request boundary, and validates uploads and form fields.
//!
//! The crate is organised around these layers:
//!
//! 1. **[`patterns`]** -- static catalogue of regex removal passes, grouped by
//!    [`PatternCategory`](patterns::PatternCategory).  Slice order is pass
//!    order.
//! 2. **[`scanner`]** -- compiles the patterns into a [`RegexSet`](regex::RegexSet),
//!    produces [`Finding`](scanner::Finding) values and runs the removal passes.
//! 3. **[`sanitizer`]** -- [`sanitize_string`] and the recursive
//!    [`sanitize_input`] over [`serde_json::Value`].
//! 4. **[`depth`]**, **[`html`]**, **[`validators`]** -- the depth guard, the
//!    rich-text allow-list filter and the filename/SQL/form validators.
//! 5. **[`guard`]** -- request and upload guards composing the above with a
//!    configurable [`SanitizeMode`](sanitizer::SanitizeMode).
//!
//! Everything is synchronous and stateless; all functions are safe to call
//! from any number of threads.
//!
//! ## Quick start
//!
//! ```rust
//! use input_sanitizer::{RequestGuard, SanitizeMode, DEFAULT_MAX_DEPTH};
//! use serde_json::json;
//!
//! let guard = RequestGuard::new(DEFAULT_MAX_DEPTH, SanitizeMode::Strip);
//! let admitted = guard
//!     .admit(&json!({ "medicalHistory": ["<script>alert(1)</script>"] }))
//!     .unwrap();
//! assert!(admitted.has_findings());
//! assert_eq!(admitted.value["medicalHistory"][0], "");
//! ```

pub mod depth;
pub mod guard;
pub mod html;
pub mod patterns;
pub mod sanitizer;
pub mod scanner;
pub mod validators;

// Re-export the most commonly used items at the crate root
// (`use input_sanitizer::sanitize_input`).
pub use depth::{is_secure_object, nesting_depth, DEFAULT_MAX_DEPTH};
pub use guard::{AdmittedPayload, PayloadRejection, RequestGuard, UploadGuard, UploadRejection};
pub use html::{sanitize_html, ALLOWED_TAGS};
pub use patterns::{InjectionPattern, PatternCategory, PATTERNS};
pub use sanitizer::{
    sanitize_input, sanitize_input_in_place, sanitize_string, scan_value, SanitizeMode,
    ValueFinding,
};
pub use scanner::{Finding, Scanner, ScannerError};
pub use validators::{
    is_allowed_file_type, is_valid_email, is_valid_file_size, is_valid_phone, sanitize_filename,
    sanitize_sql_input, DEFAULT_ALLOWED_FILE_TYPES, DEFAULT_MAX_FILE_SIZE,
};
