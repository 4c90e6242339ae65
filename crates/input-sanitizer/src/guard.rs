//! Request-boundary composition of the sanitizer and validators.
//!
//! A [`RequestGuard`] runs the depth check before anything else touches the
//! payload, then scans and cleans it.  An [`UploadGuard`] applies the
//! file-type and size checks and hands back a storable filename.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::depth::{is_secure_object, nesting_depth, DEFAULT_MAX_DEPTH};
use crate::sanitizer::{sanitize_input, scan_value, SanitizeMode, ValueFinding};
use crate::validators::{
    is_allowed_file_type, is_valid_file_size, sanitize_filename, DEFAULT_ALLOWED_FILE_TYPES,
    DEFAULT_MAX_FILE_SIZE,
};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Why a request payload was refused.
#[derive(Debug, Error)]
pub enum PayloadRejection {
    #[error("payload nesting depth {depth} exceeds the limit of {max_depth}")]
    TooDeep { depth: usize, max_depth: usize },
    #[error("payload contains {} injection pattern(s)", .findings.len())]
    InjectionDetected { findings: Vec<ValueFinding> },
}

/// A payload that passed the guard.
#[derive(Debug, Clone)]
pub struct AdmittedPayload {
    /// The sanitized payload, same shape as the input.  String leaves are
    /// trimmed even when nothing else was removed.
    pub value: Value,
    /// Everything that was removed, located by JSON pointer.
    pub findings: Vec<ValueFinding>,
}

impl AdmittedPayload {
    /// Returns `true` when at least one injection pattern was removed.
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Depth check plus sanitization for decoded request bodies and query
/// parameters.
#[derive(Debug, Clone, Copy)]
pub struct RequestGuard {
    max_depth: usize,
    mode: SanitizeMode,
}

impl RequestGuard {
    pub fn new(max_depth: usize, mode: SanitizeMode) -> Self {
        Self { max_depth, mode }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn mode(&self) -> SanitizeMode {
        self.mode
    }

    /// Admit `payload` or explain why not.
    ///
    /// In [`SanitizeMode::Strip`] injection patterns are removed and the
    /// cleaned value is returned; in [`SanitizeMode::Reject`] any finding
    /// refuses the payload.
    pub fn admit(&self, payload: &Value) -> Result<AdmittedPayload, PayloadRejection> {
        if !is_secure_object(payload, self.max_depth) {
            let depth = nesting_depth(payload);
            warn!(depth, max_depth = self.max_depth, "payload rejected: nested too deep");
            return Err(PayloadRejection::TooDeep {
                depth,
                max_depth: self.max_depth,
            });
        }

        let findings = scan_value(payload);
        for f in &findings {
            warn!(
                path = %f.path,
                pattern = %f.finding.pattern_name,
                category = %f.finding.category,
                offset = f.finding.offset,
                "injection pattern detected"
            );
        }

        if self.mode == SanitizeMode::Reject && !findings.is_empty() {
            return Err(PayloadRejection::InjectionDetected { findings });
        }

        let value = sanitize_input(payload);
        debug!(findings = findings.len(), "payload admitted");

        Ok(AdmittedPayload { value, findings })
    }
}

impl Default for RequestGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, SanitizeMode::Strip)
    }
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Why an upload was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("file type '{mime_type}' is not allowed")]
    DisallowedType { mime_type: String },
    #[error("file size {size} bytes exceeds the limit of {max_size} bytes")]
    TooLarge { size: u64, max_size: u64 },
    #[error("filename '{original}' is empty after sanitization")]
    EmptyFilename { original: String },
}

/// File-type, size and filename checks for uploaded files.
#[derive(Debug, Clone)]
pub struct UploadGuard {
    allowed_types: Vec<String>,
    max_size: u64,
}

impl UploadGuard {
    pub fn new(allowed_types: Vec<String>, max_size: u64) -> Self {
        Self {
            allowed_types,
            max_size,
        }
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Check an upload and return the filename it should be stored under.
    pub fn admit(&self, name: &str, mime_type: &str, size: u64) -> Result<String, UploadRejection> {
        if !is_allowed_file_type(mime_type, &self.allowed_types) {
            warn!(mime_type, "upload rejected: type not allowed");
            return Err(UploadRejection::DisallowedType {
                mime_type: mime_type.to_string(),
            });
        }

        if !is_valid_file_size(size, self.max_size) {
            warn!(size, max_size = self.max_size, "upload rejected: too large");
            return Err(UploadRejection::TooLarge {
                size,
                max_size: self.max_size,
            });
        }

        let cleaned = sanitize_filename(name);
        if cleaned.is_empty() {
            warn!(name, "upload rejected: empty filename");
            return Err(UploadRejection::EmptyFilename {
                original: name.to_string(),
            });
        }

        debug!(original = name, stored = %cleaned, "upload admitted");
        Ok(cleaned)
    }
}

impl Default for UploadGuard {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_FILE_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            DEFAULT_MAX_FILE_SIZE,
        )
    }
}
