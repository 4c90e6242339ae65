use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use input_sanitizer::{
    RequestGuard, SanitizeMode, UploadGuard, DEFAULT_ALLOWED_FILE_TYPES, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_FILE_SIZE,
};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Config {
    pub fn request_guard(&self) -> RequestGuard {
        RequestGuard::new(self.sanitizer.max_depth, self.sanitizer.mode)
    }

    pub fn upload_guard(&self) -> UploadGuard {
        UploadGuard::new(self.upload.allowed_types.clone(), self.upload.max_size_bytes)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_audit_path")]
    pub audit_log_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            audit_log_path: default_audit_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SanitizerConfig {
    #[serde(default)]
    pub mode: SanitizeMode,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            mode: SanitizeMode::default(),
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
    #[serde(default = "default_max_size")]
    pub max_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_types: default_allowed_types(),
            max_size_bytes: default_max_size(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".to_string()
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("audit.jsonl")
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_allowed_types() -> Vec<String> {
    DEFAULT_ALLOWED_FILE_TYPES
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load configuration from a YAML file.
///
/// Returns `Ok(None)` when the file does not exist; the caller falls back to
/// [`Config::default`] and reports it through [`warn_defaulted`] once logging
/// is up.
pub fn load(path: &Path) -> anyhow::Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    load_from_str(&contents)
        .map(Some)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

pub fn warn_defaulted(path: &Path) {
    warn!(
        path = %path.display(),
        "configuration file not found; using defaults"
    );
}

/// Parse and validate a [`Config`] from a YAML string.
pub fn load_from_str(yaml: &str) -> anyhow::Result<Config> {
    let config: Config = serde_yml::from_str(yaml).context("YAML deserialization failed")?;
    validate(&config)?;
    Ok(config)
}

/// Run post-deserialization validation checks.
fn validate(config: &Config) -> anyhow::Result<()> {
    if config.upload.max_size_bytes == 0 {
        bail!("upload.max_size_bytes must be greater than zero");
    }

    if config.upload.allowed_types.is_empty() {
        bail!("upload.allowed_types must not be empty");
    }

    let mut seen = HashSet::new();
    for mime in &config.upload.allowed_types {
        let normalized = mime.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            bail!("upload.allowed_types entries must not be empty");
        }
        if !seen.insert(normalized) {
            bail!("duplicate upload type: '{mime}'");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = load_from_str("{}").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.sanitizer.mode, SanitizeMode::Strip);
        assert_eq!(config.sanitizer.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.upload.max_size_bytes, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(
            config.upload.allowed_types.len(),
            DEFAULT_ALLOWED_FILE_TYPES.len()
        );
    }

    #[test]
    fn load_full_config() {
        let yaml = r#"
logging:
  level: debug
  audit_log_path: /var/log/anes-guardian/audit.jsonl
sanitizer:
  mode: reject
  max_depth: 8
upload:
  allowed_types:
    - image/png
    - application/pdf
  max_size_bytes: 2048
"#;
        let config = load_from_str(yaml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.sanitizer.mode, SanitizeMode::Reject);
        assert_eq!(config.request_guard().max_depth(), 8);
        assert_eq!(config.upload_guard().max_size(), 2048);
        assert_eq!(
            config.upload_guard().allowed_types(),
            ["image/png", "application/pdf"]
        );
    }

    #[test]
    fn reject_unknown_mode() {
        let err = load_from_str("sanitizer:\n  mode: shred\n").unwrap_err();
        assert!(
            format!("{err:#}").contains("YAML deserialization failed"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn reject_zero_max_size() {
        let err = load_from_str("upload:\n  max_size_bytes: 0\n").unwrap_err();
        assert!(err.to_string().contains("greater than zero"), "unexpected error: {err}");
    }

    #[test]
    fn reject_empty_allowed_types() {
        let err = load_from_str("upload:\n  allowed_types: []\n").unwrap_err();
        assert!(err.to_string().contains("must not be empty"), "unexpected error: {err}");
    }

    #[test]
    fn reject_duplicate_types_case_insensitively() {
        let yaml = "upload:\n  allowed_types: [image/png, IMAGE/PNG]\n";
        let err = load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate upload type"), "unexpected error: {err}");
    }

    #[test]
    fn missing_file_is_reported_as_none() {
        let config = load(Path::new("/does/not/exist/anes-guardian.yaml")).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn existing_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("anes-guardian.yaml");
        std::fs::write(&path, "sanitizer:\n  max_depth: 2\n").unwrap();
        let config = load(&path).unwrap().unwrap();
        assert_eq!(config.sanitizer.max_depth, 2);
    }
}
