//! Append-only structured JSON-lines audit logging for AnesGuardian's
//! request-boundary decisions.
//!
//! Every rejected payload, detected injection attempt and upload decision is
//! serialised as a single newline-terminated JSON object and appended to a log
//! file, producing a [JSON Lines](https://jsonlines.org/) stream that is easy
//! to ship, parse, and replay.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (sink, _handle) = AuditSink::start("/var/log/anes-guardian/audit.jsonl").await?;
//!
//! sink.log(AuditEntry::new(
//!     AuditEventType::PayloadRejected,
//!     AuditSource::new("request-guard"),
//!     serde_json::json!({"reason": "nested too deep"}),
//! ))
//! .await;
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod sink;
pub mod writer;

// Re-export primary public types at the crate root for convenience.
pub use entry::{AuditEntry, AuditEventType, AuditSource, FindingRecord};
pub use sink::AuditSink;
pub use writer::{AuditWriteError, AuditWriter};
