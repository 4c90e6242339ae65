use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource, FindingRecord};
use input_sanitizer::{
    is_secure_object, is_valid_email, is_valid_phone, nesting_depth, sanitize_filename,
    sanitize_html, sanitize_sql_input, PayloadRejection, ValueFinding,
};

use crate::cli::Command;
use crate::config::Config;

/// Exit status for a value that failed a format check.
const EXIT_INVALID: u8 = 1;

/// Exit status for a payload or upload the guard refused.
const EXIT_REJECTED: u8 = 2;

/// Dispatch a parsed subcommand.
///
/// `audit` is only consulted by the commands for which
/// [`Command::writes_audit`] holds.
pub async fn run(command: &Command, cfg: &Config, audit: Option<&AuditSink>) -> Result<ExitCode> {
    match command {
        Command::Sanitize { file, pretty } => {
            let label = input_label(file.as_deref());
            let text = read_input(file.as_deref()).await?;
            let payload: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{label} is not valid JSON"))?;
            sanitize(&payload, *pretty, &label, cfg, audit).await
        }
        Command::Html { file } => {
            let text = read_input(file.as_deref()).await?;
            print!("{}", sanitize_html(&text));
            Ok(ExitCode::SUCCESS)
        }
        Command::Sql { text } => {
            println!("{}", sanitize_sql_input(text));
            Ok(ExitCode::SUCCESS)
        }
        Command::Filename { name } => {
            println!("{}", sanitize_filename(name));
            Ok(ExitCode::SUCCESS)
        }
        Command::Upload { name, mime, size } => upload(name, mime, *size, cfg, audit).await,
        Command::Email { address } => Ok(report_validity(is_valid_email(address))),
        Command::Phone { number } => Ok(report_validity(is_valid_phone(number))),
        Command::Depth { file } => {
            let label = input_label(file.as_deref());
            let text = read_input(file.as_deref()).await?;
            let payload: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{label} is not valid JSON"))?;
            let max_depth = cfg.sanitizer.max_depth;
            let secure = is_secure_object(&payload, max_depth);
            println!(
                "depth={} max_depth={} secure={}",
                nesting_depth(&payload),
                max_depth,
                secure
            );
            Ok(if secure {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_REJECTED)
            })
        }
    }
}

async fn sanitize(
    payload: &serde_json::Value,
    pretty: bool,
    label: &str,
    cfg: &Config,
    audit: Option<&AuditSink>,
) -> Result<ExitCode> {
    let guard = cfg.request_guard();
    let source = AuditSource::new("request-guard").with_input(label);

    match guard.admit(payload) {
        Ok(admitted) => {
            let out = if pretty {
                serde_json::to_string_pretty(&admitted.value)?
            } else {
                serde_json::to_string(&admitted.value)?
            };
            println!("{out}");

            let event_type = if admitted.has_findings() {
                AuditEventType::InjectionDetected
            } else {
                AuditEventType::PayloadSanitized
            };
            record(
                audit,
                AuditEntry::new(
                    event_type,
                    source,
                    serde_json::json!({
                        "mode": format!("{:?}", guard.mode()),
                        "finding_count": admitted.findings.len(),
                    }),
                )
                .with_findings(finding_records(&admitted.findings)),
            )
            .await;

            info!(
                input = label,
                findings = admitted.findings.len(),
                "payload admitted"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(rejection) => {
            eprintln!("rejected: {rejection}");

            let findings = match &rejection {
                PayloadRejection::InjectionDetected { findings } => finding_records(findings),
                PayloadRejection::TooDeep { .. } => Vec::new(),
            };
            record(
                audit,
                AuditEntry::new(
                    AuditEventType::PayloadRejected,
                    source,
                    serde_json::json!({ "reason": rejection.to_string() }),
                )
                .with_findings(findings),
            )
            .await;

            info!(input = label, %rejection, "payload rejected");
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}

async fn upload(
    name: &str,
    mime: &str,
    size: u64,
    cfg: &Config,
    audit: Option<&AuditSink>,
) -> Result<ExitCode> {
    let source = AuditSource::new("upload-guard").with_input(name);

    match cfg.upload_guard().admit(name, mime, size) {
        Ok(stored) => {
            println!("{stored}");
            record(
                audit,
                AuditEntry::new(
                    AuditEventType::UploadAccepted,
                    source,
                    serde_json::json!({ "stored_as": stored, "mime_type": mime, "size": size }),
                ),
            )
            .await;
            Ok(ExitCode::SUCCESS)
        }
        Err(rejection) => {
            eprintln!("rejected: {rejection}");
            record(
                audit,
                AuditEntry::new(
                    AuditEventType::UploadRejected,
                    source,
                    serde_json::json!({
                        "reason": rejection.to_string(),
                        "mime_type": mime,
                        "size": size,
                    }),
                ),
            )
            .await;
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}

async fn record(audit: Option<&AuditSink>, entry: AuditEntry) {
    match audit {
        Some(sink) => sink.log(entry).await,
        None => debug!(event_type = ?entry.event_type, "audit logger not running; entry dropped"),
    }
}

fn report_validity(valid: bool) -> ExitCode {
    if valid {
        println!("valid");
        ExitCode::SUCCESS
    } else {
        println!("invalid");
        ExitCode::from(EXIT_INVALID)
    }
}

fn finding_records(findings: &[ValueFinding]) -> Vec<FindingRecord> {
    findings
        .iter()
        .map(|f| FindingRecord {
            path: f.path.clone(),
            pattern: f.finding.pattern_name.clone(),
            category: f.finding.category.clone(),
        })
        .collect()
}

fn input_label(file: Option<&Path>) -> String {
    file.map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string())
}

/// Read the whole of `file`, or stdin when no file is given.
async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            debug!(path = %path.display(), "reading input file");
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
