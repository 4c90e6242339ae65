mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config, then merge CLI overrides.
    let loaded = config::load(&cli.config)?;
    let defaulted = loaded.is_none();
    let mut cfg = loaded.unwrap_or_default();

    if let Some(max_depth) = cli.max_depth {
        cfg.sanitizer.max_depth = max_depth;
    }
    if let Some(mode) = cli.mode {
        cfg.sanitizer.mode = mode.into();
    }
    if let Some(ref path) = cli.audit_log {
        cfg.logging.audit_log_path = path.clone();
    }

    // 3. Init tracing-subscriber with JSON format. Stdout carries command
    //    output, so logs go to stderr.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if defaulted {
        config::warn_defaulted(&cli.config);
    }

    info!(
        config_file = %cli.config.display(),
        mode = ?cfg.sanitizer.mode,
        max_depth = cfg.sanitizer.max_depth,
        "anes-guardian starting"
    );

    // 4. Start the audit logger for commands that record outcomes.
    let audit = if cli.command.writes_audit() {
        let (sink, handle) = AuditSink::start(&cfg.logging.audit_log_path)
            .await
            .context("failed to start audit logger")?;
        info!(audit_log = %cfg.logging.audit_log_path.display(), "audit logger started");

        sink.log(AuditEntry::new(
            AuditEventType::ProcessStarted,
            AuditSource::new("anes-guardian"),
            serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
        ))
        .await;

        sink.log(AuditEntry::new(
            AuditEventType::ConfigLoaded,
            AuditSource::new("anes-guardian").with_input(cli.config.display().to_string()),
            serde_json::json!({
                "defaulted": defaulted,
                "mode": format!("{:?}", cfg.sanitizer.mode),
                "max_depth": cfg.sanitizer.max_depth,
                "upload_types": cfg.upload.allowed_types.len(),
                "upload_max_size_bytes": cfg.upload.max_size_bytes,
            }),
        ))
        .await;

        Some((sink, handle))
    } else {
        None
    };

    // 5. Run the command.
    let result = commands::run(&cli.command, &cfg, audit.as_ref().map(|(sink, _)| sink)).await;

    // 6. Log shutdown and drain the audit log before exiting.
    if let Some((sink, handle)) = audit {
        sink.log(AuditEntry::new(
            AuditEventType::ProcessStopped,
            AuditSource::new("anes-guardian"),
            serde_json::json!({ "result": format!("{:?}", result) }),
        ))
        .await;
        sink.close(handle).await;
    }

    result
}
