use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

/// A guardian command with an isolated config and audit log.
fn guardian(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("anes-guardian"));
    cmd.arg("--config")
        .arg(dir.join("missing.yaml"))
        .arg("--audit-log")
        .arg(dir.join("audit.jsonl"));
    cmd
}

fn audit_events(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("audit.jsonl"))
        .unwrap()
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["event_type"].as_str().unwrap().to_string()
        })
        .collect()
}

#[test]
fn help_works() -> Result<(), Box<dyn std::error::Error>> {
    Command::new(assert_cmd::cargo::cargo_bin!("anes-guardian"))
        .arg("--help")
        .assert()
        .success();
    Ok(())
}

#[test]
fn sanitize_file_strips_script() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut tmp = NamedTempFile::new()?;
    write!(
        tmp,
        r#"{{"medicalHistory": ["<script>alert(1)</script>"], "age": 45}}"#
    )?;

    let output = guardian(dir.path())
        .arg("sanitize")
        .arg(tmp.path())
        .output()?;
    assert!(output.status.success());
    let out: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(out, serde_json::json!({ "medicalHistory": [""], "age": 45 }));

    let events = audit_events(dir.path());
    assert!(events.contains(&"injection_detected".to_string()), "{events:?}");
    assert_eq!(events.last().map(String::as_str), Some("process_stopped"));
    Ok(())
}

#[test]
fn sanitize_stdin_reject_mode() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .args(["--mode", "reject", "sanitize"])
        .write_stdin(r#"{"note": "<img src=x onerror=alert('XSS')>"}"#)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("rejected: payload contains 1 injection pattern(s)"));

    let events = audit_events(dir.path());
    assert!(events.contains(&"payload_rejected".to_string()), "{events:?}");
    Ok(())
}

#[test]
fn sanitize_rejects_deep_payload() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .args(["--max-depth", "1", "sanitize"])
        .write_stdin(r#"{"a": {"b": {"c": 1}}}"#)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nesting depth 3 exceeds the limit of 1"));
    Ok(())
}

#[test]
fn sanitize_invalid_json_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .arg("sanitize")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stdin is not valid JSON"));
    Ok(())
}

#[test]
fn html_keeps_allowed_tags() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .arg("html")
        .write_stdin(r#"<p onclick="x()">Dose <span>2 mg</span></p>"#)
        .assert()
        .success()
        .stdout("<p>Dose 2 mg</p>");
    Ok(())
}

#[test]
fn filename_and_sql() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .args(["filename", "../../etc/passwd"])
        .assert()
        .success()
        .stdout("__etc_passwd\n");
    guardian(dir.path())
        .args(["sql", "'; DROP TABLE patients; --"])
        .assert()
        .success()
        .stdout("'; TABLE patients;\n");
    Ok(())
}

#[test]
fn upload_checks_type_and_size() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .args(["upload", "--name", "ECG 1.pdf", "--mime", "application/pdf", "--size", "1024"])
        .assert()
        .success()
        .stdout("ECG_1.pdf\n");
    guardian(dir.path())
        .args(["upload", "--name", "big.pdf", "--mime", "application/pdf", "--size", "10485761"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exceeds the limit"));

    let events = audit_events(dir.path());
    assert!(events.contains(&"upload_accepted".to_string()));
    assert!(events.contains(&"upload_rejected".to_string()));
    Ok(())
}

#[test]
fn phone_and_email_exit_codes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .args(["phone", "13800138000"])
        .assert()
        .success()
        .stdout("valid\n");
    guardian(dir.path())
        .args(["phone", "12345"])
        .assert()
        .code(1)
        .stdout("invalid\n");
    guardian(dir.path())
        .args(["email", "anesthesia@hospital.cn"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn missing_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .env_remove("RUST_LOG")
        .args(["phone", "13800138000"])
        .assert()
        .success()
        .stderr(predicate::str::contains("configuration file not found"));
    Ok(())
}

#[test]
fn format_checks_leave_no_audit_log() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    for args in [
        &["phone", "13800138000"][..],
        &["email", "a@b.cn"],
        &["sql", "select 1"],
        &["filename", "a.pdf"],
    ] {
        guardian(dir.path()).args(args).assert().success();
    }
    guardian(dir.path())
        .arg("depth")
        .write_stdin("{}")
        .assert()
        .success();
    assert!(!dir.path().join("audit.jsonl").exists());
    Ok(())
}

#[test]
fn depth_reports_limit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    guardian(dir.path())
        .arg("depth")
        .write_stdin("[[1]]")
        .assert()
        .success()
        .stdout("depth=2 max_depth=5 secure=true\n");
    Ok(())
}

#[test]
fn config_file_is_honoured() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config = dir.path().join("anes-guardian.yaml");
    std::fs::write(
        &config,
        "sanitizer:\n  mode: reject\nupload:\n  allowed_types: [text/csv]\n",
    )?;

    Command::new(assert_cmd::cargo::cargo_bin!("anes-guardian"))
        .arg("--config")
        .arg(&config)
        .arg("--audit-log")
        .arg(dir.path().join("audit.jsonl"))
        .args(["upload", "--name", "a.pdf", "--mime", "application/pdf", "--size", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not allowed"));
    Ok(())
}
