use serde::{Deserialize, Serialize};

/// A single audit log entry representing a boundary decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: uuid::Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_type: AuditEventType,
    pub source: AuditSource,
    pub details: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<FindingRecord>,
}

impl AuditEntry {
    /// Create a new `AuditEntry` with an auto-generated UUID v4 and the current
    /// UTC timestamp. The caller supplies the event type, source, and
    /// free-form details JSON value. `findings` starts empty.
    pub fn new(
        event_type: AuditEventType,
        source: AuditSource,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            event_type,
            source,
            details,
            findings: Vec::new(),
        }
    }

    /// Attach injection findings to this entry, consuming and returning
    /// `self` for builder-style usage.
    pub fn with_findings(mut self, findings: Vec<FindingRecord>) -> Self {
        self.findings = findings;
        self
    }
}

/// The category of audit event being recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    ProcessStarted,
    ProcessStopped,
    ConfigLoaded,
    PayloadSanitized,
    PayloadRejected,
    InjectionDetected,
    UploadAccepted,
    UploadRejected,
}

/// Identifies the component and the input the event is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSource {
    pub component: String,
    /// Where the input came from (a file path, `stdin`, a form field).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AuditSource {
    /// Convenience constructor that only requires the component name. All
    /// optional fields default to `None`.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            input: None,
            request_id: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

/// One injection pattern found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingRecord {
    /// JSON pointer to the offending string leaf.
    pub path: String,
    pub pattern: String,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_serializes_snake_case() {
        let json = serde_json::to_string(&AuditEventType::PayloadRejected).unwrap();
        assert_eq!(json, "\"payload_rejected\"");
    }

    #[test]
    fn empty_optionals_are_omitted() {
        let entry = AuditEntry::new(
            AuditEventType::ProcessStarted,
            AuditSource::new("anes-guardian"),
            serde_json::json!({}),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("findings").is_none());
        assert!(json["source"].get("input").is_none());
        assert!(json["source"].get("request_id").is_none());
    }

    #[test]
    fn findings_round_trip() {
        let entry = AuditEntry::new(
            AuditEventType::InjectionDetected,
            AuditSource::new("request-guard").with_input("stdin"),
            serde_json::json!({ "mode": "strip" }),
        )
        .with_findings(vec![FindingRecord {
            path: "/medicalHistory/0".to_string(),
            pattern: "script_element".to_string(),
            category: "ScriptInjection".to_string(),
        }]);

        let line = serde_json::to_string(&entry).unwrap();
        let back: AuditEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back.id, entry.id);
        assert_eq!(back.event_type, AuditEventType::InjectionDetected);
        assert_eq!(back.source.input.as_deref(), Some("stdin"));
        assert_eq!(back.findings, entry.findings);
    }
}
