//! Validator report types
//!
//! The shapes mirror the JSON report emitted by the Khronos glTF validator,
//! so reports produced elsewhere can be loaded with `serde_json` directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity, in fixed order from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Error = 0,
    Warning = 1,
    Info = 2,
    Hint = 3,
}

impl Severity {
    /// All levels in bucketing order
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Hint,
    ];

    /// Numeric level (0 = Error .. 3 = Hint)
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Lowercase label used in templates
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, String> {
        match value {
            0 => Ok(Severity::Error),
            1 => Ok(Severity::Warning),
            2 => Ok(Severity::Info),
            3 => Ok(Severity::Hint),
            other => Err(format!("invalid severity level: {}", other)),
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity.level()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single validator diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    /// JSON pointer into the source document
    #[serde(default)]
    pub pointer: String,
    /// Byte offset, for diagnostics raised on GLB framing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Message {
    pub fn new(
        code: impl Into<String>,
        pointer: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            pointer: pointer.into(),
            offset: None,
        }
    }
}

/// Issue summary and message list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issues {
    #[serde(default)]
    pub num_errors: usize,
    #[serde(default)]
    pub num_warnings: usize,
    #[serde(default)]
    pub num_infos: usize,
    #[serde(default)]
    pub num_hints: usize,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub truncated: bool,
}

impl Issues {
    /// Build issues with counters computed from the messages
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut issues = Issues {
            messages,
            ..Default::default()
        };
        for message in &issues.messages {
            match message.severity {
                Severity::Error => issues.num_errors += 1,
                Severity::Warning => issues.num_warnings += 1,
                Severity::Info => issues.num_infos += 1,
                Severity::Hint => issues.num_hints += 1,
            }
        }
        issues
    }

    /// Reported count for one severity level
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.num_errors,
            Severity::Warning => self.num_warnings,
            Severity::Info => self.num_infos,
            Severity::Hint => self.num_hints,
        }
    }

    pub fn total(&self) -> usize {
        self.num_errors + self.num_warnings + self.num_infos + self.num_hints
    }
}

/// An external or embedded resource referenced by the asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub pointer: String,
    /// One of `external`, `data-uri`, `glb`, `buffer-view`
    pub storage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_length: Option<u64>,
}

/// Asset statistics reported alongside the issues
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_morph_targets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_skins: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_textures: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_default_scene: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_call_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_vertex_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_triangle_count: Option<u64>,
}

/// Validator output before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_version: Option<String>,
    #[serde(default)]
    pub info: ReportInfo,
    #[serde(default)]
    pub issues: Issues,
}

impl RawReport {
    /// Generator string from the asset info, empty when absent
    pub fn generator(&self) -> &str {
        self.info.generator.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Info < Severity::Hint);
        assert_eq!(Severity::ALL[1], Severity::Warning);
        assert_eq!(Severity::Hint.level(), 3);
    }

    #[test]
    fn test_severity_from_u8_rejects_unknown() {
        assert_eq!(Severity::try_from(2).unwrap(), Severity::Info);
        assert!(Severity::try_from(4).is_err());
    }

    #[test]
    fn test_parse_validator_json() {
        let json = r#"{
            "uri": "scene.gltf",
            "mimeType": "model/gltf+json",
            "validatorVersion": "2.0.0-dev.3.8",
            "issues": {
                "numErrors": 1,
                "numWarnings": 0,
                "numInfos": 0,
                "numHints": 1,
                "messages": [
                    {"code": "ACCESSOR_NON_UNIT", "message": "not unit", "severity": 0, "pointer": "/accessors/2"},
                    {"code": "UNUSED_OBJECT", "message": "unused", "severity": 3, "pointer": "/meshes/1"}
                ],
                "truncated": false
            },
            "info": {
                "version": "2.0",
                "generator": "COLLADA2GLTF v2.1.4",
                "resources": [],
                "animationCount": 0
            }
        }"#;
        let report: RawReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.generator(), "COLLADA2GLTF v2.1.4");
        assert_eq!(report.issues.messages.len(), 2);
        assert_eq!(report.issues.messages[1].severity, Severity::Hint);
        assert_eq!(report.issues.count(Severity::Error), 1);
        assert_eq!(report.info.animation_count, Some(0));
    }

    #[test]
    fn test_missing_generator_is_empty() {
        let report = RawReport::default();
        assert_eq!(report.generator(), "");
    }

    #[test]
    fn test_issues_from_messages_counts() {
        let issues = Issues::from_messages(vec![
            Message::new("A", "/a", Severity::Warning, "a"),
            Message::new("B", "/b", Severity::Warning, "b"),
            Message::new("C", "/c", Severity::Hint, "c"),
        ]);
        assert_eq!(issues.num_errors, 0);
        assert_eq!(issues.num_warnings, 2);
        assert_eq!(issues.num_hints, 1);
        assert_eq!(issues.total(), 3);
    }

    #[test]
    fn test_severity_serializes_as_integer() {
        let msg = Message::new("X", "/x", Severity::Info, "m");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["severity"], serde_json::json!(2));
        assert!(value.get("offset").is_none());
    }
}
