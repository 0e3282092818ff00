//! Terminal result of one validation run

use crate::normalize::NormalizedReport;
use glance_core::{GlanceError, Severity};
use serde::Serialize;
use std::fmt;

/// Which stage of the pipeline failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    RootFetch,
    ResourceResolution,
    ValidatorInvocation,
    Other,
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExceptionKind::RootFetch => "root fetch",
            ExceptionKind::ResourceResolution => "resource resolution",
            ExceptionKind::ValidatorInvocation => "validator invocation",
            ExceptionKind::Other => "internal",
        };
        write!(f, "{}", label)
    }
}

/// A failure captured in place of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedException {
    pub kind: ExceptionKind,
    pub message: String,
    /// Always `Severity::Error`
    pub level: Severity,
}

impl CapturedException {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            level: Severity::Error,
        }
    }

    pub fn from_error(err: &GlanceError) -> Self {
        let kind = match err {
            GlanceError::RootFetch { .. } => ExceptionKind::RootFetch,
            GlanceError::ResourceResolution { .. } => ExceptionKind::ResourceResolution,
            GlanceError::ValidatorInvocation(_) => ExceptionKind::ValidatorInvocation,
            _ => ExceptionKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<GlanceError> for CapturedException {
    fn from(err: GlanceError) -> Self {
        Self::from_error(&err)
    }
}

/// Either a normalized report or a captured exception, never both
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Report(Box<NormalizedReport>),
    Exception(CapturedException),
}

impl ValidationOutcome {
    pub fn report(report: NormalizedReport) -> Self {
        ValidationOutcome::Report(Box::new(report))
    }

    pub fn exception(err: &GlanceError) -> Self {
        ValidationOutcome::Exception(CapturedException::from_error(err))
    }

    pub fn as_report(&self) -> Option<&NormalizedReport> {
        match self {
            ValidationOutcome::Report(report) => Some(report),
            ValidationOutcome::Exception(_) => None,
        }
    }

    pub fn as_exception(&self) -> Option<&CapturedException> {
        match self {
            ValidationOutcome::Exception(e) => Some(e),
            ValidationOutcome::Report(_) => None,
        }
    }

    /// True when the run failed or the report carries errors
    pub fn is_failure(&self) -> bool {
        match self {
            ValidationOutcome::Report(report) => report.max_severity == Some(Severity::Error),
            ValidationOutcome::Exception(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_error() {
        let err = GlanceError::RootFetch {
            url: "duck.gltf".to_string(),
            reason: "404".to_string(),
        };
        let captured = CapturedException::from_error(&err);
        assert_eq!(captured.kind, ExceptionKind::RootFetch);
        assert_eq!(captured.level, Severity::Error);
        assert!(captured.message.contains("duck.gltf"));

        let other: CapturedException = GlanceError::ConfigError("bad".to_string()).into();
        assert_eq!(other.kind, ExceptionKind::Other);
    }

    #[test]
    fn test_exception_outcome_is_failure() {
        let outcome = ValidationOutcome::exception(&GlanceError::ValidatorInvocation(
            "boom".to_string(),
        ));
        assert!(outcome.is_failure());
        assert!(outcome.as_report().is_none());
        assert_eq!(
            outcome.as_exception().unwrap().kind,
            ExceptionKind::ValidatorInvocation
        );
    }
}
