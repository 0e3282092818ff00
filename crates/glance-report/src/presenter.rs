//! Toggle summary and full-report presentation
//!
//! The presenter holds at most one live report. Presenting a new outcome
//! replaces it wholesale; presenting an exception clears it.

use crate::normalize::NormalizedReport;
use crate::outcome::{ExceptionKind, ValidationOutcome};
use crate::surface::ReportSurface;
use crate::templates::ReportTemplates;
use glance_core::{Result, Severity};

/// Visibility of the toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Hidden,
    Shown,
}

/// Actions the toggle can trigger once bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    ShowFull,
    Dismiss,
}

/// Data the toggle template is rendered from
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleContext {
    NoIssues,
    Issues {
        max_severity: Severity,
        counts: [usize; 4],
        generator: Option<String>,
    },
    Exception {
        kind: ExceptionKind,
        message: String,
        level: Severity,
    },
}

impl ToggleContext {
    pub fn from_outcome(outcome: &ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Report(report) => Self::from_report(report),
            ValidationOutcome::Exception(e) => ToggleContext::Exception {
                kind: e.kind,
                message: e.message.clone(),
                level: e.level,
            },
        }
    }

    pub fn from_report(report: &NormalizedReport) -> Self {
        match report.max_severity {
            None => ToggleContext::NoIssues,
            Some(max_severity) => ToggleContext::Issues {
                max_severity,
                counts: report.counts(),
                generator: report.generator_name().map(str::to_string),
            },
        }
    }
}

/// Renders outcomes into a toggle and opens full reports on a surface
pub struct Presenter<T, S> {
    templates: T,
    surface: S,
    location: String,
    report: Option<NormalizedReport>,
    context: Option<ToggleContext>,
    toggle: Option<String>,
    state: ToggleState,
}

impl<T: ReportTemplates, S: ReportSurface> Presenter<T, S> {
    pub fn new(templates: T, surface: S) -> Self {
        Self {
            templates,
            surface,
            location: String::new(),
            report: None,
            context: None,
            toggle: None,
            state: ToggleState::Hidden,
        }
    }

    /// Location context passed to the full report by bound `ShowFull` actions
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Render and show the toggle for an outcome, rebinding its actions
    pub fn present(&mut self, outcome: ValidationOutcome) -> &str {
        let context = ToggleContext::from_outcome(&outcome);
        let toggle = self.templates.toggle(&context);

        self.report = match outcome {
            ValidationOutcome::Report(report) => Some(*report),
            ValidationOutcome::Exception(e) => {
                log::info!("Presenting {} failure: {}", e.kind, e.message);
                None
            }
        };
        self.context = Some(context);
        self.state = ToggleState::Shown;
        self.toggle.insert(toggle).as_str()
    }

    /// Open the full report; `None` when no report is held
    pub fn show_full(&mut self, location: &str) -> Result<Option<String>> {
        let Some(report) = self.report.as_ref() else {
            log::debug!("No report held, ignoring full report request");
            return Ok(None);
        };

        let document = self.templates.full(report, location);
        let title = format!("Validation report: {}", location);
        self.surface.open(&title, &document).map(Some)
    }

    pub fn dismiss(&mut self) {
        self.state = ToggleState::Hidden;
    }

    /// Dispatch a bound toggle action; ignored until something was presented
    pub fn handle(&mut self, action: ToggleAction) -> Result<Option<String>> {
        if self.toggle.is_none() {
            log::debug!("Toggle not bound, ignoring {:?}", action);
            return Ok(None);
        }

        match action {
            ToggleAction::ShowFull => {
                let location = self.location.clone();
                self.show_full(&location)
            }
            ToggleAction::Dismiss => {
                self.dismiss();
                Ok(None)
            }
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Last rendered toggle
    pub fn toggle(&self) -> Option<&str> {
        self.toggle.as_deref()
    }

    pub fn context(&self) -> Option<&ToggleContext> {
        self.context.as_ref()
    }

    pub fn report(&self) -> Option<&NormalizedReport> {
        self.report.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn templates(&self) -> &T {
        &self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregationPolicy;
    use crate::normalize::Normalizer;
    use crate::registry::GeneratorRegistry;
    use crate::surface::MemorySurface;
    use crate::templates::TextTemplates;
    use glance_core::{GlanceError, Issues, Message, RawReport};

    fn presenter() -> Presenter<TextTemplates, MemorySurface> {
        Presenter::new(TextTemplates, MemorySurface::new()).with_location("viewer")
    }

    fn report(messages: Vec<Message>) -> ValidationOutcome {
        let registry = GeneratorRegistry::new();
        let policy = AggregationPolicy::default();
        let raw = RawReport {
            issues: Issues::from_messages(messages),
            ..Default::default()
        };
        ValidationOutcome::report(Normalizer::new(&registry, &policy).normalize(raw))
    }

    fn failure() -> ValidationOutcome {
        ValidationOutcome::exception(&GlanceError::RootFetch {
            url: "duck.gltf".to_string(),
            reason: "404".to_string(),
        })
    }

    #[test]
    fn test_handle_ignored_before_present() {
        let mut p = presenter();
        assert_eq!(p.handle(ToggleAction::ShowFull).unwrap(), None);
        p.handle(ToggleAction::Dismiss).unwrap();
        assert_eq!(p.state(), ToggleState::Hidden);
        assert!(p.surface().is_empty());
    }

    #[test]
    fn test_present_no_issues() {
        let mut p = presenter();
        let toggle = p.present(report(vec![])).to_string();

        assert_eq!(toggle, TextTemplates.toggle(&ToggleContext::NoIssues));
        assert_eq!(p.context(), Some(&ToggleContext::NoIssues));
        assert_eq!(p.state(), ToggleState::Shown);
        assert_eq!(p.report().unwrap().max_severity_level(), -1);
    }

    #[test]
    fn test_show_full_opens_surface_without_changing_state() {
        let mut p = presenter();
        p.present(report(vec![Message::new("UNUSED_OBJECT", "/meshes/0", Severity::Hint, "unused")]));

        let locator = p.handle(ToggleAction::ShowFull).unwrap();
        assert_eq!(locator.as_deref(), Some("memory:1"));
        assert_eq!(p.state(), ToggleState::Shown);

        let (title, document) = &p.surface().documents()[0];
        assert!(title.contains("viewer"));
        assert!(document.contains("UNUSED_OBJECT"));
    }

    #[test]
    fn test_exception_clears_report() {
        let mut p = presenter();
        p.present(report(vec![]));
        assert!(p.report().is_some());

        let toggle = p.present(failure()).to_string();
        assert!(toggle.contains("[ERROR]"));
        assert!(p.report().is_none());
        assert!(matches!(
            p.context(),
            Some(ToggleContext::Exception { kind: ExceptionKind::RootFetch, level: Severity::Error, .. })
        ));

        assert_eq!(p.show_full("viewer").unwrap(), None);
        assert!(p.surface().is_empty());
    }

    #[test]
    fn test_dismiss_then_present_shows_again() {
        let mut p = presenter();
        p.present(failure());
        p.handle(ToggleAction::Dismiss).unwrap();
        assert_eq!(p.state(), ToggleState::Hidden);

        p.present(report(vec![]));
        assert_eq!(p.state(), ToggleState::Shown);
    }

    #[test]
    fn test_issues_context_counts() {
        let mut p = presenter();
        p.present(report(vec![
            Message::new("A", "/a", Severity::Warning, "a"),
            Message::new("B", "/b", Severity::Hint, "b"),
        ]));
        assert_eq!(
            p.context(),
            Some(&ToggleContext::Issues {
                max_severity: Severity::Warning,
                counts: [0, 1, 0, 1],
                generator: None,
            })
        );
    }
}
