//! CLI command implementations

pub mod registry;
pub mod report;
pub mod validate;

use crate::config::GlanceConfig;
use anyhow::Result;
use clap::Args;
use glance_core::Severity;
use glance_report::{
    FileSurface, HtmlTemplates, NormalizedReport, Presenter, ReportTemplates, TextTemplates,
    ToggleAction, ToggleContext,
};
use serde_json::json;
use std::path::PathBuf;

/// Output options shared by `validate` and `report`
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Also write the full HTML report and print its path
    #[arg(long)]
    pub full: bool,

    /// Directory for full reports
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Generator registry file (TOML or JSON)
    #[arg(long)]
    pub registry: Option<PathBuf>,
}

/// Text toggle on the terminal, HTML for the full report
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTemplates;

impl ReportTemplates for ConsoleTemplates {
    fn toggle(&self, ctx: &ToggleContext) -> String {
        TextTemplates.toggle(ctx)
    }

    fn full(&self, report: &NormalizedReport, location: &str) -> String {
        HtmlTemplates.full(report, location)
    }
}

pub type ConsolePresenter = Presenter<ConsoleTemplates, FileSurface>;

pub fn presenter(location: &str, output: &OutputArgs, config: &GlanceConfig) -> ConsolePresenter {
    let dir = output.out.clone().unwrap_or_else(|| config.report_dir.clone());
    Presenter::new(ConsoleTemplates, FileSurface::new(dir)).with_location(location)
}

/// Print what the presenter holds; returns whether the command should fail
pub fn emit(presenter: &mut ConsolePresenter, output: &OutputArgs) -> Result<bool> {
    let json_output = output.format == "json";
    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome_json(presenter)?)?);
    } else {
        println!("{}", presenter.toggle().unwrap_or_default());
    }

    if output.full {
        match presenter.handle(ToggleAction::ShowFull)? {
            Some(path) if json_output => eprintln!("Full report written to {}", path),
            Some(path) => println!("Full report written to {}", path),
            None => eprintln!("No report to show."),
        }
    }

    Ok(is_failure(presenter))
}

fn is_failure(presenter: &ConsolePresenter) -> bool {
    presenter
        .report()
        .map(|report| report.max_severity == Some(Severity::Error))
        .unwrap_or(true)
}

fn outcome_json(presenter: &ConsolePresenter) -> Result<serde_json::Value> {
    if let Some(report) = presenter.report() {
        return Ok(serde_json::to_value(report)?);
    }

    Ok(match presenter.context() {
        Some(ToggleContext::Exception {
            kind,
            message,
            level,
        }) => json!({
            "exception": {
                "kind": kind,
                "message": message,
                "level": level,
            }
        }),
        _ => serde_json::Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_core::GlanceError;
    use glance_report::ValidationOutcome;

    fn console() -> ConsolePresenter {
        let dir = std::env::temp_dir().join(format!("glance_test_{}", uuid::Uuid::new_v4()));
        Presenter::new(ConsoleTemplates, FileSurface::new(dir)).with_location("duck.gltf")
    }

    #[test]
    fn test_exception_json_and_failure() {
        let mut presenter = console();
        presenter.present(ValidationOutcome::exception(&GlanceError::RootFetch {
            url: "duck.gltf".to_string(),
            reason: "404".to_string(),
        }));

        let json = outcome_json(&presenter).unwrap();
        assert_eq!(json["exception"]["kind"], "root_fetch");
        assert_eq!(json["exception"]["level"], 0);
        assert!(is_failure(&presenter));
    }

    #[test]
    fn test_nothing_presented_is_failure() {
        let presenter = console();
        assert!(is_failure(&presenter));
        assert_eq!(outcome_json(&presenter).unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_console_templates_mix_text_and_html() {
        let toggle = ConsoleTemplates.toggle(&ToggleContext::NoIssues);
        assert!(!toggle.contains('<'));
    }
}
