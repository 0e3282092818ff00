//! Toggle and full-report templates

use crate::normalize::NormalizedReport;
use crate::presenter::ToggleContext;
use glance_core::{Message, Severity};
use std::fmt::Write;

/// Renders the toggle summary and the full report
pub trait ReportTemplates {
    fn toggle(&self, ctx: &ToggleContext) -> String;
    fn full(&self, report: &NormalizedReport, location: &str) -> String;
}

fn counts_summary(counts: &[usize; 4]) -> String {
    format!(
        "{} error(s), {} warning(s), {} info(s), {} hint(s)",
        counts[0], counts[1], counts[2], counts[3]
    )
}

fn section_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Errors",
        Severity::Warning => "Warnings",
        Severity::Info => "Infos",
        Severity::Hint => "Hints",
    }
}

/// Plain-text templates for terminals
#[derive(Debug, Default, Clone, Copy)]
pub struct TextTemplates;

impl TextTemplates {
    fn tag(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
            Severity::Info => "INFO ",
            Severity::Hint => "HINT ",
        }
    }
}

impl ReportTemplates for TextTemplates {
    fn toggle(&self, ctx: &ToggleContext) -> String {
        match ctx {
            ToggleContext::NoIssues => "Validation passed: no issues found.".to_string(),
            ToggleContext::Issues {
                max_severity,
                counts,
                generator,
            } => {
                let mut out = format!("[{}] {}", Self::tag(*max_severity).trim_end(), counts_summary(counts));
                if let Some(generator) = generator {
                    let _ = write!(out, " (generated by {})", generator);
                }
                out
            }
            ToggleContext::Exception { kind, message, .. } => {
                format!("[ERROR] Validation could not run ({}): {}", kind, message)
            }
        }
    }

    fn full(&self, report: &NormalizedReport, location: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Validation report for {}", location);
        if let Some(version) = &report.raw.validator_version {
            let _ = writeln!(out, "Validator: {}", version);
        }
        if let Some(generator) = report.generator_name() {
            let _ = writeln!(out, "Generator: {}", generator);
        } else if !report.raw.generator().is_empty() {
            let _ = writeln!(out, "Generator: {}", report.raw.generator());
        }
        let _ = writeln!(out, "{}", counts_summary(&report.counts()));

        for severity in Severity::ALL {
            let messages = report.bucket(severity);
            if messages.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{}:", section_title(severity));
            for message in messages {
                let _ = writeln!(
                    out,
                    "  [{}] {} {}: {}",
                    Self::tag(severity),
                    message.code,
                    pointer_or_root(message),
                    message.message
                );
            }
        }

        if report.raw.issues.truncated {
            let _ = writeln!(out, "\nMessage list truncated by the validator.");
        }
        out
    }
}

/// HTML templates; all interpolated text is escaped
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTemplates;

impl ReportTemplates for HtmlTemplates {
    fn toggle(&self, ctx: &ToggleContext) -> String {
        match ctx {
            ToggleContext::NoIssues => {
                "<div class=\"report-toggle level--1\"><span>No issues found</span> <a class=\"report-dismiss\">&times;</a></div>"
                    .to_string()
            }
            ToggleContext::Issues {
                max_severity,
                counts,
                generator,
            } => {
                let mut out = format!(
                    "<div class=\"report-toggle level-{}\"><a class=\"report-show\">{}</a>",
                    max_severity.level(),
                    escape_html(&counts_summary(counts))
                );
                if let Some(generator) = generator {
                    let _ = write!(out, " <span class=\"generator\">{}</span>", escape_html(generator));
                }
                out.push_str(" <a class=\"report-dismiss\">&times;</a></div>");
                out
            }
            ToggleContext::Exception { kind, message, level } => format!(
                "<div class=\"report-toggle level-{}\"><span>Validation could not run ({}): {}</span> <a class=\"report-dismiss\">&times;</a></div>",
                level.level(),
                escape_html(&kind.to_string()),
                escape_html(message)
            ),
        }
    }

    fn full(&self, report: &NormalizedReport, location: &str) -> String {
        let title = format!("Validation report: {}", location);
        let mut out = String::new();
        let _ = writeln!(out, "<!DOCTYPE html>");
        let _ = writeln!(out, "<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>", escape_html(&title));
        let _ = writeln!(out, "<h1>{}</h1>", escape_html(&title));

        let _ = writeln!(out, "<table class=\"info\">");
        if let Some(version) = &report.raw.validator_version {
            info_row(&mut out, "Validator", version);
        }
        if let Some(version) = &report.raw.info.version {
            info_row(&mut out, "glTF version", version);
        }
        let generator = report
            .generator_name()
            .map(str::to_string)
            .unwrap_or_else(|| report.raw.generator().to_string());
        if !generator.is_empty() {
            info_row(&mut out, "Generator", &generator);
        }
        if let Some(docs) = report.generator.as_ref().and_then(|g| g.entry.docs.as_ref()) {
            info_row(&mut out, "Generator docs", docs);
        }
        info_row(&mut out, "Issues", &counts_summary(&report.counts()));
        let _ = writeln!(out, "</table>");

        for severity in Severity::ALL {
            let messages = report.bucket(severity);
            if messages.is_empty() {
                continue;
            }
            let _ = writeln!(out, "<h2 class=\"level-{}\">{}</h2>", severity.level(), section_title(severity));
            let _ = writeln!(out, "<table class=\"messages\"><tr><th>Code</th><th>Message</th><th>Pointer</th></tr>");
            for message in messages {
                let _ = writeln!(
                    out,
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&message.code),
                    escape_html(&message.message),
                    escape_html(pointer_or_root(message))
                );
            }
            let _ = writeln!(out, "</table>");
        }

        if report.raw.issues.truncated {
            let _ = writeln!(out, "<p>Message list truncated by the validator.</p>");
        }
        let _ = writeln!(out, "</body></html>");
        out
    }
}

fn info_row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "<tr><th>{}</th><td>{}</td></tr>",
        escape_html(label),
        escape_html(value)
    );
}

fn pointer_or_root(message: &Message) -> &str {
    if message.pointer.is_empty() {
        "/"
    } else {
        &message.pointer
    }
}

/// Escape text for inclusion in HTML element content and attributes
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
