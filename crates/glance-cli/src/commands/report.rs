//! Presentation of an existing validator report

use super::{emit, presenter, OutputArgs};
use crate::config::GlanceConfig;
use anyhow::{Context, Result};
use glance_core::RawReport;
use glance_report::{Normalizer, ValidationOutcome};
use std::path::{Path, PathBuf};

pub struct ReportArgs {
    pub raw_json: PathBuf,
    pub output: OutputArgs,
}

pub fn run(args: ReportArgs, config: &GlanceConfig) -> Result<()> {
    let raw = load_raw_report(&args.raw_json)?;
    let registry = config.registry(args.output.registry.as_deref())?;
    let policy = config.policy();
    let report = Normalizer::new(&registry, &policy).normalize(raw);

    let location = args.raw_json.display().to_string();
    let mut presenter = presenter(&location, &args.output, config);
    presenter.present(ValidationOutcome::report(report));

    if emit(&mut presenter, &args.output)? {
        std::process::exit(1);
    }

    Ok(())
}

fn load_raw_report(path: &Path) -> Result<RawReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid validator report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_raw_report() {
        let dir = std::env::temp_dir().join(format!("glance_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let good = dir.join("report.json");
        fs::write(
            &good,
            r#"{"issues": {"numErrors": 0, "numWarnings": 1, "numInfos": 0, "numHints": 0,
                "messages": [{"code": "X", "message": "m", "severity": 1, "pointer": "/a"}]}}"#,
        )
        .unwrap();
        let bad = dir.join("bad.json");
        fs::write(&bad, r#"{"issues": {"messages": [{"code": "X", "message": "m", "severity": 9}]}}"#)
            .unwrap();

        let raw = load_raw_report(&good).unwrap();
        assert_eq!(raw.issues.num_warnings, 1);
        assert!(load_raw_report(&bad).is_err());
        assert!(load_raw_report(&dir.join("missing.json")).is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
