//! Diff command implementation.
//! Orchestrates the comparison of two profiles and reports deltas/violations.

use anyhow::{Context, Result};
use colored::*;

use super::analyze::resolve_options;
use super::models::DiffArgs;
use crate::diff::{
    check_thresholds, generate_diff_report, load_thresholds, render_terminal_diff, DiffReport,
    ThresholdConfig, TotalTimeThresholds,
};
use crate::output::write_diff_report;
use crate::parser::load_profile;

/// Execute the diff command
///
/// Returns an error when thresholds fail so the process exits non-zero.
pub fn execute_diff(args: DiffArgs) -> Result<DiffReport> {
    let options = resolve_options(args.options_file.as_deref(), None)?;

    // Step 1: Load profiles
    let baseline =
        load_profile(&args.baseline, &options).context("Failed to read baseline profile")?;
    let comparison =
        load_profile(&args.comparison, &options).context("Failed to read comparison profile")?;

    // Step 2: Generate diff
    let mut report = generate_diff_report(
        &baseline,
        &comparison,
        &display_name(&args.baseline),
        &display_name(&args.comparison),
    );

    // Step 3: Handle thresholds
    let mut thresholds = match &args.threshold_file {
        Some(path) => load_thresholds(path).context("Failed to load threshold file")?,
        None => ThresholdConfig::default(),
    };

    // Override with simple percent if provided
    if let Some(percent) = args.threshold_percent {
        thresholds.total_time = TotalTimeThresholds {
            max_increase_percent: Some(percent),
            max_increase_absolute: None,
        };
        thresholds.validate()?;
    }

    // Step 4: Check violations only if thresholds are set
    if args.threshold_file.is_some() || args.threshold_percent.is_some() {
        check_thresholds(&mut report, &thresholds);
    }

    // Step 5: Write output if requested
    if let Some(path) = &args.output {
        write_diff_report(&report, path).context("Failed to write diff report JSON")?;
        println!(
            "📊 Diff report written to {}",
            path.display().to_string().cyan()
        );
    }

    // Step 6: Terminal summary
    if args.summary {
        println!("{}", render_terminal_diff(&report));
    }

    if report.summary.status == "FAILED" {
        return Err(anyhow::anyhow!(
            "Regression detected against thresholds ({} violations)",
            report.summary.violation_count
        ));
    }

    Ok(report)
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn write_profile(dir: &Path, name: &str, work: u64) -> PathBuf {
        let path = dir.join(name);
        let text = format!(
            r#"{{"nodes": [
                {{"id": 1, "callFrame": {{"functionName": "(root)"}}, "children": [2]}},
                {{"id": 2, "callFrame": {{"functionName": "work", "url": "w.js"}}}}
            ], "startTime": 0, "endTime": {work}, "samples": [2], "timeDeltas": [{work}]}}"#
        );
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_diff_passes_without_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let args = DiffArgs {
            baseline: write_profile(dir.path(), "a.cpuprofile", 1000),
            comparison: write_profile(dir.path(), "b.cpuprofile", 3000),
            output: Some(dir.path().join("report/diff.json")),
            ..Default::default()
        };

        let report = execute_diff(args).unwrap();
        assert_eq!(report.summary.status, "PASSED");
        assert_eq!(report.baseline.name, "a.cpuprofile");
        assert!(dir.path().join("report/diff.json").exists());
    }

    #[test]
    fn test_diff_fails_on_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let args = DiffArgs {
            baseline: write_profile(dir.path(), "a.cpuprofile", 1000),
            comparison: write_profile(dir.path(), "b.cpuprofile", 3000),
            threshold_percent: Some(10.0),
            ..Default::default()
        };

        assert!(execute_diff(args).is_err());
    }
}
