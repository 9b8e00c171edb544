//! Core diff engine implementation.
//! Compares two parsed profiles and wraps the result in a report.

use chrono::Utc;
use log::debug;

use crate::parser::schema::ParsedProfile;
use crate::utils::config::DIFF_VERSION;

use super::normalizer::{
    are_profiles_identical, compare_categories, compare_functions, compare_stats, top_improvements,
    top_regressions,
};
use super::schema::{DiffReport, DiffSummary, ProfileComparison, ProfileDiff, ProfileMetadata};

/// Compare two profiles
///
/// Pure and side-effect free: both inputs are only read, and swapping
/// them swaps added/removed and flips every sign.
///
/// # Arguments
/// * `baseline` - The profile to compare against
/// * `comparison` - The profile being evaluated
pub fn compare_profiles(baseline: &ParsedProfile, comparison: &ParsedProfile) -> ProfileComparison {
    let diff = compare_functions(
        &baseline.hot_functions,
        &comparison.hot_functions,
        baseline.stats.total_time,
        comparison.stats.total_time,
    );

    debug!(
        "Diff: {} added, {} removed, {} changed",
        diff.added_functions.len(),
        diff.removed_functions.len(),
        diff.changed_functions.len()
    );

    ProfileComparison {
        category_comparison: compare_categories(
            &baseline.stats.categories,
            &comparison.stats.categories,
        ),
        stats_comparison: compare_stats(&baseline.stats, &comparison.stats),
        top_regressions: top_regressions(&diff.changed_functions),
        top_improvements: top_improvements(&diff.changed_functions),
        diff,
    }
}

/// Function diff when both profiles are present, `None` otherwise
pub fn diff_profiles(
    baseline: Option<&ParsedProfile>,
    comparison: Option<&ParsedProfile>,
) -> Option<ProfileDiff> {
    match (baseline, comparison) {
        (Some(baseline), Some(comparison)) => Some(compare_profiles(baseline, comparison).diff),
        _ => None,
    }
}

/// Generate a complete diff report comparing two profiles
///
/// # Arguments
/// * `baseline` / `comparison` - Parsed profiles
/// * `baseline_name` / `comparison_name` - Labels shown in the report
///
/// # Returns
/// Complete DiffReport; thresholds are applied separately with
/// `check_thresholds`
///
/// # Example
/// ```ignore
/// let baseline = load_profile("before.cpuprofile", &options)?;
/// let comparison = load_profile("after.cpuprofile", &options)?;
/// let report = generate_diff_report(&baseline, &comparison, "before", "after");
/// ```
pub fn generate_diff_report(
    baseline: &ParsedProfile,
    comparison: &ParsedProfile,
    baseline_name: &str,
    comparison_name: &str,
) -> DiffReport {
    let deltas = compare_profiles(baseline, comparison);

    let mut summary = DiffSummary::default();
    if are_profiles_identical(baseline, comparison) {
        summary.warning = Some("Baseline and comparison profiles are identical".to_string());
    }

    DiffReport {
        diff_version: DIFF_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        baseline: metadata(baseline, baseline_name),
        comparison: metadata(comparison, comparison_name),
        deltas,
        threshold_violations: Vec::new(), // Will be populated by check_thresholds
        summary,
    }
}

fn metadata(profile: &ParsedProfile, name: &str) -> ProfileMetadata {
    let name = if name.is_empty() {
        profile.profile.title.clone().unwrap_or_default()
    } else {
        name.to_string()
    };

    ProfileMetadata {
        name,
        total_time: profile.stats.total_time,
        total_samples: profile.stats.total_samples,
        total_nodes: profile.stats.total_nodes,
        start_time: profile.profile.start_time,
        end_time: profile.profile.end_time,
    }
}
