//! Profile normalization and delta calculation.
//!
//! Handles the math for computing differences between profiles,
//! including edge cases like division by zero.

use std::collections::HashMap;

use crate::aggregator::{CategoryStats, HotFunction, ProfileStats};
use crate::parser::schema::ParsedProfile;
use crate::utils::config::{CHANGE_ABSOLUTE_THRESHOLD, CHANGE_PERCENT_THRESHOLD, TOP_CHANGES};

use super::schema::{CategoryComparison, FunctionDiff, MetricDelta, ProfileDiff, StatsComparison};

/// Hot functions keyed by `name|url|line`, in first-seen order
///
/// The same key at several call sites merges into one entry: self time,
/// total time and hit count add up; the first entry's metadata is kept.
pub fn index_functions(functions: &[HotFunction]) -> Vec<(String, HotFunction)> {
    let mut indexed: Vec<(String, HotFunction)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for function in functions {
        let key = function.diff_key();
        match positions.get(&key) {
            Some(&i) => {
                let merged = &mut indexed[i].1;
                merged.self_time += function.self_time;
                merged.total_time += function.total_time;
                merged.self_percentage += function.self_percentage;
                merged.total_percentage += function.total_percentage;
                merged.hit_count += function.hit_count;
            }
            None => {
                positions.insert(key.clone(), indexed.len());
                indexed.push((key, function.clone()));
            }
        }
    }

    indexed
}

/// Percentage change of a common function's self time
///
/// A function that had no self time and now has some counts as +100%.
pub fn self_time_diff_percentage(baseline: f64, comparison: f64) -> f64 {
    if baseline > 0.0 {
        ((comparison - baseline) / baseline) * 100.0
    } else if comparison > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Whether a change is large enough to report
pub fn is_significant_change(diff_percentage: f64, diff: f64) -> bool {
    diff_percentage.abs() > CHANGE_PERCENT_THRESHOLD || diff.abs() > CHANGE_ABSOLUTE_THRESHOLD
}

/// Compare hot functions of two profiles
///
/// # Arguments
/// * `baseline` - Hot functions of the baseline profile
/// * `comparison` - Hot functions of the comparison profile
/// * `baseline_total` / `comparison_total` - Root total times
///
/// # Returns
/// ProfileDiff with added, removed and significantly changed functions
pub fn compare_functions(
    baseline: &[HotFunction],
    comparison: &[HotFunction],
    baseline_total: f64,
    comparison_total: f64,
) -> ProfileDiff {
    let baseline_index = index_functions(baseline);
    let comparison_index = index_functions(comparison);

    let baseline_lookup: HashMap<&str, &HotFunction> =
        baseline_index.iter().map(|(k, f)| (k.as_str(), f)).collect();
    let comparison_lookup: HashMap<&str, &HotFunction> =
        comparison_index.iter().map(|(k, f)| (k.as_str(), f)).collect();

    let mut added_functions = Vec::new();
    let mut changed_functions = Vec::new();

    for (key, comp_fn) in &comparison_index {
        let Some(base_fn) = baseline_lookup.get(key.as_str()) else {
            added_functions.push(comp_fn.clone());
            continue;
        };

        let self_time_diff = comp_fn.self_time - base_fn.self_time;
        let self_time_diff_percentage =
            self_time_diff_percentage(base_fn.self_time, comp_fn.self_time);

        if is_significant_change(self_time_diff_percentage, self_time_diff) {
            changed_functions.push(FunctionDiff {
                key: key.clone(),
                name: comp_fn.name.clone(),
                url: comp_fn.url.clone(),
                line_number: comp_fn.line_number,
                category: comp_fn.category,
                baseline_self_time: base_fn.self_time,
                comparison_self_time: comp_fn.self_time,
                self_time_diff,
                self_time_diff_percentage,
            });
        }
    }

    let mut removed_functions: Vec<HotFunction> = baseline_index
        .iter()
        .filter(|(key, _)| !comparison_lookup.contains_key(key.as_str()))
        .map(|(_, f)| f.clone())
        .collect();

    changed_functions.sort_by(|a, b| b.self_time_diff.abs().total_cmp(&a.self_time_diff.abs()));
    added_functions.sort_by(|a, b| b.self_time.total_cmp(&a.self_time));
    removed_functions.sort_by(|a, b| b.self_time.total_cmp(&a.self_time));

    let total_time_diff = comparison_total - baseline_total;

    ProfileDiff {
        added_functions,
        removed_functions,
        changed_functions,
        total_time_diff,
        total_time_diff_percentage: safe_percentage(total_time_diff, baseline_total),
    }
}

/// Compare category totals
///
/// Categories missing on one side count as zero there. Comparison-side
/// categories come first in their own order, then baseline-only ones.
pub fn compare_categories(
    baseline: &[CategoryStats],
    comparison: &[CategoryStats],
) -> Vec<CategoryComparison> {
    let mut out: Vec<CategoryComparison> = comparison
        .iter()
        .map(|comp| {
            let base = baseline.iter().find(|b| b.category == comp.category);
            category_row(base, Some(comp), comp)
        })
        .collect();

    out.extend(
        baseline
            .iter()
            .filter(|base| !comparison.iter().any(|c| c.category == base.category))
            .map(|base| category_row(Some(base), None, base)),
    );

    out
}

fn category_row(
    base: Option<&CategoryStats>,
    comp: Option<&CategoryStats>,
    shown: &CategoryStats,
) -> CategoryComparison {
    let baseline_time = base.map_or(0.0, |c| c.time);
    let baseline_percentage = base.map_or(0.0, |c| c.percentage);
    let comparison_time = comp.map_or(0.0, |c| c.time);
    let comparison_percentage = comp.map_or(0.0, |c| c.percentage);

    CategoryComparison {
        category: shown.category,
        label: shown.label.clone(),
        color: shown.color.clone(),
        baseline_time,
        baseline_percentage,
        comparison_time,
        comparison_percentage,
        time_diff: comparison_time - baseline_time,
        percentage_diff: comparison_percentage - baseline_percentage,
    }
}

/// Compare whole-profile statistics
pub fn compare_stats(baseline: &ProfileStats, comparison: &ProfileStats) -> StatsComparison {
    StatsComparison {
        total_time: metric_delta(baseline.total_time, comparison.total_time),
        total_samples: metric_delta(
            baseline.total_samples as f64,
            comparison.total_samples as f64,
        ),
        total_nodes: metric_delta(baseline.total_nodes as f64, comparison.total_nodes as f64),
        gc_time: metric_delta(baseline.gc_time, comparison.gc_time),
        idle_time: metric_delta(baseline.idle_time, comparison.idle_time),
    }
}

pub fn metric_delta(baseline: f64, comparison: f64) -> MetricDelta {
    let diff = comparison - baseline;
    MetricDelta {
        baseline,
        comparison,
        diff,
        diff_percentage: safe_percentage(diff, baseline),
    }
}

/// Changed functions that got slower, in changed-list order
pub fn top_regressions(changed: &[FunctionDiff]) -> Vec<FunctionDiff> {
    changed
        .iter()
        .filter(|f| f.self_time_diff > 0.0)
        .take(TOP_CHANGES)
        .cloned()
        .collect()
}

/// Changed functions that got faster, biggest drop first
pub fn top_improvements(changed: &[FunctionDiff]) -> Vec<FunctionDiff> {
    let mut improvements: Vec<FunctionDiff> = changed
        .iter()
        .filter(|f| f.self_time_diff < 0.0)
        .cloned()
        .collect();
    improvements.sort_by(|a, b| a.self_time_diff.total_cmp(&b.self_time_diff));
    improvements.truncate(TOP_CHANGES);
    improvements
}

/// Check if two profiles carry the same analysis
pub fn are_profiles_identical(baseline: &ParsedProfile, comparison: &ParsedProfile) -> bool {
    baseline.stats.total_time == comparison.stats.total_time
        && baseline.stats.total_samples == comparison.stats.total_samples
        && baseline.hot_functions == comparison.hot_functions
}

/// Calculate percentage change with zero-baseline handling
///
/// **Private** - helper function
fn safe_percentage(change: f64, baseline: f64) -> f64 {
    if baseline > 0.0 {
        (change / baseline) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_percentage_zero_baseline() {
        assert_eq!(safe_percentage(50.0, 0.0), 0.0);
        assert_eq!(safe_percentage(50.0, 100.0), 50.0);
        assert_eq!(safe_percentage(-25.0, 100.0), -25.0);
    }

    #[test]
    fn test_self_time_diff_percentage_edges() {
        assert_eq!(self_time_diff_percentage(0.0, 0.0), 0.0);
        assert_eq!(self_time_diff_percentage(0.0, 10.0), 100.0);
        assert_eq!(self_time_diff_percentage(1000.0, 1050.0), 5.0);
    }

    #[test]
    fn test_significance() {
        assert!(is_significant_change(5.0, 50.0));
        assert!(!is_significant_change(0.5, 5.0));
        assert!(is_significant_change(0.5, 1500.0));
        assert!(!is_significant_change(1.0, 1000.0));
    }

    #[test]
    fn test_metric_delta() {
        let delta = metric_delta(200.0, 150.0);
        assert_eq!(delta.diff, -50.0);
        assert_eq!(delta.diff_percentage, -25.0);
    }
}
