//! Integration tests for the diff module.
//!
//! Tests the complete comparison, report and threshold checking workflow.

use super::normalizer::{compare_categories, top_improvements};
use super::*;
use crate::parser::parse_profile;
use crate::parser::schema::ParsedProfile;
use serde_json::json;

/// Build a profile where every function is a direct child of the root and
/// receives exactly one sample of the given self time
fn create_test_profile(functions: &[(&str, &str, f64)]) -> ParsedProfile {
    let mut nodes = vec![json!({
        "id": 1,
        "callFrame": {"functionName": "(root)", "url": "", "lineNumber": -1},
        "children": (2..functions.len() as u64 + 2).collect::<Vec<u64>>()
    })];
    let mut samples = Vec::new();
    let mut deltas = Vec::new();

    for (i, (name, url, self_time)) in functions.iter().enumerate() {
        let id = i as u64 + 2;
        nodes.push(json!({
            "id": id,
            "callFrame": {"functionName": name, "url": url, "lineNumber": 10},
        }));
        samples.push(id);
        deltas.push(*self_time);
    }

    let end_time: f64 = deltas.iter().sum();
    let text = json!({
        "nodes": nodes,
        "startTime": 0,
        "endTime": end_time,
        "samples": samples,
        "timeDeltas": deltas,
    })
    .to_string();

    parse_profile(&text).unwrap()
}

fn changed_names(diff: &ProfileDiff) -> Vec<&str> {
    diff.changed_functions.iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn test_five_percent_change_is_reported() {
    let baseline = create_test_profile(&[("work", "app.js", 1000.0)]);
    let comparison = create_test_profile(&[("work", "app.js", 1050.0)]);

    let diff = compare_profiles(&baseline, &comparison).diff;
    assert_eq!(changed_names(&diff), vec!["work"]);
    assert_eq!(diff.changed_functions[0].self_time_diff, 50.0);
    assert_eq!(diff.changed_functions[0].self_time_diff_percentage, 5.0);
    assert_eq!(diff.changed_functions[0].key, "work|app.js|10");
}

#[test]
fn test_half_percent_change_is_ignored() {
    let baseline = create_test_profile(&[("work", "app.js", 1000.0)]);
    let comparison = create_test_profile(&[("work", "app.js", 1005.0)]);

    let diff = compare_profiles(&baseline, &comparison).diff;
    assert!(diff.changed_functions.is_empty());
    assert!(diff.is_empty());
}

#[test]
fn test_added_and_removed() {
    let baseline = create_test_profile(&[("old", "a.js", 300.0), ("shared", "a.js", 100.0)]);
    let comparison = create_test_profile(&[
        ("shared", "a.js", 100.0),
        ("small_new", "b.js", 50.0),
        ("big_new", "b.js", 500.0),
    ]);

    let diff = compare_profiles(&baseline, &comparison).diff;
    let added: Vec<&str> = diff.added_functions.iter().map(|f| f.name.as_str()).collect();
    let removed: Vec<&str> = diff.removed_functions.iter().map(|f| f.name.as_str()).collect();

    assert_eq!(added, vec!["big_new", "small_new"]);
    assert_eq!(removed, vec!["old"]);
    assert_eq!(diff.total_time_diff, 250.0);
    assert_eq!(diff.total_time_diff_percentage, 62.5);
}

#[test]
fn test_same_name_different_file_is_not_matched() {
    let baseline = create_test_profile(&[("handler", "a.js", 100.0)]);
    let comparison = create_test_profile(&[("handler", "b.js", 100.0)]);

    let diff = compare_profiles(&baseline, &comparison).diff;
    assert_eq!(diff.added_functions.len(), 1);
    assert_eq!(diff.removed_functions.len(), 1);
}

#[test]
fn test_changed_sorted_and_split_into_regressions_and_improvements() {
    let baseline = create_test_profile(&[
        ("a", "x.js", 1000.0),
        ("b", "x.js", 1000.0),
        ("c", "x.js", 5000.0),
        ("d", "x.js", 1000.0),
    ]);
    let comparison = create_test_profile(&[
        ("a", "x.js", 1200.0),
        ("b", "x.js", 3000.0),
        ("c", "x.js", 1000.0),
        ("d", "x.js", 900.0),
    ]);

    let result = compare_profiles(&baseline, &comparison);
    assert_eq!(changed_names(&result.diff), vec!["c", "b", "a", "d"]);

    let regressions: Vec<&str> = result.top_regressions.iter().map(|f| f.name.as_str()).collect();
    let improvements: Vec<&str> = result.top_improvements.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(regressions, vec!["b", "a"]);
    assert_eq!(improvements, vec!["c", "d"]);
}

#[test]
fn test_top_improvements_capped() {
    let changed: Vec<FunctionDiff> = (0..15)
        .map(|i| FunctionDiff {
            key: format!("f{}", i),
            name: format!("f{}", i),
            url: String::new(),
            line_number: 0,
            category: crate::parser::Category::Javascript,
            baseline_self_time: 5000.0,
            comparison_self_time: 5000.0 - 100.0 * i as f64,
            self_time_diff: -100.0 * i as f64,
            self_time_diff_percentage: -2.0 * i as f64,
        })
        .collect();

    let improvements = top_improvements(&changed);
    assert_eq!(improvements.len(), 10);
    assert_eq!(improvements[0].name, "f14");
}

#[test]
fn test_swapping_inputs_mirrors_the_diff() {
    let baseline = create_test_profile(&[("a", "x.js", 1000.0), ("gone", "x.js", 10.0)]);
    let comparison = create_test_profile(&[("a", "x.js", 2000.0), ("fresh", "x.js", 20.0)]);

    let forward = compare_profiles(&baseline, &comparison).diff;
    let backward = compare_profiles(&comparison, &baseline).diff;

    assert_eq!(forward.added_functions, backward.removed_functions);
    assert_eq!(forward.removed_functions, backward.added_functions);
    assert_eq!(
        forward.changed_functions[0].self_time_diff,
        -backward.changed_functions[0].self_time_diff
    );
    assert_eq!(forward.total_time_diff, -backward.total_time_diff);
}

#[test]
fn test_diff_profiles_requires_both() {
    let profile = create_test_profile(&[("a", "x.js", 10.0)]);
    assert!(diff_profiles(Some(&profile), None).is_none());
    assert!(diff_profiles(None, Some(&profile)).is_none());
    assert!(diff_profiles(None, None).is_none());
    assert!(diff_profiles(Some(&profile), Some(&profile)).is_some());
}

#[test]
fn test_category_union_zero_fills() {
    let baseline = create_test_profile(&[("(garbage collector)", "", 100.0), ("a", "x.js", 100.0)]);
    let comparison = create_test_profile(&[("a", "x.js", 100.0)]);

    let rows = compare_categories(&baseline.stats.categories, &comparison.stats.categories);
    let gc = rows
        .iter()
        .find(|r| r.category == crate::parser::Category::Gc)
        .unwrap();
    assert_eq!(gc.baseline_time, 100.0);
    assert_eq!(gc.comparison_time, 0.0);
    assert_eq!(gc.time_diff, -100.0);
}

#[test]
fn test_duplicate_keys_are_merged() {
    let text = json!({
        "nodes": [
            {"id": 1, "callFrame": {"functionName": "(root)"}, "children": [2, 3]},
            {"id": 2, "callFrame": {"functionName": "a", "url": "x.js", "lineNumber": 1}, "children": [4]},
            {"id": 3, "callFrame": {"functionName": "b", "url": "x.js", "lineNumber": 2}, "children": [5]},
            {"id": 4, "callFrame": {"functionName": "leaf", "url": "x.js", "lineNumber": 9}},
            {"id": 5, "callFrame": {"functionName": "leaf", "url": "x.js", "lineNumber": 9}}
        ],
        "startTime": 0,
        "endTime": 3000,
        "samples": [4, 5],
        "timeDeltas": [1000, 2000]
    })
    .to_string();
    let baseline = parse_profile(&text).unwrap();
    let comparison = create_test_profile(&[("leaf", "x.js", 3000.0)]);

    let index = index_functions(&baseline.hot_functions);
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].1.self_time, 3000.0);

    let diff = compare_profiles(&baseline, &comparison).diff;
    assert!(diff.changed_functions.is_empty());
    assert!(diff.added_functions.is_empty());
}

#[test]
fn test_report_and_thresholds() {
    let baseline = create_test_profile(&[("a", "x.js", 1000.0)]);
    let comparison = create_test_profile(&[("a", "x.js", 1500.0)]);

    let mut report = generate_diff_report(&baseline, &comparison, "before", "after");
    assert_eq!(report.diff_version, "1.0.0");
    assert_eq!(report.baseline.name, "before");
    assert_eq!(report.summary.status, "PASSED");
    assert!(report.summary.warning.is_none());

    let config = ThresholdConfig {
        functions: Some(FunctionThresholds {
            max_regression_percent: Some(10.0),
            max_regression_absolute: None,
        }),
        ..ThresholdConfig::with_total_time_percent(20.0)
    };
    let violations = check_thresholds(&mut report, &config);

    assert_eq!(violations.len(), 2);
    assert_eq!(report.summary.status, "FAILED");
    assert!(report.summary.has_regressions);
    assert_eq!(report.threshold_violations, violations);
}

#[test]
fn test_identical_profiles_warning() {
    let profile = create_test_profile(&[("a", "x.js", 1000.0)]);
    let mut report = generate_diff_report(&profile, &profile, "a", "b");
    assert!(report.summary.warning.is_some());

    check_thresholds(&mut report, &ThresholdConfig::with_total_time_percent(1.0));
    assert_eq!(report.summary.status, "PASSED");
    assert!(report.summary.warning.is_some());

    let rendered = render_terminal_diff(&report);
    assert!(rendered.contains("Profile Comparison Summary"));
    assert!(rendered.contains("STATUS: PASSED"));
}
