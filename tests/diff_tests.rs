use pretty_assertions::assert_eq;
use serde_json::json;

use cpuprofile_studio::diff::{
    check_thresholds, compare_profiles, diff_profiles, generate_diff_report, is_significant_change,
    load_thresholds, self_time_diff_percentage, DiffError,
};
use cpuprofile_studio::parser::{parse_profile, Category, ParsedProfile};

/// Root with one child per entry, each sampled once for `self_time`
fn profile(functions: &[(&str, &str, f64)]) -> ParsedProfile {
    let mut nodes = vec![json!({
        "id": 1,
        "callFrame": {"functionName": "(root)"},
        "children": (0..functions.len()).map(|i| i + 2).collect::<Vec<_>>()
    })];
    for (i, (name, url, _)) in functions.iter().enumerate() {
        nodes.push(json!({
            "id": i + 2,
            "callFrame": {"functionName": name, "url": url, "lineNumber": 1}
        }));
    }
    let text = json!({
        "nodes": nodes,
        "startTime": 0,
        "endTime": functions.iter().map(|f| f.2).sum::<f64>(),
        "samples": (0..functions.len()).map(|i| i + 2).collect::<Vec<_>>(),
        "timeDeltas": functions.iter().map(|f| f.2).collect::<Vec<_>>()
    })
    .to_string();
    parse_profile(&text).unwrap()
}

#[test]
fn test_diff_percentage_edge_cases() {
    assert_eq!(self_time_diff_percentage(0.0, 0.0), 0.0);
    assert_eq!(self_time_diff_percentage(0.0, 10.0), 100.0);
    assert_eq!(self_time_diff_percentage(1000.0, 1050.0), 5.0);
    assert!(is_significant_change(5.0, 50.0));
    assert!(!is_significant_change(0.5, 5.0));
    assert!(is_significant_change(0.1, 1500.0));
}

#[test]
fn test_large_absolute_change_under_one_percent() {
    let baseline = profile(&[("big", "app.js", 1_000_000.0)]);
    let comparison = profile(&[("big", "app.js", 1_005_000.0)]);

    let diff = compare_profiles(&baseline, &comparison).diff;
    assert_eq!(diff.changed_functions.len(), 1);
    assert_eq!(diff.changed_functions[0].self_time_diff, 5000.0);
}

#[test]
fn test_category_comparison_covers_both_sides() {
    let baseline = profile(&[("work", "app.js", 500.0), ("(garbage collector)", "", 500.0)]);
    let comparison = profile(&[("work", "app.js", 500.0), ("(idle)", "", 500.0)]);

    let result = compare_profiles(&baseline, &comparison);
    let row = |category: Category| {
        result
            .category_comparison
            .iter()
            .find(|r| r.category == category)
            .unwrap()
    };

    assert_eq!(row(Category::Gc).comparison_time, 0.0);
    assert_eq!(row(Category::Gc).baseline_percentage, 50.0);
    assert_eq!(row(Category::Idle).baseline_time, 0.0);
    assert_eq!(row(Category::Idle).comparison_time, 500.0);
    assert_eq!(row(Category::Javascript).time_diff, 0.0);
}

#[test]
fn test_missing_side_gives_no_diff() {
    let only = profile(&[("a", "a.js", 10.0)]);
    assert!(diff_profiles(None, Some(&only)).is_none());
}

#[test]
fn test_report_serializes() {
    let baseline = profile(&[("a", "a.js", 1000.0)]);
    let comparison = profile(&[("a", "a.js", 1100.0), ("b", "b.js", 50.0)]);

    let report = generate_diff_report(&baseline, &comparison, "base", "head");
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["diff_version"], "1.0.0");
    assert_eq!(value["baseline"]["name"], "base");
    assert_eq!(value["summary"]["status"], "PASSED");
    assert!(value["generated_at"].as_str().unwrap().contains('T'));
    assert_eq!(report.deltas.diff.added_functions[0].name, "b");
}

#[test]
fn test_thresholds_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thresholds.toml");
    std::fs::write(
        &path,
        r#"
[total_time]
max_increase_percent = 50.0

[functions]
max_regression_percent = 5.0

[categories]
max_percentage_point_increase = { gc = 10.0 }
"#,
    )
    .unwrap();

    let thresholds = load_thresholds(&path).unwrap();
    let baseline = profile(&[("a", "a.js", 900.0), ("(garbage collector)", "", 100.0)]);
    let comparison = profile(&[("a", "a.js", 1000.0), ("(garbage collector)", "", 400.0)]);

    let mut report = generate_diff_report(&baseline, &comparison, "base", "head");
    let violations = check_thresholds(&mut report, &thresholds);

    let metrics: Vec<&str> = violations.iter().map(|v| v.metric.as_str()).collect();
    assert!(metrics.contains(&"categories.gc.max_percentage_point_increase"));
    assert!(metrics.iter().any(|m| m.starts_with("functions.")));
    assert!(!metrics.contains(&"total_time.max_increase_percent"));
    assert_eq!(report.summary.status, "FAILED");
}

#[test]
fn test_warning_only_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thresholds.toml");
    std::fs::write(&path, "[functions]\nmax_regression_absolute = 10.0\n").unwrap();

    let thresholds = load_thresholds(&path).unwrap();
    let mut report = generate_diff_report(
        &profile(&[("a", "a.js", 1000.0)]),
        &profile(&[("a", "a.js", 1100.0)]),
        "base",
        "head",
    );
    check_thresholds(&mut report, &thresholds);

    assert_eq!(report.summary.status, "WARNING");
    assert!(!report.summary.has_regressions);
}

#[test]
fn test_invalid_threshold_files() {
    let dir = tempfile::tempdir().unwrap();

    let negative = dir.path().join("negative.toml");
    std::fs::write(&negative, "[total_time]\nmax_increase_percent = -5.0\n").unwrap();
    assert!(matches!(
        load_thresholds(&negative),
        Err(DiffError::InvalidThresholds(_))
    ));

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[total_time\n").unwrap();
    assert!(matches!(
        load_thresholds(&broken),
        Err(DiffError::ThresholdParseFailed(_))
    ));

    assert!(matches!(
        load_thresholds(dir.path().join("missing.toml")),
        Err(DiffError::IoError(_))
    ));
}
