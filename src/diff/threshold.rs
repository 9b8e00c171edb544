//! Threshold configuration and violation detection.
//!
//! Loads threshold policies from TOML and checks diff reports
//! for violations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::schema::{CategoryComparison, DiffReport, DiffSummary, FunctionDiff, MetricDelta, ThresholdViolation};
use super::DiffError;
use crate::parser::category::Category;

/// Complete threshold configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ThresholdConfig {
    /// Total-time thresholds
    #[serde(default)]
    pub total_time: TotalTimeThresholds,

    /// Per-function thresholds (optional, warnings only)
    #[serde(default)]
    pub functions: Option<FunctionThresholds>,

    /// Per-category thresholds (optional)
    #[serde(default)]
    pub categories: Option<CategoryThresholds>,
}

impl ThresholdConfig {
    /// Config with only a total-time percentage limit
    pub fn with_total_time_percent(max_increase_percent: f64) -> Self {
        Self {
            total_time: TotalTimeThresholds {
                max_increase_percent: Some(max_increase_percent),
                max_increase_absolute: None,
            },
            ..Default::default()
        }
    }

    /// Reject limits that can never be meaningful
    pub fn validate(&self) -> Result<(), DiffError> {
        let mut limits: Vec<(String, Option<f64>)> = vec![
            ("total_time.max_increase_percent".to_string(), self.total_time.max_increase_percent),
            ("total_time.max_increase_absolute".to_string(), self.total_time.max_increase_absolute),
        ];
        if let Some(functions) = &self.functions {
            limits.push(("functions.max_regression_percent".to_string(), functions.max_regression_percent));
            limits.push(("functions.max_regression_absolute".to_string(), functions.max_regression_absolute));
        }

        for (name, limit) in limits {
            if let Some(value) = limit {
                if !value.is_finite() || value < 0.0 {
                    return Err(DiffError::InvalidThresholds(format!(
                        "{} must be a non-negative number, got {}",
                        name, value
                    )));
                }
            }
        }

        if let Some(categories) = &self.categories {
            for (key, value) in &categories.max_percentage_point_increase {
                key.parse::<Category>().map_err(DiffError::InvalidThresholds)?;
                if !value.is_finite() || *value < 0.0 {
                    return Err(DiffError::InvalidThresholds(format!(
                        "categories.max_percentage_point_increase.{} must be a non-negative number, got {}",
                        key, value
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Total-time thresholds
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TotalTimeThresholds {
    /// Maximum allowed total-time increase percentage
    pub max_increase_percent: Option<f64>,

    /// Maximum allowed absolute total-time increase, microseconds
    pub max_increase_absolute: Option<f64>,
}

/// Per-function thresholds
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FunctionThresholds {
    /// Warn if any function's self time grows by more than this percentage
    pub max_regression_percent: Option<f64>,

    /// Warn if any function's self time grows by more than this many microseconds
    pub max_regression_absolute: Option<f64>,
}

/// Per-category thresholds
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CategoryThresholds {
    /// Category name -> maximum increase of its share, percentage points
    #[serde(default)]
    pub max_percentage_point_increase: BTreeMap<String, f64>,
}

/// Load thresholds from a TOML file
///
/// # Arguments
/// * `path` - Path to the TOML configuration file
///
/// # Returns
/// Parsed and validated ThresholdConfig
///
/// # Errors
/// * `DiffError::IoError` - If file cannot be read
/// * `DiffError::ThresholdParseFailed` - If TOML is invalid
/// * `DiffError::InvalidThresholds` - If a limit is negative or a category unknown
///
/// # Example
/// ```ignore
/// let thresholds = load_thresholds("thresholds.toml")?;
/// ```
pub fn load_thresholds(path: impl AsRef<Path>) -> Result<ThresholdConfig, DiffError> {
    let contents = fs::read_to_string(path)?;
    let config: ThresholdConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Check a diff report against thresholds and update violations
///
/// # Arguments
/// * `diff` - Mutable reference to diff report to update
/// * `config` - Threshold configuration to check against
///
/// # Returns
/// Vector of violations (also updates diff.threshold_violations)
///
/// # Example
/// ```ignore
/// let mut report = generate_diff_report(&baseline, &comparison, "a", "b");
/// let thresholds = load_thresholds("thresholds.toml")?;
/// check_thresholds(&mut report, &thresholds);
/// ```
pub fn check_thresholds(diff: &mut DiffReport, config: &ThresholdConfig) -> Vec<ThresholdViolation> {
    let mut violations = Vec::new();

    check_total_time_thresholds(
        &diff.deltas.stats_comparison.total_time,
        &config.total_time,
        &mut violations,
    );

    if let Some(function_thresholds) = &config.functions {
        check_function_thresholds(
            &diff.deltas.diff.changed_functions,
            function_thresholds,
            &mut violations,
        );
    }

    if let Some(category_thresholds) = &config.categories {
        check_category_thresholds(
            &diff.deltas.category_comparison,
            category_thresholds,
            &mut violations,
        );
    }

    // Update diff report
    diff.threshold_violations = violations.clone();
    let warning = diff.summary.warning.take();
    diff.summary = create_summary(&violations);
    diff.summary.warning = warning;

    violations
}

fn check_total_time_thresholds(
    total_time: &MetricDelta,
    thresholds: &TotalTimeThresholds,
    violations: &mut Vec<ThresholdViolation>,
) {
    // Check percentage increase
    if let Some(max_percent) = thresholds.max_increase_percent {
        if total_time.diff_percentage > max_percent {
            violations.push(ThresholdViolation {
                metric: "total_time.max_increase_percent".to_string(),
                threshold: max_percent,
                actual: total_time.diff_percentage,
                severity: "error".to_string(),
            });
        }
    }

    // Check absolute increase
    if let Some(max_absolute) = thresholds.max_increase_absolute {
        if total_time.diff > max_absolute {
            violations.push(ThresholdViolation {
                metric: "total_time.max_increase_absolute".to_string(),
                threshold: max_absolute,
                actual: total_time.diff,
                severity: "error".to_string(),
            });
        }
    }
}

fn check_function_thresholds(
    changed: &[FunctionDiff],
    thresholds: &FunctionThresholds,
    violations: &mut Vec<ThresholdViolation>,
) {
    for function in changed.iter().filter(|f| f.self_time_diff > 0.0) {
        if let Some(max_percent) = thresholds.max_regression_percent {
            if function.self_time_diff_percentage > max_percent {
                violations.push(ThresholdViolation {
                    metric: format!("functions.{}.percent", function.key),
                    threshold: max_percent,
                    actual: function.self_time_diff_percentage,
                    severity: "warning".to_string(),
                });
            }
        }

        if let Some(max_absolute) = thresholds.max_regression_absolute {
            if function.self_time_diff > max_absolute {
                violations.push(ThresholdViolation {
                    metric: format!("functions.{}.absolute", function.key),
                    threshold: max_absolute,
                    actual: function.self_time_diff,
                    severity: "warning".to_string(),
                });
            }
        }
    }
}

fn check_category_thresholds(
    categories: &[CategoryComparison],
    thresholds: &CategoryThresholds,
    violations: &mut Vec<ThresholdViolation>,
) {
    for (key, max_points) in &thresholds.max_percentage_point_increase {
        let Ok(category) = key.parse::<Category>() else {
            continue;
        };
        let Some(row) = categories.iter().find(|c| c.category == category) else {
            continue;
        };
        if row.percentage_diff > *max_points {
            violations.push(ThresholdViolation {
                metric: format!("categories.{}.max_percentage_point_increase", category),
                threshold: *max_points,
                actual: row.percentage_diff,
                severity: "error".to_string(),
            });
        }
    }
}

/// Create summary based on violations
fn create_summary(violations: &[ThresholdViolation]) -> DiffSummary {
    let error_count = violations.iter().filter(|v| v.severity == "error").count();
    let warning_count = violations.iter().filter(|v| v.severity == "warning").count();

    let status = if error_count > 0 {
        "FAILED"
    } else if warning_count > 0 {
        "WARNING"
    } else {
        "PASSED"
    };

    DiffSummary {
        has_regressions: error_count > 0,
        violation_count: violations.len(),
        status: status.to_string(),
        warning: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_time_threshold_exceeded() {
        let delta = MetricDelta {
            baseline: 100.0,
            comparison: 150.0,
            diff: 50.0,
            diff_percentage: 50.0,
        };
        let thresholds = TotalTimeThresholds {
            max_increase_percent: Some(10.0),
            max_increase_absolute: None,
        };

        let mut violations = Vec::new();
        check_total_time_thresholds(&delta, &thresholds, &mut violations);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].metric, "total_time.max_increase_percent");
        assert_eq!(violations[0].threshold, 10.0);
        assert_eq!(violations[0].actual, 50.0);
    }

    #[test]
    fn test_total_time_threshold_not_exceeded() {
        let delta = MetricDelta {
            baseline: 100.0,
            comparison: 105.0,
            diff: 5.0,
            diff_percentage: 5.0,
        };
        let thresholds = TotalTimeThresholds {
            max_increase_percent: Some(10.0),
            max_increase_absolute: Some(10.0),
        };

        let mut violations = Vec::new();
        check_total_time_thresholds(&delta, &thresholds, &mut violations);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_create_summary_with_errors() {
        let violations = vec![ThresholdViolation {
            metric: "test".to_string(),
            threshold: 10.0,
            actual: 20.0,
            severity: "error".to_string(),
        }];

        let summary = create_summary(&violations);
        assert_eq!(summary.status, "FAILED");
        assert!(summary.has_regressions);
        assert_eq!(summary.violation_count, 1);
    }

    #[test]
    fn test_create_summary_with_warnings() {
        let violations = vec![ThresholdViolation {
            metric: "test".to_string(),
            threshold: 10.0,
            actual: 20.0,
            severity: "warning".to_string(),
        }];

        let summary = create_summary(&violations);
        assert_eq!(summary.status, "WARNING");
        assert!(!summary.has_regressions);
    }

    #[test]
    fn test_validate_rejects_negative_and_unknown() {
        let negative = ThresholdConfig::with_total_time_percent(-1.0);
        assert!(matches!(negative.validate(), Err(DiffError::InvalidThresholds(_))));

        let mut unknown = ThresholdConfig::default();
        unknown.categories = Some(CategoryThresholds {
            max_percentage_point_increase: BTreeMap::from([("gpu".to_string(), 1.0)]),
        });
        assert!(matches!(unknown.validate(), Err(DiffError::InvalidThresholds(_))));
    }

    #[test]
    fn test_parse_toml_sections() {
        let config: ThresholdConfig = toml::from_str(
            r#"
            [total_time]
            max_increase_percent = 5.0

            [functions]
            max_regression_absolute = 2000.0

            [categories]
            max_percentage_point_increase = { gc = 2.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.total_time.max_increase_percent, Some(5.0));
        assert_eq!(
            config.functions.as_ref().and_then(|f| f.max_regression_absolute),
            Some(2000.0)
        );
        assert!(config.validate().is_ok());
    }
}
