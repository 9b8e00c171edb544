//! Schema definitions for profile comparisons and diff reports.
//!
//! Defines the structures that represent differences between two profiles.

use serde::{Deserialize, Serialize};

use crate::aggregator::HotFunction;
use crate::parser::category::Category;

/// Function-level differences between two profiles
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileDiff {
    /// Only in the comparison profile, heaviest first
    pub added_functions: Vec<HotFunction>,

    /// Only in the baseline profile, heaviest first
    pub removed_functions: Vec<HotFunction>,

    /// In both and significantly changed, largest absolute change first
    pub changed_functions: Vec<FunctionDiff>,

    /// Comparison total minus baseline total, microseconds
    pub total_time_diff: f64,

    pub total_time_diff_percentage: f64,
}

impl ProfileDiff {
    pub fn is_empty(&self) -> bool {
        self.added_functions.is_empty()
            && self.removed_functions.is_empty()
            && self.changed_functions.is_empty()
    }
}

/// Self-time change of one function present in both profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDiff {
    /// `name|url|line`
    pub key: String,
    pub name: String,
    pub url: String,
    pub line_number: i64,
    pub category: Category,
    pub baseline_self_time: f64,
    pub comparison_self_time: f64,
    pub self_time_diff: f64,
    pub self_time_diff_percentage: f64,
}

/// Category time on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparison {
    pub category: Category,
    pub label: String,
    pub color: String,
    pub baseline_time: f64,
    pub baseline_percentage: f64,
    pub comparison_time: f64,
    pub comparison_percentage: f64,
    pub time_diff: f64,

    /// Change in share of the profile, percentage points
    pub percentage_diff: f64,
}

/// A scalar measured on both sides
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDelta {
    pub baseline: f64,
    pub comparison: f64,
    pub diff: f64,
    pub diff_percentage: f64,
}

/// Whole-profile statistics on both sides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsComparison {
    pub total_time: MetricDelta,
    pub total_samples: MetricDelta,
    pub total_nodes: MetricDelta,
    pub gc_time: MetricDelta,
    pub idle_time: MetricDelta,
}

/// Everything derived from comparing two profiles
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileComparison {
    pub diff: ProfileDiff,

    /// Union of both sides' categories, zero-filled
    pub category_comparison: Vec<CategoryComparison>,

    pub stats_comparison: StatsComparison,

    /// Changed functions that got slower
    pub top_regressions: Vec<FunctionDiff>,

    /// Changed functions that got faster, biggest drop first
    pub top_improvements: Vec<FunctionDiff>,
}

/// Complete diff report comparing baseline and comparison profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    /// Schema version for the diff format
    pub diff_version: String,

    /// Timestamp when diff was generated
    pub generated_at: String,

    /// Metadata from baseline profile
    pub baseline: ProfileMetadata,

    /// Metadata from comparison profile
    pub comparison: ProfileMetadata,

    /// Calculated differences
    pub deltas: ProfileComparison,

    /// List of threshold violations (if any)
    pub threshold_violations: Vec<ThresholdViolation>,

    /// Summary of diff results
    pub summary: DiffSummary,
}

/// Metadata extracted from a profile for comparison
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProfileMetadata {
    /// File name or profile title
    pub name: String,

    /// Root total time, microseconds
    pub total_time: f64,

    pub total_samples: usize,
    pub total_nodes: usize,

    /// Raw profile start/end, microseconds
    pub start_time: f64,
    pub end_time: f64,
}

/// A single threshold violation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThresholdViolation {
    /// Name of the metric that violated threshold
    pub metric: String,

    /// Threshold value
    pub threshold: f64,

    /// Actual value
    pub actual: f64,

    /// Severity: "error" or "warning"
    pub severity: String,
}

/// Summary of diff results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffSummary {
    /// Whether there are any regressions
    pub has_regressions: bool,

    /// Number of threshold violations
    pub violation_count: usize,

    /// Overall status: "PASSED", "FAILED", "WARNING"
    pub status: String,

    /// Optional warning message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Default for DiffSummary {
    fn default() -> Self {
        Self {
            has_regressions: false,
            violation_count: 0,
            status: "PASSED".to_string(),
            warning: None,
        }
    }
}
