//! Profile comparison, diff reports and threshold checking.
//!
//! This module compares two parsed profiles (baseline vs comparison) and
//! produces function, category and statistics deltas, optionally wrapped
//! in a report with threshold violation detection.
//!
//! # Example
//! ```ignore
//! use cpuprofile_studio::diff::{check_thresholds, generate_diff_report, load_thresholds};
//! use cpuprofile_studio::parser::load_profile;
//!
//! let baseline = load_profile("before.cpuprofile", &options)?;
//! let comparison = load_profile("after.cpuprofile", &options)?;
//! let mut report = generate_diff_report(&baseline, &comparison, "before", "after");
//!
//! let thresholds = load_thresholds("thresholds.toml")?;
//! let violations = check_thresholds(&mut report, &thresholds);
//! ```

mod engine;
mod normalizer;
mod output;
mod schema;
mod threshold;

// Public API exports
pub use engine::{compare_profiles, diff_profiles, generate_diff_report};
pub use normalizer::{index_functions, is_significant_change, self_time_diff_percentage};
pub use output::render_terminal_diff;
pub use schema::{
    CategoryComparison, DiffReport, DiffSummary, FunctionDiff, MetricDelta, ProfileComparison,
    ProfileDiff, ProfileMetadata, StatsComparison, ThresholdViolation,
};
pub use threshold::{
    check_thresholds, load_thresholds, CategoryThresholds, FunctionThresholds, ThresholdConfig,
    TotalTimeThresholds,
};

// Error type
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to read profile: {0}")]
    ReadFailed(#[from] crate::utils::error::LoadError),

    #[error("Invalid threshold configuration: {0}")]
    InvalidThresholds(String),

    #[error("Threshold TOML parse error: {0}")]
    ThresholdParseFailed(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests;
