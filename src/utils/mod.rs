//! Utility modules for configuration, error handling, and formatting.

pub mod config;
pub mod error;

// Re-export commonly used error types for convenience
pub use config::{load_options, AnalysisOptions, GroupingKey};
pub use error::{ConfigError, FlamegraphError, LoadError, OutputError, ParseError};

/// Percentage of `value` against `denominator`, 0.0 when the denominator is not positive
pub fn percent_of(value: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        (value / denominator) * 100.0
    } else {
        0.0
    }
}

/// Share of `value` in `denominator` as a 0..1 fraction, 0.0 when the denominator is not positive
pub fn fraction_of(value: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        value / denominator
    } else {
        0.0
    }
}

/// Format a microsecond duration for humans (µs / ms / s)
pub fn format_time(microseconds: f64) -> String {
    let magnitude = microseconds.abs();
    if magnitude < 1_000.0 {
        format!("{:.0}µs", microseconds)
    } else if magnitude < 1_000_000.0 {
        format!("{:.2}ms", microseconds / 1_000.0)
    } else {
        format!("{:.2}s", microseconds / 1_000_000.0)
    }
}
