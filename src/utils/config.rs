//! Configuration and constants for analysis and diffing.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current export schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Current diff report schema version
pub const DIFF_VERSION: &str = "1.0.0";

/// Number of equal-width buckets in the activity histogram
pub const HISTOGRAM_BUCKETS: usize = 20;

/// Number of hot functions surfaced in stats and charts
pub const TOP_FUNCTIONS: usize = 10;

/// Chart labels longer than this are shortened with "..."
pub const CHART_NAME_MAX_CHARS: usize = 20;

/// Categories at or below this share are left out of the breakdown chart
pub const CATEGORY_BREAKDOWN_MIN_PERCENT: f64 = 0.1;

/// A common function is "changed" when its self time moved by more than this percentage...
pub const CHANGE_PERCENT_THRESHOLD: f64 = 1.0;

/// ...or by more than this many microseconds
pub const CHANGE_ABSOLUTE_THRESHOLD: f64 = 1000.0;

/// Number of regressions / improvements surfaced by a comparison
pub const TOP_CHANGES: usize = 10;

/// Call tree nodes shallower than this start out expanded
pub const EXPANDED_DEPTH: u32 = 2;

/// Display name for frames with an empty function name
pub const ANONYMOUS_NAME: &str = "(anonymous)";

/// Synthetic frames that never show up as functions of their own
pub const SYNTHETIC_FRAME_NAMES: &[&str] = &["(root)", "(program)"];

/// Identity used to merge node instances in the bottom-up view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKey {
    /// Function name alone: same-named functions from different files collapse together
    #[default]
    #[serde(alias = "name", alias = "function")]
    FunctionName,
    /// Full (function name, url, line) identity
    #[serde(alias = "frame", alias = "callframe")]
    CallFrame,
}

impl std::str::FromStr for GroupingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "function" | "function_name" => Ok(Self::FunctionName),
            "frame" | "callframe" | "call_frame" => Ok(Self::CallFrame),
            other => Err(format!("unknown grouping key: {}", other)),
        }
    }
}

/// Tunables for a single analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// How the bottom-up view merges node instances
    #[serde(alias = "grouping")]
    pub bottom_up_grouping: GroupingKey,

    /// Bucket count of the activity histogram
    pub histogram_buckets: usize,

    /// Number of hot functions kept in stats and the top-functions chart
    pub top_functions: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            bottom_up_grouping: GroupingKey::default(),
            histogram_buckets: HISTOGRAM_BUCKETS,
            top_functions: TOP_FUNCTIONS,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grouping(mut self, grouping: GroupingKey) -> Self {
        self.bottom_up_grouping = grouping;
        self
    }

    pub fn with_top_functions(mut self, top_functions: usize) -> Self {
        self.top_functions = top_functions;
        self
    }
}

/// Load analysis options from a TOML file
///
/// Missing keys fall back to their defaults.
///
/// # Example
/// ```ignore
/// let options = load_options("cpuprof.toml")?;
/// ```
pub fn load_options(path: impl AsRef<Path>) -> Result<AnalysisOptions, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let options: AnalysisOptions = toml::from_str(&contents)?;
    Ok(options)
}
