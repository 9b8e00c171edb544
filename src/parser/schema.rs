//! Input and output schema definitions for profile data.
//!
//! The input side mirrors the V8 `.cpuprofile` export (Chrome DevTools,
//! Node.js `--cpu-prof`, Deno). The output side is the `ParsedProfile`
//! aggregate: every derived view of one profile, built once and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::node_table::NodeTable;
use crate::aggregator::{
    BottomUpNode, CallTreeNode, FlameNode, HotFunction, ProfileStats, SourceFile, SummaryData,
    TimelineData,
};

/// Script identifier; exporters disagree on whether it is a string or a number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptId {
    Text(String),
    Number(i64),
}

impl Default for ScriptId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

fn unknown_position() -> i64 {
    -1
}

/// Call-frame identity of a profile node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,

    #[serde(default)]
    pub script_id: ScriptId,

    #[serde(default)]
    pub url: String,

    /// Zero-based line, -1 when unknown
    #[serde(default = "unknown_position")]
    pub line_number: i64,

    /// Zero-based column, -1 when unknown
    #[serde(default = "unknown_position")]
    pub column_number: i64,
}

impl CallFrame {
    pub fn new(function_name: impl Into<String>, url: impl Into<String>, line: i64, column: i64) -> Self {
        Self {
            function_name: function_name.into(),
            script_id: ScriptId::default(),
            url: url.into(),
            line_number: line,
            column_number: column,
        }
    }

    /// Function name, or "(anonymous)" when the profiler recorded none
    pub fn display_name(&self) -> &str {
        if self.function_name.is_empty() {
            crate::utils::config::ANONYMOUS_NAME
        } else {
            &self.function_name
        }
    }

    /// Key used to match the same function across two profiles
    pub fn diff_key(&self) -> String {
        format!("{}|{}|{}", self.display_name(), self.url, self.line_number)
    }
}

/// Per-line sample count attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTick {
    pub line: i64,
    pub ticks: u64,
}

/// Raw profile node as exported by the profiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: u64,

    pub call_frame: CallFrame,

    #[serde(default)]
    pub hit_count: u64,

    #[serde(default)]
    pub children: Vec<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub position_ticks: Vec<PositionTick>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deopt_reason: Option<String>,
}

/// Raw CPU profile (`.cpuprofile`)
///
/// `samples` and `time_deltas` are parallel sequences; deltas are in
/// microseconds and each one is the time elapsed before its sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    pub nodes: Vec<RawNode>,

    #[serde(default)]
    pub start_time: f64,

    #[serde(default)]
    pub end_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_deltas: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RawProfile {
    /// Wall-clock span of the profile in microseconds (never negative)
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Sample ids and deltas, only when both streams are present and non-empty
    pub fn sample_stream(&self) -> Option<(&[u64], &[f64])> {
        match (&self.samples, &self.time_deltas) {
            (Some(samples), Some(deltas)) if !samples.is_empty() && !deltas.is_empty() => {
                Some((samples.as_slice(), deltas.as_slice()))
            }
            _ => None,
        }
    }

    /// Number of samples recorded
    pub fn sample_count(&self) -> usize {
        self.samples.as_ref().map_or(0, Vec::len)
    }
}

/// Which derived view a consumer wants to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Summary,
    Flamegraph,
    Calltree,
    Bottomup,
    Timeline,
    Source,
}

impl ViewMode {
    pub const ALL: [ViewMode; 6] = [
        Self::Summary,
        Self::Flamegraph,
        Self::Calltree,
        Self::Bottomup,
        Self::Timeline,
        Self::Source,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Flamegraph => "flamegraph",
            Self::Calltree => "calltree",
            Self::Bottomup => "bottomup",
            Self::Timeline => "timeline",
            Self::Source => "source",
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase().replace(['-', '_'], "");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lowered)
            .ok_or_else(|| format!("unknown view mode: {}", s))
    }
}

/// Read-only view selected by a `ViewMode`
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum ProfileView<'a> {
    Summary {
        stats: &'a ProfileStats,
        summary: &'a SummaryData,
    },
    FlameGraph(&'a FlameNode),
    CallTree(&'a CallTreeNode),
    BottomUp(&'a [BottomUpNode]),
    Timeline(&'a TimelineData),
    Source(&'a BTreeMap<String, SourceFile>),
}

/// Complete analysis of one CPU profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedProfile {
    /// The raw input, verbatim
    pub profile: RawProfile,

    /// Timed and categorized node table every view was derived from
    #[serde(skip)]
    pub table: NodeTable,

    pub flame_graph: FlameNode,
    pub call_tree: CallTreeNode,
    pub bottom_up: Vec<BottomUpNode>,
    pub hot_functions: Vec<HotFunction>,
    pub timeline: TimelineData,
    pub stats: ProfileStats,
    pub summary: SummaryData,

    /// Per-file line aggregates keyed by script url
    pub source_files: BTreeMap<String, SourceFile>,
}

impl ParsedProfile {
    /// Select one read-only view
    pub fn view(&self, mode: ViewMode) -> ProfileView<'_> {
        match mode {
            ViewMode::Summary => ProfileView::Summary {
                stats: &self.stats,
                summary: &self.summary,
            },
            ViewMode::Flamegraph => ProfileView::FlameGraph(&self.flame_graph),
            ViewMode::Calltree => ProfileView::CallTree(&self.call_tree),
            ViewMode::Bottomup => ProfileView::BottomUp(&self.bottom_up),
            ViewMode::Timeline => ProfileView::Timeline(&self.timeline),
            ViewMode::Source => ProfileView::Source(&self.source_files),
        }
    }

    /// Profile-wide normalization denominator (root total time)
    pub fn total_time(&self) -> f64 {
        self.stats.total_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_frame_defaults() {
        let frame: CallFrame = serde_json::from_str(r#"{"functionName":"main"}"#).unwrap();
        assert_eq!(frame.function_name, "main");
        assert_eq!(frame.url, "");
        assert_eq!(frame.line_number, -1);
        assert_eq!(frame.script_id, ScriptId::Text(String::new()));
    }

    #[test]
    fn test_script_id_accepts_numbers() {
        let frame: CallFrame =
            serde_json::from_str(r#"{"functionName":"f","scriptId":42,"url":"a.js"}"#).unwrap();
        assert_eq!(frame.script_id, ScriptId::Number(42));
    }

    #[test]
    fn test_display_name_and_diff_key() {
        let frame = CallFrame::new("", "app.js", 10, 2);
        assert_eq!(frame.display_name(), "(anonymous)");
        assert_eq!(frame.diff_key(), "(anonymous)|app.js|10");
    }

    #[test]
    fn test_sample_stream_requires_both_sequences() {
        let mut profile = RawProfile {
            nodes: vec![],
            start_time: 0.0,
            end_time: 10.0,
            samples: Some(vec![1]),
            time_deltas: None,
            title: None,
        };
        assert!(profile.sample_stream().is_none());

        profile.time_deltas = Some(vec![]);
        assert!(profile.sample_stream().is_none());

        profile.time_deltas = Some(vec![5.0]);
        assert!(profile.sample_stream().is_some());
    }

    #[test]
    fn test_view_mode_from_str() {
        assert_eq!("flamegraph".parse::<ViewMode>().unwrap(), ViewMode::Flamegraph);
        assert_eq!("call-tree".parse::<ViewMode>().unwrap(), ViewMode::Calltree);
        assert_eq!("Bottom_Up".parse::<ViewMode>().unwrap(), ViewMode::Bottomup);
        assert!("pie".parse::<ViewMode>().is_err());
    }
}
