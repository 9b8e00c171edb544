//! Derived views over a timed node table.
//!
//! This module transforms the node table into:
//! - Flame graph and top-down call tree
//! - Bottom-up view and hot function ranking
//! - Timeline, source-file aggregates, stats and summary charts
//! - Collapsed stacks (for external flame graph tooling)

pub mod bottom_up;
pub mod call_tree;
pub mod flame;
pub mod hot_functions;
pub mod metrics;
pub mod source_files;
pub mod stack_builder;
pub mod timeline;
pub mod timing;
mod tree;

// Re-export main types and functions
pub use bottom_up::{build_bottom_up, BottomUpNode, CallerSummary};
pub use call_tree::{build_call_tree, CallTreeNode};
pub use flame::{build_flame_graph, FlameNode};
pub use hot_functions::{extract_hot_functions, HotFunction, RelatedFunction};
pub use metrics::{
    build_summary, calculate_categories, calculate_stats, CategoryStats, ChartDataPoint,
    HistogramBucket, ProfileStats, SummaryData,
};
pub use source_files::{
    build_source_files, reconcile_lines, LineContribution, SourceFile, SourceFunction, SourceLine,
};
pub use stack_builder::{build_collapsed_stacks, to_folded_text, CollapsedStack};
pub use timeline::{build_timeline, TimelineData, TimelineEvent};
pub use timing::{apply_timing, compute_self_times};
