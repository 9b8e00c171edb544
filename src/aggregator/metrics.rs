//! Profile statistics and summary charts.
//!
//! Stats cover the whole profile (category totals, gc/idle time, sampling
//! rate, top functions). The summary projects stats, hot functions and the
//! timeline into chart-ready series.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::hot_functions::HotFunction;
use super::timeline::TimelineData;
use crate::parser::category::Category;
use crate::parser::node_table::NodeTable;
use crate::parser::schema::RawProfile;
use crate::utils::config::{AnalysisOptions, CATEGORY_BREAKDOWN_MIN_PERCENT, CHART_NAME_MAX_CHARS};
use crate::utils::{format_time, percent_of};

/// Time attributed to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Category,

    /// Summed self time, microseconds
    pub time: f64,

    pub percentage: f64,

    /// Number of nodes in the category
    pub count: usize,

    pub color: String,
    pub label: String,
}

/// Whole-profile statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Normalization denominator (root total time)
    pub total_time: f64,
    pub total_samples: usize,
    pub total_nodes: usize,
    pub top_functions: Vec<HotFunction>,
    pub gc_time: f64,
    pub idle_time: f64,

    /// Heaviest first
    pub categories: Vec<CategoryStats>,

    pub samples_per_second: f64,
}

impl ProfileStats {
    /// Time recorded for `category`, 0 when absent
    pub fn category_time(&self, category: Category) -> f64 {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map_or(0.0, |c| c.time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
    pub color: String,
}

/// Chart-ready projections of a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    pub category_breakdown: Vec<CategoryStats>,
    pub timeline_histogram: Vec<HistogramBucket>,
    pub top_functions_chart: Vec<ChartDataPoint>,
    pub call_depth_distribution: Vec<HistogramBucket>,
}

/// Self time per category
///
/// Only categories with at least one node are listed. Sorting is stable on
/// top of a fixed category order, so equal times always come out the same way.
pub fn calculate_categories(table: &NodeTable) -> Vec<CategoryStats> {
    let denominator = table.denominator();
    let mut totals: BTreeMap<Category, (f64, usize)> = BTreeMap::new();

    for node in table.nodes() {
        let entry = totals.entry(node.category).or_insert((0.0, 0));
        entry.0 += node.self_time;
        entry.1 += 1;
    }

    let mut categories: Vec<CategoryStats> = totals
        .into_iter()
        .map(|(category, (time, count))| CategoryStats {
            category,
            time,
            percentage: percent_of(time, denominator),
            count,
            color: category.color().to_string(),
            label: category.label().to_string(),
        })
        .collect();

    categories.sort_by(|a, b| b.time.total_cmp(&a.time));
    categories
}

/// Calculate whole-profile statistics
///
/// **Public** - consumed by the summary builder and the differ
///
/// # Arguments
/// * `profile` - Raw profile (sample count and duration)
/// * `table` - Timed node table
/// * `hot_functions` - Output of the hot-function extractor
/// * `top_n` - Number of hot functions kept in `top_functions`
pub fn calculate_stats(
    profile: &RawProfile,
    table: &NodeTable,
    hot_functions: &[HotFunction],
    top_n: usize,
) -> ProfileStats {
    let categories = calculate_categories(table);

    let mut gc_time = 0.0;
    let mut idle_time = 0.0;
    for node in table.nodes() {
        match node.category {
            Category::Gc => gc_time += node.self_time,
            Category::Idle => idle_time += node.self_time,
            _ => {}
        }
    }

    let total_samples = profile.sample_count();
    let duration_seconds = profile.duration() / 1_000_000.0;
    let samples_per_second = if duration_seconds > 0.0 {
        total_samples as f64 / duration_seconds
    } else {
        0.0
    };

    debug!(
        "Stats: {} nodes, {} samples, {} categories",
        table.len(),
        total_samples,
        categories.len()
    );

    ProfileStats {
        total_time: table.denominator(),
        total_samples,
        total_nodes: table.len(),
        top_functions: hot_functions.iter().take(top_n).cloned().collect(),
        gc_time,
        idle_time,
        categories,
        samples_per_second,
    }
}

/// Build the chart projections
///
/// **Public** - last stage of every analysis
pub fn build_summary(
    stats: &ProfileStats,
    hot_functions: &[HotFunction],
    timeline: &TimelineData,
    table: &NodeTable,
    options: &AnalysisOptions,
) -> SummaryData {
    let category_breakdown = stats
        .categories
        .iter()
        .filter(|c| c.percentage > CATEGORY_BREAKDOWN_MIN_PERCENT)
        .cloned()
        .collect();

    SummaryData {
        category_breakdown,
        timeline_histogram: build_timeline_histogram(timeline, options.histogram_buckets),
        top_functions_chart: build_top_functions_chart(hot_functions, options.top_functions),
        call_depth_distribution: build_depth_distribution(table, stats.total_time),
    }
}

/// Equal-width buckets over the profile span, each holding the overlap of
/// every timeline event with the bucket window
pub fn build_timeline_histogram(timeline: &TimelineData, buckets: usize) -> Vec<HistogramBucket> {
    if buckets == 0 {
        return Vec::new();
    }

    let bucket_size = timeline.duration / buckets as f64;

    (0..buckets)
        .map(|i| {
            let start = i as f64 * bucket_size;
            let end = start + bucket_size;

            let value: f64 = timeline
                .events
                .iter()
                .filter(|event| event.start_time < end && event.end_time() > start)
                .map(|event| event.end_time().min(end) - event.start_time.max(start))
                .sum();

            HistogramBucket {
                label: format_time(start),
                value,
                percentage: percent_of(value, bucket_size),
            }
        })
        .collect()
}

fn build_top_functions_chart(hot_functions: &[HotFunction], top_n: usize) -> Vec<ChartDataPoint> {
    hot_functions
        .iter()
        .take(top_n)
        .map(|function| ChartDataPoint {
            name: truncate_label(&function.name, CHART_NAME_MAX_CHARS),
            value: function.self_time,
            percentage: function.self_percentage,
            color: function.category.color().to_string(),
        })
        .collect()
}

/// Self time bucketed by depth from the root, shallowest first
pub fn build_depth_distribution(table: &NodeTable, total_time: f64) -> Vec<HistogramBucket> {
    let mut by_depth: BTreeMap<u32, f64> = BTreeMap::new();
    for (idx, node) in table.nodes().iter().enumerate() {
        *by_depth.entry(table.depth(idx)).or_insert(0.0) += node.self_time;
    }

    by_depth
        .into_iter()
        .map(|(depth, value)| HistogramBucket {
            label: format!("Depth {}", depth),
            value,
            percentage: percent_of(value, total_time),
        })
        .collect()
}

/// Shorten to `max_chars` characters followed by "..."
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() > max_chars {
        let head: String = name.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
