//! Bottom-up (inverted) view.
//!
//! Node instances are merged into one entry per function and every entry
//! lists the functions that call it, weighted by the callers' self time.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::parser::category::Category;
use crate::parser::node_table::{is_synthetic_name, NodeTable};
use crate::utils::config::GroupingKey;
use crate::utils::percent_of;

/// One merged function in the bottom-up view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottomUpNode {
    /// Stable identifier, `bu-<grouping key>`
    pub id: String,
    pub name: String,

    /// Location of the first instance seen
    pub url: String,
    pub line_number: i64,

    pub self_time: f64,
    pub total_time: f64,
    pub self_percentage: f64,
    pub total_percentage: f64,
    pub hit_count: u64,
    pub category: Category,

    /// Immediate callers, heaviest first
    pub callers: Vec<CallerSummary>,
}

/// Aggregated caller of a bottom-up entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerSummary {
    pub name: String,

    /// Summed self time of the distinct caller nodes with this name
    pub self_time: f64,

    pub percentage: f64,

    /// Number of distinct caller nodes merged into this entry
    pub count: u64,
}

struct Group {
    key: String,
    first: usize,
    self_time: f64,
    total_time: f64,
    hit_count: u64,
    callers: Vec<usize>,
    seen_callers: HashSet<usize>,
}

/// Build the bottom-up view
///
/// **Public** - one of the derived views
///
/// # Arguments
/// * `table` - Timed node table
/// * `grouping` - Whether instances merge by function name alone or by
///   full (name, url, line) identity
///
/// # Returns
/// Entries sorted by self time, heaviest first. `(root)` and `(program)`
/// never appear.
pub fn build_bottom_up(table: &NodeTable, grouping: GroupingKey) -> Vec<BottomUpNode> {
    let denominator = table.denominator();
    let mut groups: Vec<Group> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (idx, node) in table.nodes().iter().enumerate() {
        let key = match grouping {
            GroupingKey::FunctionName => node.name().to_string(),
            GroupingKey::CallFrame => node.call_frame.diff_key(),
        };

        let group_idx = *by_key.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                first: idx,
                self_time: 0.0,
                total_time: 0.0,
                hit_count: 0,
                callers: Vec::new(),
                seen_callers: HashSet::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[group_idx];
        group.self_time += node.self_time;
        group.total_time += node.total_time;
        group.hit_count += node.hit_count;
        for &parent in table.parents(idx) {
            if group.seen_callers.insert(parent) {
                group.callers.push(parent);
            }
        }
    }

    let mut entries: Vec<BottomUpNode> = groups
        .into_iter()
        .filter(|group| !is_synthetic_name(&table.node(group.first).call_frame.function_name))
        .map(|group| {
            let first = table.node(group.first);
            BottomUpNode {
                id: format!("bu-{}", group.key),
                name: first.name().to_string(),
                url: first.call_frame.url.clone(),
                line_number: first.call_frame.line_number,
                self_time: group.self_time,
                total_time: group.total_time,
                self_percentage: percent_of(group.self_time, denominator),
                total_percentage: percent_of(group.total_time, denominator),
                hit_count: group.hit_count,
                category: first.category,
                callers: summarize_callers(table, &group.callers, denominator),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.self_time.total_cmp(&a.self_time));

    debug!("Bottom-up view: {} functions", entries.len());
    entries
}

/// Merge caller nodes by function name
fn summarize_callers(table: &NodeTable, callers: &[usize], denominator: f64) -> Vec<CallerSummary> {
    let mut summaries: Vec<CallerSummary> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();

    for &caller in callers {
        let node = table.node(caller);
        let name = node.name();
        match by_name.get(name) {
            Some(&i) => {
                summaries[i].self_time += node.self_time;
                summaries[i].count += 1;
            }
            None => {
                by_name.insert(name, summaries.len());
                summaries.push(CallerSummary {
                    name: name.to_string(),
                    self_time: node.self_time,
                    percentage: 0.0,
                    count: 1,
                });
            }
        }
    }

    for summary in &mut summaries {
        summary.percentage = percent_of(summary.self_time, denominator);
    }
    summaries.sort_by(|a, b| b.self_time.total_cmp(&a.self_time));
    summaries
}
