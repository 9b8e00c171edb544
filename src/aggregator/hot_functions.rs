//! Per-call-site hot function ranking.

use serde::{Deserialize, Serialize};

use crate::parser::category::Category;
use crate::parser::node_table::NodeTable;
use crate::utils::percent_of;

/// A node with self time, plus one level of call context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotFunction {
    /// Node id in the input profile
    pub id: u64,
    pub name: String,
    pub url: String,
    pub line_number: i64,
    pub column_number: i64,
    pub self_time: f64,
    pub total_time: f64,
    pub self_percentage: f64,
    pub total_percentage: f64,
    pub hit_count: u64,
    pub category: Category,
    pub callers: Vec<RelatedFunction>,
    pub callees: Vec<RelatedFunction>,
}

impl HotFunction {
    /// `name|url|line`, the identity used to match functions across profiles
    pub fn diff_key(&self) -> String {
        format!("{}|{}|{}", self.name, self.url, self.line_number)
    }
}

/// Direct caller or callee of a hot function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedFunction {
    pub id: u64,
    pub name: String,
    pub self_time: f64,
    pub percentage: f64,
}

/// Extract hot functions from the node table
///
/// **Public** - one of the derived views
///
/// Every node instance with positive self time gets its own entry (no
/// merging by name); synthetic frames are skipped. The list and each
/// entry's callers/callees are sorted by self time, heaviest first.
pub fn extract_hot_functions(table: &NodeTable) -> Vec<HotFunction> {
    let denominator = table.denominator();

    let mut functions: Vec<HotFunction> = table
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.self_time > 0.0 && !node.is_synthetic())
        .map(|(idx, node)| HotFunction {
            id: node.id,
            name: node.name().to_string(),
            url: node.call_frame.url.clone(),
            line_number: node.call_frame.line_number,
            column_number: node.call_frame.column_number,
            self_time: node.self_time,
            total_time: node.total_time,
            self_percentage: node.self_percentage,
            total_percentage: node.total_percentage,
            hit_count: node.hit_count,
            category: node.category,
            callers: related(table, table.parents(idx), denominator),
            callees: related(table, table.children(idx), denominator),
        })
        .collect();

    functions.sort_by(|a, b| b.self_time.total_cmp(&a.self_time));
    functions
}

fn related(table: &NodeTable, indices: &[usize], denominator: f64) -> Vec<RelatedFunction> {
    let mut out: Vec<RelatedFunction> = indices
        .iter()
        .map(|&idx| {
            let node = table.node(idx);
            RelatedFunction {
                id: node.id,
                name: node.name().to_string(),
                self_time: node.self_time,
                percentage: percent_of(node.self_time, denominator),
            }
        })
        .collect();
    out.sort_by(|a, b| b.self_time.total_cmp(&a.self_time));
    out
}
