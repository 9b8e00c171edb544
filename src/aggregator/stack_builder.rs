//! Build collapsed stack format from a timed node table.
//!
//! Collapsed ("folded") stacks are the interchange format of most external
//! flame graph tooling.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "(root);main;parseConfig 1200"
//! This means: main called parseConfig, which spent 1200µs on its own.

use log::debug;
use std::collections::HashMap;

use crate::parser::node_table::NodeTable;

/// A single collapsed stack entry
///
/// **Public** - used by the folded output writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (self time of the leaf, whole microseconds)
    pub weight: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    ///
    /// **Public** - constructor
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as one line of folded output
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from the spanning forest
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `table` - Timed node table
///
/// # Returns
/// One entry per distinct path, heaviest first (ties by stack text)
///
/// # Algorithm
/// 1. Walk each forest tree depth-first, carrying the path so far
/// 2. Emit the path of every node with self time
/// 3. Aggregate by unique path (sum weights)
pub fn build_collapsed_stacks(table: &NodeTable) -> Vec<CollapsedStack> {
    // Map to aggregate stacks: stack_string -> total_weight
    let mut stack_map: HashMap<String, u64> = HashMap::new();

    for &tree_root in table.tree_roots() {
        let mut stack: Vec<(usize, String)> = vec![(tree_root, frame_label(table, tree_root))];

        while let Some((idx, path)) = stack.pop() {
            let weight = table.node(idx).self_time.round() as u64;
            if weight > 0 {
                *stack_map.entry(path.clone()).or_insert(0) += weight;
            }

            for &child in table.tree_children(idx).iter().rev() {
                stack.push((child, format!("{};{}", path, frame_label(table, child))));
            }
        }
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

/// Render stacks as folded text, one line each
pub fn to_folded_text(stacks: &[CollapsedStack]) -> String {
    let mut out = String::new();
    for stack in stacks {
        out.push_str(&stack.to_line());
        out.push('\n');
    }
    out
}

/// Frame name safe for the folded format
fn frame_label(table: &NodeTable, idx: usize) -> String {
    table.node(idx).name().replace(';', ":").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::timing::apply_timing;
    use crate::parser::schema::{CallFrame, RawNode, RawProfile};
    use pretty_assertions::assert_eq;

    fn table(nodes: Vec<(u64, &str, u64, Vec<u64>)>) -> NodeTable {
        let profile = RawProfile {
            nodes: nodes
                .into_iter()
                .map(|(id, name, hits, children)| RawNode {
                    id,
                    call_frame: CallFrame::new(name, "app.js", 0, 0),
                    hit_count: hits,
                    children,
                    position_ticks: vec![],
                    deopt_reason: None,
                })
                .collect(),
            start_time: 0.0,
            end_time: 1000.0,
            samples: None,
            time_deltas: None,
            title: None,
        };
        let mut table = NodeTable::build(&profile.nodes).unwrap();
        apply_timing(&mut table, &profile);
        table
    }

    #[test]
    fn test_collapsed_stack_to_line() {
        let stack = CollapsedStack::new("main;execute;read".to_string(), 1000);
        assert_eq!(stack.to_line(), "main;execute;read 1000");
    }

    #[test]
    fn test_build_collapsed_stacks() {
        let t = table(vec![
            (1, "(root)", 0, vec![2, 3]),
            (2, "main", 1, vec![4]),
            (3, "worker", 1, vec![5]),
            (4, "parse", 2, vec![]),
            (5, "parse", 6, vec![]),
        ]);
        let stacks = build_collapsed_stacks(&t);

        assert_eq!(
            stacks,
            vec![
                CollapsedStack::new("(root);worker;parse".to_string(), 600),
                CollapsedStack::new("(root);main;parse".to_string(), 200),
                CollapsedStack::new("(root);main".to_string(), 100),
                CollapsedStack::new("(root);worker".to_string(), 100),
            ]
        );
    }

    #[test]
    fn test_separator_in_name_is_escaped() {
        let t = table(vec![(1, "(root)", 0, vec![2]), (2, "a;b", 1, vec![])]);
        let text = to_folded_text(&build_collapsed_stacks(&t));
        assert_eq!(text, "(root);a:b 1000\n");
    }
}
