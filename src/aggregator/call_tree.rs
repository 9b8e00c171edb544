//! Top-down call tree.

use serde::{Deserialize, Serialize};

use super::tree::assemble;
use crate::parser::category::Category;
use crate::parser::node_table::NodeTable;
use crate::utils::config::EXPANDED_DEPTH;

/// One node of the top-down call tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTreeNode {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub line_number: i64,
    pub column_number: i64,
    pub hit_count: u64,
    pub self_time: f64,
    pub total_time: f64,
    pub self_percentage: f64,
    pub total_percentage: f64,
    pub category: Category,
    pub depth: u32,

    /// Initial disclosure hint, fixed at build time
    pub expanded: bool,

    pub children: Vec<CallTreeNode>,
}

impl CallTreeNode {
    /// Find a node by profile id (depth-first)
    pub fn find(&self, id: u64) -> Option<&CallTreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

/// Build the call tree rooted at the profile root
///
/// **Public** - one of the derived views
///
/// Children with no inclusive time are dropped; the rest are ordered by
/// total time, heaviest first, ties keeping input order.
pub fn build_call_tree(table: &NodeTable) -> CallTreeNode {
    assemble(
        table.root(),
        0u32,
        |idx, depth| {
            let mut children: Vec<usize> = table
                .tree_children(idx)
                .iter()
                .copied()
                .filter(|&c| table.node(c).total_time > 0.0)
                .collect();
            children.sort_by(|&a, &b| {
                table
                    .node(b)
                    .total_time
                    .total_cmp(&table.node(a).total_time)
            });
            children.into_iter().map(|c| (c, depth + 1)).collect()
        },
        |idx, depth, children| {
            let node = table.node(idx);
            CallTreeNode {
                id: node.id,
                name: node.name().to_string(),
                url: node.call_frame.url.clone(),
                line_number: node.call_frame.line_number,
                column_number: node.call_frame.column_number,
                hit_count: node.hit_count,
                self_time: node.self_time,
                total_time: node.total_time,
                self_percentage: node.self_percentage,
                total_percentage: node.total_percentage,
                category: node.category,
                depth,
                expanded: depth < EXPANDED_DEPTH,
                children,
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::timing::apply_timing;
    use crate::parser::schema::{CallFrame, RawNode, RawProfile};

    fn table(nodes: Vec<(u64, &str, u64, Vec<u64>)>) -> NodeTable {
        let profile = RawProfile {
            nodes: nodes
                .into_iter()
                .map(|(id, name, hits, children)| RawNode {
                    id,
                    call_frame: CallFrame::new(name, "app.js", 1, 1),
                    hit_count: hits,
                    children,
                    position_ticks: vec![],
                    deopt_reason: None,
                })
                .collect(),
            start_time: 0.0,
            end_time: 100.0,
            samples: None,
            time_deltas: None,
            title: None,
        };
        let mut table = NodeTable::build(&profile.nodes).unwrap();
        apply_timing(&mut table, &profile);
        table
    }

    #[test]
    fn test_sorted_by_total_time_stable() {
        let t = table(vec![
            (1, "(root)", 0, vec![2, 3, 4, 5]),
            (2, "light", 1, vec![]),
            (3, "heavy", 5, vec![]),
            (4, "tie_first", 2, vec![]),
            (5, "tie_second", 2, vec![]),
        ]);
        let tree = build_call_tree(&t);
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["heavy", "tie_first", "tie_second", "light"]);
    }

    #[test]
    fn test_zero_total_children_filtered() {
        let t = table(vec![(1, "(root)", 0, vec![2, 3]), (2, "a", 0, vec![]), (3, "b", 1, vec![])]);
        let tree = build_call_tree(&t);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "b");
    }

    #[test]
    fn test_expanded_hint_by_depth() {
        let t = table(vec![
            (1, "(root)", 0, vec![2]),
            (2, "a", 1, vec![3]),
            (3, "b", 1, vec![4]),
            (4, "c", 1, vec![]),
        ]);
        let tree = build_call_tree(&t);
        assert!(tree.expanded);
        assert!(tree.find(2).unwrap().expanded);
        assert!(!tree.find(3).unwrap().expanded);
        assert_eq!(tree.find(4).unwrap().depth, 3);
    }
}
