//! Flame graph construction.
//!
//! Width is a node's share of the profile denominator; `x` is its parent's
//! offset plus the widths of the siblings emitted before it. Children keep
//! input adjacency order and zero-width children are dropped.

use serde::{Deserialize, Serialize};

use super::tree::assemble;
use crate::parser::category::Category;
use crate::parser::node_table::NodeTable;
use crate::utils::fraction_of;

/// One frame of the flame graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameNode {
    /// Node id in the input profile
    pub id: u64,
    pub name: String,
    pub url: String,
    pub line_number: i64,

    /// Inclusive time in microseconds
    pub value: f64,

    /// Exclusive time in microseconds
    pub self_value: f64,

    /// Horizontal offset, 0..1
    pub x: f64,

    /// Share of the profile, 0..1
    pub width: f64,

    pub depth: u32,
    pub category: Category,
    pub children: Vec<FlameNode>,
}

impl FlameNode {
    /// All frames in preorder
    pub fn flatten(&self) -> Vec<&FlameNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Deepest frame level in the graph
    pub fn max_depth(&self) -> u32 {
        self.flatten().iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

#[derive(Clone, Copy)]
struct Placement {
    x: f64,
    width: f64,
    depth: u32,
}

/// Build the flame graph rooted at the profile root
///
/// **Public** - one of the derived views
pub fn build_flame_graph(table: &NodeTable) -> FlameNode {
    let denominator = table.denominator();
    let root = table.root();
    let root_placement = Placement {
        x: 0.0,
        width: fraction_of(table.node(root).total_time, denominator),
        depth: 0,
    };

    assemble(
        root,
        root_placement,
        |idx, parent| {
            let mut offset = parent.x;
            let mut placed = Vec::new();
            for &child in table.tree_children(idx) {
                let width = fraction_of(table.node(child).total_time, denominator);
                if width <= 0.0 {
                    continue;
                }
                placed.push((
                    child,
                    Placement {
                        x: offset,
                        width,
                        depth: parent.depth + 1,
                    },
                ));
                offset += width;
            }
            placed
        },
        |idx, placement, children| {
            let node = table.node(idx);
            FlameNode {
                id: node.id,
                name: node.name().to_string(),
                url: node.call_frame.url.clone(),
                line_number: node.call_frame.line_number,
                value: node.total_time,
                self_value: node.self_time,
                x: placement.x,
                width: placement.width,
                depth: placement.depth,
                category: node.category,
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
    fn test_widths_and_offsets() {
        let t = table(vec![
            (1, "(root)", 0, vec![2, 3]),
            (2, "a", 1, vec![]),
            (3, "b", 3, vec![]),
        ]);
        let flame = build_flame_graph(&t);

        assert_eq!(flame.width, 1.0);
        assert_eq!(flame.children.len(), 2);
        assert_eq!(flame.children[0].name, "a");
        assert_eq!(flame.children[0].x, 0.0);
        assert_eq!(flame.children[0].width, 0.25);
        assert_eq!(flame.children[1].x, 0.25);
        assert_eq!(flame.children[1].width, 0.75);
        assert_eq!(flame.children[1].depth, 1);
    }

    #[test]
    fn test_zero_width_children_pruned() {
        let t = table(vec![
            (1, "(root)", 0, vec![2, 3]),
            (2, "idle", 0, vec![]),
            (3, "b", 2, vec![]),
        ]);
        let flame = build_flame_graph(&t);
        assert_eq!(flame.children.len(), 1);
        assert_eq!(flame.children[0].name, "b");
        assert_eq!(flame.children[0].x, 0.0);
    }

    #[test]
    fn test_children_never_exceed_parent() {
        let t = table(vec![
            (1, "(root)", 1, vec![2, 3]),
            (2, "a", 2, vec![4]),
            (3, "b", 3, vec![4]),
            (4, "shared", 4, vec![2]),
        ]);
        let flame = build_flame_graph(&t);
        for node in flame.flatten() {
            let sum: f64 = node.children.iter().map(|c| c.width).sum();
            assert!(sum <= node.width + 1e-12);
        }
    }

    #[test]
    fn test_empty_profile_root_has_zero_width() {
        let t = table(vec![(1, "(root)", 0, vec![2]), (2, "a", 0, vec![])]);
        let flame = build_flame_graph(&t);
        assert_eq!(flame.width, 0.0);
        assert!(flame.children.is_empty());
    }
}
