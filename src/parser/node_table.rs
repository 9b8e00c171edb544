//! Arena-and-index node table.
//!
//! Every profile node is stored once in a flat vector and referenced by
//! index everywhere else. Child ids are resolved to indices up front and a
//! reverse parent multimap is built, so shared or cyclic children never
//! need pointer juggling: "already seen" is a bitmap lookup.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use super::category::{categorize, Category};
use super::schema::{CallFrame, PositionTick, RawNode};
use crate::utils::config::SYNTHETIC_FRAME_NAMES;
use crate::utils::error::ParseError;

/// One node of the table with its derived timing
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileNode {
    pub id: u64,
    pub call_frame: CallFrame,
    pub hit_count: u64,

    /// Child ids exactly as listed in the input
    pub children: Vec<u64>,

    pub position_ticks: Vec<PositionTick>,

    /// Microseconds spent in this frame itself
    pub self_time: f64,

    /// Self time plus the total time of the subtree this node owns
    pub total_time: f64,

    pub self_percentage: f64,
    pub total_percentage: f64,
    pub category: Category,
}

impl ProfileNode {
    fn from_raw(raw: &RawNode) -> Self {
        Self {
            id: raw.id,
            call_frame: raw.call_frame.clone(),
            hit_count: raw.hit_count,
            children: raw.children.clone(),
            position_ticks: raw.position_ticks.clone(),
            self_time: 0.0,
            total_time: 0.0,
            self_percentage: 0.0,
            total_percentage: 0.0,
            category: categorize(&raw.call_frame),
        }
    }

    pub fn name(&self) -> &str {
        self.call_frame.display_name()
    }

    /// `(root)` and `(program)` are bookkeeping frames, not functions
    pub fn is_synthetic(&self) -> bool {
        is_synthetic_name(&self.call_frame.function_name)
    }
}

/// Whether a function name belongs to a synthetic profiler frame
pub fn is_synthetic_name(name: &str) -> bool {
    SYNTHETIC_FRAME_NAMES.contains(&name)
}

/// Indexed node graph of one profile
///
/// The first input node is the root. Timing fields and the spanning forest
/// are filled in by `aggregator::timing::apply_timing`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeTable {
    nodes: Vec<ProfileNode>,
    index: HashMap<u64, usize>,
    child_indices: Vec<Vec<usize>>,
    parent_indices: Vec<Vec<usize>>,

    pub(crate) tree_children: Vec<Vec<usize>>,
    pub(crate) tree_roots: Vec<usize>,
    pub(crate) depths: Vec<u32>,
    pub(crate) denominator: f64,
}

impl NodeTable {
    /// Index raw nodes and resolve child references
    ///
    /// **Public** - first stage of every analysis
    ///
    /// # Errors
    /// `MalformedInput` when `nodes` is empty.
    ///
    /// Duplicate ids keep their first occurrence. Child ids that name no
    /// node are skipped.
    pub fn build(raw_nodes: &[RawNode]) -> Result<Self, ParseError> {
        if raw_nodes.is_empty() {
            return Err(ParseError::MalformedInput(
                "profile contains no nodes".to_string(),
            ));
        }

        let mut nodes = Vec::with_capacity(raw_nodes.len());
        let mut index = HashMap::with_capacity(raw_nodes.len());
        let mut duplicates = 0usize;

        for raw in raw_nodes {
            if index.contains_key(&raw.id) {
                duplicates += 1;
                continue;
            }
            index.insert(raw.id, nodes.len());
            nodes.push(ProfileNode::from_raw(raw));
        }

        if duplicates > 0 {
            warn!("Ignored {} node(s) with duplicate ids", duplicates);
        }

        let mut child_indices = Vec::with_capacity(nodes.len());
        let mut parent_indices = vec![Vec::new(); nodes.len()];
        let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();
        let mut unresolved = 0usize;

        for (parent_idx, node) in nodes.iter().enumerate() {
            let mut resolved = Vec::with_capacity(node.children.len());
            for child_id in &node.children {
                match index.get(child_id) {
                    Some(&child_idx) => {
                        resolved.push(child_idx);
                        if seen_edges.insert((parent_idx, child_idx)) {
                            parent_indices[child_idx].push(parent_idx);
                        }
                    }
                    None => unresolved += 1,
                }
            }
            child_indices.push(resolved);
        }

        if unresolved > 0 {
            warn!("Skipped {} unresolved child reference(s)", unresolved);
        }

        debug!("Indexed {} nodes", nodes.len());

        let len = nodes.len();
        Ok(Self {
            nodes,
            index,
            child_indices,
            parent_indices,
            tree_children: vec![Vec::new(); len],
            tree_roots: Vec::new(),
            depths: vec![0; len],
            denominator: 0.0,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the root node
    pub fn root(&self) -> usize {
        0
    }

    pub fn nodes(&self) -> &[ProfileNode] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> &ProfileNode {
        &self.nodes[idx]
    }

    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut ProfileNode {
        &mut self.nodes[idx]
    }

    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn get_by_id(&self, id: u64) -> Option<&ProfileNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    /// Resolved children, in input order
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.child_indices[idx]
    }

    /// Every distinct node that lists `idx` as a child
    pub fn parents(&self, idx: usize) -> &[usize] {
        &self.parent_indices[idx]
    }

    /// Children owned by `idx` in the spanning forest
    ///
    /// A shared child belongs to the first parent that reaches it in
    /// depth-first order; cycles are cut.
    pub fn tree_children(&self, idx: usize) -> &[usize] {
        &self.tree_children[idx]
    }

    /// Forest roots: the profile root, then any node it never reaches
    pub fn tree_roots(&self) -> &[usize] {
        &self.tree_roots
    }

    /// Depth in the spanning forest (root is 0)
    pub fn depth(&self, idx: usize) -> u32 {
        self.depths[idx]
    }

    pub fn max_depth(&self) -> u32 {
        self.depths.iter().copied().max().unwrap_or(0)
    }

    /// Normalization denominator for every percentage in the profile
    pub fn denominator(&self) -> f64 {
        self.denominator
    }

    /// Sum of self time over all nodes
    pub fn total_self_time(&self) -> f64 {
        self.nodes.iter().map(|n| n.self_time).sum()
    }
}
