//! Self-time and total-time computation.
//!
//! Self time comes from the sample stream when the profile carries one,
//! otherwise from hit counts. Total time is an explicit-stack post-order
//! rollup over a spanning forest of the node graph: every node is entered
//! once, so a shared child counts under the first parent that reaches it
//! and a back edge contributes nothing.

use log::{debug, warn};

use crate::parser::node_table::NodeTable;
use crate::parser::schema::RawProfile;
use crate::utils::percent_of;

/// Fill every timing field of the table
///
/// **Public** - runs once per parse, right after the table is built
///
/// # Arguments
/// * `table` - Freshly built node table
/// * `profile` - Raw profile supplying samples, deltas and the time span
pub fn apply_timing(table: &mut NodeTable, profile: &RawProfile) {
    let self_times = compute_self_times(table, profile);
    for (idx, self_time) in self_times.iter().enumerate() {
        table.node_mut(idx).self_time = *self_time;
    }

    let forest = build_forest(table, &self_times);

    let denominator = normalization_denominator(forest.totals[table.root()], profile.duration());

    for (idx, total) in forest.totals.iter().enumerate() {
        let node = table.node_mut(idx);
        node.total_time = *total;
        node.self_percentage = percent_of(node.self_time, denominator);
        node.total_percentage = percent_of(node.total_time, denominator);
    }

    table.tree_children = forest.children;
    table.tree_roots = forest.roots;
    table.depths = forest.depths;
    table.denominator = denominator;

    debug!(
        "Timing applied: denominator={:.0}µs, forest roots={}",
        denominator,
        table.tree_roots.len()
    );
}

/// Self time per node index
///
/// Walks the sample stream once when both `samples` and `timeDeltas` are
/// present and non-empty; a missing or negative delta adds nothing.
/// Otherwise the profile duration is split in proportion to hit counts.
pub fn compute_self_times(table: &NodeTable, profile: &RawProfile) -> Vec<f64> {
    let mut self_times = vec![0.0; table.len()];

    let Some((samples, deltas)) = profile.sample_stream() else {
        debug!("No sample stream, distributing duration by hit count");
        distribute_by_hit_count(table, profile.duration(), &mut self_times);
        return self_times;
    };

    let mut unknown = 0usize;
    for (i, sample_id) in samples.iter().enumerate() {
        let delta = sample_delta(deltas, i);
        match table.index_of(*sample_id) {
            Some(idx) => self_times[idx] += delta,
            None => unknown += 1,
        }
    }

    if unknown > 0 {
        warn!("Skipped {} sample(s) referencing unknown node ids", unknown);
    }

    self_times
}

/// Time delta of sample `i`, clamped so malformed deltas never go negative
pub(crate) fn sample_delta(deltas: &[f64], i: usize) -> f64 {
    match deltas.get(i) {
        Some(delta) if delta.is_finite() && *delta > 0.0 => *delta,
        _ => 0.0,
    }
}

fn distribute_by_hit_count(table: &NodeTable, duration: f64, self_times: &mut [f64]) {
    let hit_sum: u64 = table.nodes().iter().map(|n| n.hit_count).sum();
    if hit_sum == 0 {
        return;
    }

    let hit_sum = hit_sum as f64;
    for (idx, node) in table.nodes().iter().enumerate() {
        self_times[idx] = duration * node.hit_count as f64 / hit_sum;
    }
}

/// Root total when positive, then the profile duration, then 0
fn normalization_denominator(root_total: f64, duration: f64) -> f64 {
    if root_total > 0.0 {
        root_total
    } else if duration > 0.0 {
        duration
    } else {
        0.0
    }
}

struct Forest {
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    depths: Vec<u32>,
    totals: Vec<f64>,
}

/// Spanning forest plus post-order totals
///
/// The profile root is traversed first; any node it never reaches starts
/// a tree of its own so that total >= self holds everywhere.
fn build_forest(table: &NodeTable, self_times: &[f64]) -> Forest {
    let len = table.len();
    let mut forest = Forest {
        children: vec![Vec::new(); len],
        roots: Vec::new(),
        depths: vec![0; len],
        totals: vec![0.0; len],
    };
    let mut visited = vec![false; len];

    let starts = std::iter::once(table.root()).chain(0..len);
    for start in starts {
        if visited[start] {
            continue;
        }
        forest.roots.push(start);
        visited[start] = true;

        // (node, position of the next child to inspect)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(&(node, pos)) = stack.last() {
            let children = table.children(node);
            if pos < children.len() {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let child = children[pos];
                if !visited[child] {
                    visited[child] = true;
                    forest.depths[child] = forest.depths[node] + 1;
                    forest.children[node].push(child);
                    stack.push((child, 0));
                }
            } else {
                let subtree: f64 = forest.children[node].iter().map(|&c| forest.totals[c]).sum();
                forest.totals[node] = self_times[node] + subtree;
                stack.pop();
            }
        }
    }

    if forest.roots.len() > 1 {
        debug!("{} node(s) unreachable from the root", forest.roots.len() - 1);
    }

    forest
}
