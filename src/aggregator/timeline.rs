//! Execution timeline reconstructed from the sample stream.
//!
//! Consecutive samples of the same node collapse into one event. Event
//! depth comes from the memoized spanning-forest depths, so no per-event
//! path search is needed.

use serde::{Deserialize, Serialize};

use super::timing::sample_delta;
use crate::parser::category::Category;
use crate::parser::node_table::NodeTable;
use crate::parser::schema::RawProfile;

/// A run of consecutive samples in one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub node_id: u64,

    /// Offset from the profile start, microseconds
    pub start_time: f64,

    /// Sum of the run's time deltas, microseconds
    pub duration: f64,

    pub name: String,
    pub depth: u32,
    pub category: Category,
}

impl TimelineEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineData {
    pub events: Vec<TimelineEvent>,

    /// Profile span (end - start), microseconds
    pub duration: f64,

    pub max_depth: u32,
}

/// Open run while walking the stream
struct Run {
    sample_id: u64,
    start: f64,
}

/// Rebuild the timeline
///
/// **Public** - one of the derived views
///
/// Profiles without a sample stream yield no events. Samples that name an
/// unknown node still end the current run but produce no event.
pub fn build_timeline(table: &NodeTable, profile: &RawProfile) -> TimelineData {
    let mut timeline = TimelineData {
        events: Vec::new(),
        duration: profile.duration(),
        max_depth: 0,
    };

    let Some((samples, deltas)) = profile.sample_stream() else {
        return timeline;
    };

    let mut clock = 0.0;
    let mut current: Option<Run> = None;

    for (i, &sample_id) in samples.iter().enumerate() {
        let switched = current.as_ref().map_or(true, |run| run.sample_id != sample_id);
        if switched {
            if let Some(run) = current.take() {
                close_run(table, run, clock, &mut timeline);
            }
            current = Some(Run {
                sample_id,
                start: clock,
            });
        }
        clock += sample_delta(deltas, i);
    }

    if let Some(run) = current {
        close_run(table, run, clock, &mut timeline);
    }

    timeline
}

fn close_run(table: &NodeTable, run: Run, end: f64, timeline: &mut TimelineData) {
    let Some(idx) = table.index_of(run.sample_id) else {
        return;
    };
    let node = table.node(idx);
    let depth = table.depth(idx);

    timeline.max_depth = timeline.max_depth.max(depth);
    timeline.events.push(TimelineEvent {
        node_id: node.id,
        start_time: run.start,
        duration: end - run.start,
        name: node.name().to_string(),
        depth,
        category: node.category,
    });
}
