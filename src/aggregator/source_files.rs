//! Per-file line aggregates.
//!
//! Line data arrives from two places: position ticks recorded per sample
//! and the line a call frame is declared on. Both are collected as typed
//! contributions and merged by line number regardless of origin; every
//! merged line keeps its tick count and whether a frame declared it, so
//! the origin stays visible.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::parser::node_table::NodeTable;
use crate::utils::percent_of;

/// One piece of evidence about a source line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineContribution {
    /// Sampled ticks attributed to a line
    PositionTicks { line: i64, ticks: u64 },

    /// A call frame declared on a line
    CallFrame {
        line: i64,
        self_time: f64,
        total_time: f64,
        hit_count: u64,
    },
}

impl LineContribution {
    pub fn line(&self) -> i64 {
        match self {
            Self::PositionTicks { line, .. } | Self::CallFrame { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLine {
    pub line_number: i64,
    pub self_time: f64,
    pub total_time: f64,
    pub self_percentage: f64,

    /// Frame hit counts plus position ticks
    pub hit_count: u64,

    /// Portion of `hit_count` that came from position ticks
    pub tick_count: u64,

    /// Whether a call frame is declared on this line
    pub declared: bool,
}

/// Function declared in a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFunction {
    pub name: String,
    pub line_number: i64,
    pub self_time: f64,
    pub total_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub url: String,

    /// Last path segment of the url
    pub file_name: String,

    /// Ordered by line number, one entry per line
    pub lines: Vec<SourceLine>,

    /// Summed self time of every frame in the file
    pub total_time: f64,

    /// Heaviest first
    pub functions: Vec<SourceFunction>,
}

/// Merge line contributions into one ordered list
///
/// **Public** - the single reconciliation point for line data
///
/// Contributions for the same line are added together whatever their
/// origin. Negative lines (unknown positions) are dropped.
pub fn reconcile_lines(
    contributions: impl IntoIterator<Item = LineContribution>,
    denominator: f64,
) -> Vec<SourceLine> {
    let mut lines: BTreeMap<i64, SourceLine> = BTreeMap::new();

    for contribution in contributions {
        let line_number = contribution.line();
        if line_number < 0 {
            continue;
        }

        let line = lines.entry(line_number).or_insert_with(|| SourceLine {
            line_number,
            self_time: 0.0,
            total_time: 0.0,
            self_percentage: 0.0,
            hit_count: 0,
            tick_count: 0,
            declared: false,
        });

        match contribution {
            LineContribution::PositionTicks { ticks, .. } => {
                line.hit_count += ticks;
                line.tick_count += ticks;
            }
            LineContribution::CallFrame {
                self_time,
                total_time,
                hit_count,
                ..
            } => {
                line.self_time += self_time;
                line.total_time += total_time;
                line.hit_count += hit_count;
                line.declared = true;
            }
        }
    }

    lines
        .into_values()
        .map(|mut line| {
            line.self_percentage = percent_of(line.self_time, denominator);
            line
        })
        .collect()
}

#[derive(Default)]
struct FileAccumulator {
    contributions: Vec<LineContribution>,
    total_time: f64,
    functions: Vec<SourceFunction>,
    by_function: HashMap<(String, i64), usize>,
}

/// Group nodes by script url
///
/// **Public** - one of the derived views
///
/// Frames without a url (native code, synthetic frames) belong to no file.
pub fn build_source_files(table: &NodeTable) -> BTreeMap<String, SourceFile> {
    let denominator = table.denominator();
    let mut files: BTreeMap<String, FileAccumulator> = BTreeMap::new();

    for node in table.nodes() {
        let url = &node.call_frame.url;
        if url.is_empty() {
            continue;
        }

        let file = files.entry(url.clone()).or_default();
        file.total_time += node.self_time;

        file.contributions.extend(node.position_ticks.iter().map(|tick| {
            LineContribution::PositionTicks {
                line: tick.line,
                ticks: tick.ticks,
            }
        }));
        file.contributions.push(LineContribution::CallFrame {
            line: node.call_frame.line_number,
            self_time: node.self_time,
            total_time: node.total_time,
            hit_count: node.hit_count,
        });

        let name = node.name().to_string();
        let line_number = node.call_frame.line_number;
        let functions = &mut file.functions;
        let function_idx = *file
            .by_function
            .entry((name.clone(), line_number))
            .or_insert_with(|| {
                functions.push(SourceFunction {
                    name,
                    line_number,
                    self_time: 0.0,
                    total_time: 0.0,
                });
                functions.len() - 1
            });
        let function = &mut file.functions[function_idx];
        function.self_time += node.self_time;
        function.total_time += node.total_time;
    }

    files
        .into_iter()
        .map(|(url, file)| {
            let mut functions = file.functions;
            functions.sort_by(|a, b| b.self_time.total_cmp(&a.self_time));

            let source = SourceFile {
                file_name: file_name(&url),
                lines: reconcile_lines(file.contributions, denominator),
                total_time: file.total_time,
                functions,
                url: url.clone(),
            };
            (url, source)
        })
        .collect()
}

fn file_name(url: &str) -> String {
    match url.rsplit('/').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::timing::apply_timing;
    use crate::parser::schema::{CallFrame, PositionTick, RawNode, RawProfile};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reconcile_merges_by_line() {
        let lines = reconcile_lines(
            vec![
                LineContribution::PositionTicks { line: 12, ticks: 3 },
                LineContribution::CallFrame {
                    line: 12,
                    self_time: 40.0,
                    total_time: 90.0,
                    hit_count: 2,
                },
                LineContribution::PositionTicks { line: 4, ticks: 1 },
                LineContribution::CallFrame {
                    line: -1,
                    self_time: 10.0,
                    total_time: 10.0,
                    hit_count: 1,
                },
            ],
            100.0,
        );

        assert_eq!(
            lines,
            vec![
                SourceLine {
                    line_number: 4,
                    self_time: 0.0,
                    total_time: 0.0,
                    self_percentage: 0.0,
                    hit_count: 1,
                    tick_count: 1,
                    declared: false,
                },
                SourceLine {
                    line_number: 12,
                    self_time: 40.0,
                    total_time: 90.0,
                    self_percentage: 40.0,
                    hit_count: 5,
                    tick_count: 3,
                    declared: true,
                },
            ]
        );
    }

    #[test]
    fn test_build_source_files() {
        let node = |id: u64, name: &str, url: &str, line: i64, hits: u64, children: Vec<u64>, ticks: Vec<PositionTick>| RawNode {
            id,
            call_frame: CallFrame::new(name, url, line, 0),
            hit_count: hits,
            children,
            position_ticks: ticks,
            deopt_reason: None,
        };
        let profile = RawProfile {
            nodes: vec![
                node(1, "(root)", "", -1, 0, vec![2, 3], vec![]),
                node(2, "load", "file:///srv/app/lib.js", 10, 1, vec![], vec![PositionTick { line: 11, ticks: 1 }]),
                node(3, "load", "file:///srv/app/lib.js", 10, 3, vec![], vec![]),
            ],
            start_time: 0.0,
            end_time: 400.0,
            samples: None,
            time_deltas: None,
            title: None,
        };
        let mut table = NodeTable::build(&profile.nodes).unwrap();
        apply_timing(&mut table, &profile);

        let files = build_source_files(&table);
        assert_eq!(files.len(), 1);

        let file = &files["file:///srv/app/lib.js"];
        assert_eq!(file.file_name, "lib.js");
        assert_eq!(file.total_time, 400.0);
        assert_eq!(file.functions.len(), 1);
        assert_eq!(file.functions[0].self_time, 400.0);

        let numbers: Vec<i64> = file.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![10, 11]);
        assert_eq!(file.lines[0].hit_count, 4);
        assert!(file.lines[0].declared);
        assert!(!file.lines[1].declared);
    }

    #[test]
    fn test_bundle_with_many_functions() {
        let count = 20_000u64;
        let mut nodes = vec![RawNode {
            id: 1,
            call_frame: CallFrame::new("(root)", "", -1, -1),
            hit_count: 0,
            children: (2..count + 2).collect(),
            position_ticks: vec![],
            deopt_reason: None,
        }];
        for id in 2..count + 2 {
            nodes.push(RawNode {
                id,
                call_frame: CallFrame::new(&format!("fn{}", id), "bundle.js", id as i64, 0),
                hit_count: 1,
                children: vec![],
                position_ticks: vec![],
                deopt_reason: None,
            });
        }
        let profile = RawProfile {
            nodes,
            start_time: 0.0,
            end_time: count as f64,
            samples: None,
            time_deltas: None,
            title: None,
        };
        let mut table = NodeTable::build(&profile.nodes).unwrap();
        apply_timing(&mut table, &profile);

        let started = std::time::Instant::now();
        let files = build_source_files(&table);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        let bundle = &files["bundle.js"];
        assert_eq!(bundle.functions.len(), count as usize);
        assert_eq!(bundle.lines.len(), count as usize);
        assert_eq!(bundle.total_time, count as f64);
    }

    #[test]
    fn test_file_name_fallback() {
        assert_eq!(file_name("https://cdn.example.com/x/bundle.mjs"), "bundle.mjs");
        assert_eq!(file_name("https://cdn.example.com/"), "https://cdn.example.com/");
    }
}
