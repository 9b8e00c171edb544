use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::parser::{parse_profile_bytes, validate_profile_format};
use crate::utils::config::{AnalysisOptions, DIFF_VERSION, SCHEMA_VERSION};
use crate::utils::format_time;

/// Validate a `.cpuprofile` file
///
/// Checks the JSON shape first, then runs a full analysis.
pub fn validate_profile_file(file_path: &Path) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let bytes = std::fs::read(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let value: Value = serde_json::from_slice(&bytes).context("File is not valid JSON")?;
    if !validate_profile_format(&value) {
        anyhow::bail!("File has no non-empty `nodes` array");
    }

    let parsed = parse_profile_bytes(&bytes, &AnalysisOptions::default())?;

    println!("✓ Valid CPU profile");
    if let Some(title) = &parsed.profile.title {
        println!("  Title: {}", title);
    }
    println!("  Nodes: {}", parsed.stats.total_nodes);
    println!("  Samples: {}", parsed.stats.total_samples);
    println!("  Total Time: {}", format_time(parsed.stats.total_time));
    println!("  Hot Functions: {}", parsed.hot_functions.len());
    println!("  Source Files: {}", parsed.source_files.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("CPU Profile Studio Export Schema");
    println!("Analysis Version: {}", SCHEMA_VERSION);
    println!("Diff Report Version: {}", DIFF_VERSION);
    println!();

    if show_details {
        println!("Analysis Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string     - RFC 3339 timestamp");
        println!("  title: string?           - Profile title, if recorded");
        println!("  stats: object            - Totals, GC/idle time, categories");
        println!("  summary: object          - Chart-ready breakdowns");
        println!("  hot_functions: array?    - Per-node self/total time, hottest first");
        println!("  bottom_up: array?        - Grouped self time with callers");
        println!("  flame_graph: object?     - Nested frames with x/width in 0..1");
        println!("  call_tree: object?       - Top-down tree sorted by total time");
        println!("  timeline: object?        - Coalesced sample events");
        println!("  source_files: object?    - Per-url line and function times");
        println!();
        println!("Diff Report Structure:");
        println!("  diff_version: string     - Diff schema version");
        println!("  baseline/comparison      - Profile metadata");
        println!("  deltas: object           - Function, category and stats deltas");
        println!("  threshold_violations     - Limits exceeded");
        println!("  summary: object          - PASSED / WARNING / FAILED");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("CPU Profile Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Analysis Schema: v{}", SCHEMA_VERSION);
    println!("Diff Schema: v{}", DIFF_VERSION);
    println!();
    println!("Analysis, flamegraphs and regression diffing for V8 CPU profiles.");
}
