//! Main parser for V8 `.cpuprofile` documents.
//!
//! Turns profile text into a complete `ParsedProfile`: node table, timing,
//! then every derived view. Parsing is all-or-nothing; a failure leaves no
//! partial result behind.

use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::node_table::NodeTable;
use super::schema::{ParsedProfile, RawProfile};
use crate::aggregator::{
    apply_timing, build_bottom_up, build_call_tree, build_flame_graph, build_source_files,
    build_summary, build_timeline, calculate_stats, extract_hot_functions,
};
use crate::utils::config::AnalysisOptions;
use crate::utils::error::{LoadError, ParseError};

/// Parse profile text with default options
///
/// **Public** - main entry point for parsing
///
/// # Errors
/// * `ParseError::MalformedInput` - Invalid JSON, or no usable `nodes` array
pub fn parse_profile(content: &str) -> Result<ParsedProfile, ParseError> {
    parse_profile_with(content, &AnalysisOptions::default())
}

/// Parse profile text with explicit options
pub fn parse_profile_with(
    content: &str,
    options: &AnalysisOptions,
) -> Result<ParsedProfile, ParseError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| ParseError::MalformedInput(format!("invalid JSON: {}", e)))?;
    analyze(decode_profile(value)?, options)
}

/// Parse profile bytes (UTF-8 JSON)
pub fn parse_profile_bytes(
    bytes: &[u8],
    options: &AnalysisOptions,
) -> Result<ParsedProfile, ParseError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ParseError::MalformedInput(format!("invalid JSON: {}", e)))?;
    analyze(decode_profile(value)?, options)
}

/// Read and parse a profile file
///
/// The read happens in full before parsing starts; read failures are
/// reported as I/O errors, not parse errors.
pub fn load_profile(
    path: impl AsRef<Path>,
    options: &AnalysisOptions,
) -> Result<ParsedProfile, LoadError> {
    let path = path.as_ref();
    info!("Loading profile from {}", path.display());
    let bytes = fs::read(path)?;
    Ok(parse_profile_bytes(&bytes, options)?)
}

/// Check structural shape without building anything
///
/// **Public** - used by the `validate` command
pub fn validate_profile_format(value: &Value) -> bool {
    matches!(value.get("nodes"), Some(Value::Array(nodes)) if !nodes.is_empty())
}

/// Decode a JSON value into the raw profile shape
fn decode_profile(value: Value) -> Result<RawProfile, ParseError> {
    match value.get("nodes") {
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(ParseError::MalformedInput(
                "`nodes` is not an array".to_string(),
            ))
        }
        None => {
            return Err(ParseError::MalformedInput(
                "missing `nodes` array".to_string(),
            ))
        }
    }

    serde_json::from_value(value)
        .map_err(|e| ParseError::MalformedInput(format!("invalid profile structure: {}", e)))
}

/// Run the full analysis over a decoded profile
///
/// **Public** - usable when the raw profile was obtained elsewhere
///
/// # Arguments
/// * `profile` - Decoded raw profile; kept verbatim in the result
/// * `options` - Bottom-up grouping, histogram size and top-N
///
/// # Returns
/// The complete, immutable analysis
pub fn analyze(profile: RawProfile, options: &AnalysisOptions) -> Result<ParsedProfile, ParseError> {
    debug!(
        "Analyzing profile: {} nodes, {} samples",
        profile.nodes.len(),
        profile.sample_count()
    );

    let mut table = NodeTable::build(&profile.nodes)?;
    apply_timing(&mut table, &profile);

    let flame_graph = build_flame_graph(&table);
    let call_tree = build_call_tree(&table);
    let bottom_up = build_bottom_up(&table, options.bottom_up_grouping);
    let hot_functions = extract_hot_functions(&table);
    let timeline = build_timeline(&table, &profile);
    let stats = calculate_stats(&profile, &table, &hot_functions, options.top_functions);
    let summary = build_summary(&stats, &hot_functions, &timeline, &table, options);
    let source_files = build_source_files(&table);

    info!(
        "Parsed profile: {} nodes, {} hot functions, total {:.0}µs",
        table.len(),
        hot_functions.len(),
        stats.total_time
    );

    Ok(ParsedProfile {
        profile,
        table,
        flame_graph,
        call_tree,
        bottom_up,
        hot_functions,
        timeline,
        stats,
        summary,
        source_files,
    })
}
