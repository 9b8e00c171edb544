//! JSON output writer.
//!
//! Writes analysis exports and diff reports with pretty formatting.

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::prepare_output_path;
use crate::aggregator::{
    BottomUpNode, CallTreeNode, FlameNode, HotFunction, ProfileStats, SourceFile, SummaryData,
    TimelineData,
};
use crate::diff::DiffReport;
use crate::parser::schema::ParsedProfile;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;

/// Which heavy views go into an export
///
/// Stats and summary are always included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_flame_graph: bool,
    pub include_call_tree: bool,
    pub include_bottom_up: bool,
    pub include_hot_functions: bool,
    pub include_timeline: bool,
    pub include_source_files: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_flame_graph: false,
            include_call_tree: false,
            include_bottom_up: false,
            include_hot_functions: true,
            include_timeline: false,
            include_source_files: false,
        }
    }
}

impl ExportOptions {
    /// Every view
    pub fn full() -> Self {
        Self {
            include_flame_graph: true,
            include_call_tree: true,
            include_bottom_up: true,
            include_hot_functions: true,
            include_timeline: true,
            include_source_files: true,
        }
    }
}

/// Serialized analysis of one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: String,
    pub generated_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub stats: ProfileStats,
    pub summary: SummaryData,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_functions: Option<Vec<HotFunction>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_up: Option<Vec<BottomUpNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flame_graph: Option<FlameNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_tree: Option<CallTreeNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineData>,

    /// Keyed by script url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_files: Option<BTreeMap<String, SourceFile>>,
}

/// Build an export document from a parsed profile
pub fn build_export(profile: &ParsedProfile, options: &ExportOptions) -> ExportDocument {
    ExportDocument {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        title: profile.profile.title.clone(),
        stats: profile.stats.clone(),
        summary: profile.summary.clone(),
        hot_functions: options
            .include_hot_functions
            .then(|| profile.hot_functions.clone()),
        bottom_up: options.include_bottom_up.then(|| profile.bottom_up.clone()),
        flame_graph: options
            .include_flame_graph
            .then(|| profile.flame_graph.clone()),
        call_tree: options.include_call_tree.then(|| profile.call_tree.clone()),
        timeline: options.include_timeline.then(|| profile.timeline.clone()),
        source_files: options
            .include_source_files
            .then(|| profile.source_files.clone()),
    }
}

/// Write an export document to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let export = build_export(&parsed, &ExportOptions::default());
/// write_export(&export, "analysis.json")?;
/// ```
pub fn write_export(
    document: &ExportDocument,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing analysis to: {}", output_path.display());
    write_pretty(document, output_path)?;
    info!(
        "Analysis written successfully ({} bytes)",
        file_size(output_path)
    );
    Ok(())
}

/// Read an export document back from disk
pub fn read_export(input_path: impl AsRef<Path>) -> Result<ExportDocument, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading analysis from: {}", input_path.display());

    let file = File::open(input_path)?;
    let document: ExportDocument = serde_json::from_reader(BufReader::new(file))?;

    debug!(
        "Analysis loaded: version {}, {} nodes",
        document.version, document.stats.total_nodes
    );
    Ok(document)
}

/// Write a diff report to a JSON file
pub fn write_diff_report(
    report: &DiffReport,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing diff report to: {}", output_path.display());
    write_pretty(report, output_path)
}

/// Read a diff report back from disk
pub fn read_diff_report(input_path: impl AsRef<Path>) -> Result<DiffReport, OutputError> {
    let file = File::open(input_path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_pretty<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    prepare_output_path(output_path)?;
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
