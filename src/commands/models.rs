use std::path::PathBuf;

use crate::filter::ProfileFilter;
use crate::flamegraph::FlamegraphConfig;
use crate::parser::schema::ViewMode;
use crate::utils::config::GroupingKey;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Input `.cpuprofile` file
    pub input: PathBuf,

    /// Output path for the JSON analysis (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for the SVG flame graph (optional)
    pub output_svg: Option<PathBuf>,

    /// Output path for folded stacks (optional)
    pub output_folded: Option<PathBuf>,

    /// TOML file with analysis options (optional)
    pub options_file: Option<PathBuf>,

    /// Overrides the bottom-up grouping from the options file
    pub grouping: Option<GroupingKey>,

    /// Overrides the options file's hot function count when set
    pub top_functions: Option<usize>,

    /// Print one view as JSON to stdout
    pub view: Option<ViewMode>,

    /// Include every view in the JSON analysis
    pub full_export: bool,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Applied to the printed hot function table
    pub filter: ProfileFilter,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_json: None,
            output_svg: None,
            output_folded: None,
            options_file: None,
            grouping: None,
            top_functions: None,
            view: None,
            full_export: false,
            flamegraph_config: None,
            print_summary: false,
            filter: ProfileFilter::default(),
        }
    }
}

/// Arguments for the diff command
#[derive(Debug, Clone, Default)]
pub struct DiffArgs {
    /// Baseline `.cpuprofile`
    pub baseline: PathBuf,

    /// Comparison `.cpuprofile`
    pub comparison: PathBuf,

    /// TOML threshold file (optional)
    pub threshold_file: Option<PathBuf>,

    /// Simple total-time increase limit, overrides the file's total_time section
    pub threshold_percent: Option<f64>,

    /// TOML file with analysis options (optional)
    pub options_file: Option<PathBuf>,

    /// Output path for the JSON diff report (optional)
    pub output: Option<PathBuf>,

    /// Print terminal summary
    pub summary: bool,
}
