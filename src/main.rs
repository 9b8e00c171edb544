//! CPU Profile Studio CLI
//!
//! Analysis, flamegraphs and regression diffing for V8 `.cpuprofile`
//! files recorded by Node.js and Chrome.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use cpuprofile_studio::commands::{
    display_schema, display_version, execute_analyze, execute_diff, validate_args,
    validate_profile_file, AnalyzeArgs, DiffArgs,
};
use cpuprofile_studio::filter::ProfileFilter;
use cpuprofile_studio::flamegraph::FlamegraphConfig;
use cpuprofile_studio::parser::{Category, ViewMode};
use cpuprofile_studio::utils::GroupingKey;

/// CPU Profile Studio - analysis and diffing for V8 CPU profiles
#[derive(Parser, Debug)]
#[command(name = "cpuprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a profile and write views or artifacts
    Analyze {
        /// Input .cpuprofile file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON analysis
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for SVG flamegraph (placed in artifacts/ by default)
        #[arg(short, long, default_missing_value = "artifacts/flamegraph.svg", num_args = 0..=1)]
        flamegraph: Option<PathBuf>,

        /// Output path for folded stacks
        #[arg(long)]
        folded: Option<PathBuf>,

        /// TOML file with analysis options
        #[arg(long = "config", env = "CPUPROF_CONFIG")]
        options: Option<PathBuf>,

        /// Bottom-up grouping: "name" or "frame"
        #[arg(long = "group-by")]
        grouping: Option<GroupingKey>,

        /// Number of hot functions to show (default 10, or the options file value)
        #[arg(long)]
        top: Option<usize>,

        /// Print one view as JSON (summary, flamegraph, calltree, bottomup, timeline, source)
        #[arg(long)]
        view: Option<ViewMode>,

        /// Include every view in the JSON analysis
        #[arg(long)]
        full: bool,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Only show functions whose name or url contains this text
        #[arg(long)]
        search: Option<String>,

        /// Minimum self percentage to show
        #[arg(long, default_value = "0")]
        min_percent: f64,

        /// Hide idle and program time
        #[arg(long)]
        hide_idle: bool,

        /// Hide garbage collection
        #[arg(long)]
        hide_gc: bool,

        /// Hide native frames
        #[arg(long)]
        hide_native: bool,

        /// Only show these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<Category>,
    },

    /// Compare two profiles
    Diff {
        /// Baseline .cpuprofile
        #[arg(short, long)]
        baseline: PathBuf,

        /// Comparison .cpuprofile
        #[arg(short, long)]
        comparison: PathBuf,

        /// TOML threshold file
        #[arg(short, long = "threshold-file")]
        thresholds: Option<PathBuf>,

        /// Fail when total time grows by more than this percentage
        #[arg(long)]
        threshold_percent: Option<f64>,

        /// TOML file with analysis options
        #[arg(long = "config", env = "CPUPROF_CONFIG")]
        options: Option<PathBuf>,

        /// Output path for the JSON diff report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print terminal summary
        #[arg(long)]
        summary: bool,
    },

    /// Validate a .cpuprofile file
    Validate {
        /// Path to profile file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display export schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            output,
            flamegraph,
            folded,
            options,
            grouping,
            top,
            view,
            full,
            title,
            width,
            summary,
            search,
            min_percent,
            hide_idle,
            hide_gc,
            hide_native,
            categories,
        } => {
            // Create flamegraph config
            let fg_config = flamegraph.as_ref().map(|_| {
                let mut config = FlamegraphConfig::new().with_width(width);
                if let Some(title_str) = title {
                    config = config.with_title(title_str);
                }
                config
            });

            let filter = ProfileFilter {
                search: search.unwrap_or_default(),
                min_percentage: min_percent,
                hide_idle,
                hide_gc,
                hide_native,
                categories,
            };

            // Print a summary when nothing else was requested
            let nothing_requested =
                output.is_none() && flamegraph.is_none() && folded.is_none() && view.is_none();

            let args = AnalyzeArgs {
                input,
                output_json: output,
                output_svg: flamegraph,
                output_folded: folded,
                options_file: options,
                grouping,
                top_functions: top,
                view,
                full_export: full,
                flamegraph_config: fg_config,
                print_summary: summary || nothing_requested,
                filter,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Diff {
            baseline,
            comparison,
            thresholds,
            threshold_percent,
            options,
            output,
            summary,
        } => {
            let summary = summary || output.is_none();
            let args = DiffArgs {
                baseline,
                comparison,
                threshold_file: thresholds,
                threshold_percent,
                options_file: options,
                output,
                summary,
            };
            execute_diff(args)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
