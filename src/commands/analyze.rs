//! Analyze command implementation.
//! Parses one profile, prints the requested views and writes artifacts.

use anyhow::{Context, Result};
use colored::*;
use log::{debug, info};

use super::models::AnalyzeArgs;
use crate::aggregator::build_collapsed_stacks;
use crate::flamegraph::{generate_flamegraph, generate_text_summary};
use crate::output::{build_export, write_export, write_folded, write_svg, ExportOptions};
use crate::parser::load_profile;
use crate::parser::schema::ParsedProfile;
use crate::utils::config::AnalysisOptions;
use crate::utils::{format_time, load_options};

/// Validate analyze arguments before doing any work
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input profile not found: {}", args.input.display());
    }
    if args.top_functions == Some(0) {
        anyhow::bail!("--top must be at least 1");
    }
    if args.filter.min_percentage < 0.0 || args.filter.min_percentage > 100.0 {
        anyhow::bail!("--min-percent must be between 0 and 100");
    }
    Ok(())
}

/// Resolve analysis options: file first, then CLI overrides
pub(crate) fn resolve_options(
    options_file: Option<&std::path::Path>,
    top_functions: Option<usize>,
) -> Result<AnalysisOptions> {
    let mut options = match options_file {
        Some(path) => load_options(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => AnalysisOptions::default(),
    };
    if let Some(top) = top_functions {
        options = options.with_top_functions(top);
    }
    Ok(options)
}

/// Execute the analyze command
///
/// **Public** - main entry point for `cpuprof analyze`
pub fn execute_analyze(args: AnalyzeArgs) -> Result<ParsedProfile> {
    let mut options = resolve_options(args.options_file.as_deref(), args.top_functions)?;
    if let Some(grouping) = args.grouping {
        options = options.with_grouping(grouping);
    }
    if options.top_functions == 0 {
        anyhow::bail!("top_functions must be at least 1");
    }
    debug!("Analysis options: {:?}", options);

    let parsed = load_profile(&args.input, &options)
        .with_context(|| format!("Failed to analyze {}", args.input.display()))?;
    info!(
        "Analyzed {} nodes, {} samples, {} total",
        parsed.stats.total_nodes,
        parsed.stats.total_samples,
        format_time(parsed.stats.total_time)
    );

    if let Some(mode) = args.view {
        println!("{}", serde_json::to_string_pretty(&parsed.view(mode))?);
    }

    if let Some(path) = &args.output_json {
        let export_options = if args.full_export {
            ExportOptions::full()
        } else {
            ExportOptions::default()
        };
        write_export(&build_export(&parsed, &export_options), path)
            .context("Failed to write JSON analysis")?;
        println!("📊 Analysis written to {}", path.display().to_string().cyan());
    }

    if let Some(path) = &args.output_svg {
        let svg = generate_flamegraph(&parsed.flame_graph, args.flamegraph_config.as_ref())
            .context("Failed to generate flamegraph")?;
        write_svg(&svg, path).context("Failed to write flamegraph")?;
        println!("🔥 Flamegraph written to {}", path.display().to_string().cyan());
    }

    if let Some(path) = &args.output_folded {
        let stacks = build_collapsed_stacks(&parsed.table);
        write_folded(&stacks, path).context("Failed to write folded stacks")?;
        println!("📄 Folded stacks written to {}", path.display().to_string().cyan());
    }

    if args.print_summary {
        let shown: Vec<_> = args
            .filter
            .hot_functions(&parsed.hot_functions)
            .into_iter()
            .cloned()
            .collect();
        println!();
        println!(
            "{}",
            generate_text_summary(&shown, options.top_functions, parsed.total_time())
        );
        print_categories(&parsed);
    }

    Ok(parsed)
}

fn print_categories(parsed: &ParsedProfile) {
    println!();
    println!("  {}", "CATEGORY BREAKDOWN".bold());
    for row in &parsed.summary.category_breakdown {
        println!(
            "  {:<20} {:>12} {:>6.1}%",
            row.label,
            format_time(row.time),
            row.percentage
        );
    }
}
