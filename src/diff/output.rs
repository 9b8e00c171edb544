//! Terminal output rendering for diff reports.
//!
//! Provides human-readable summaries of profile comparisons
//! with visual cues (emojis) for regressions and improvements.

use colored::*;

use super::schema::{DiffReport, FunctionDiff};
use crate::utils::format_time;

/// Render a human-readable summary of a diff report for the terminal
pub fn render_terminal_diff(report: &DiffReport) -> String {
    let mut out = String::new();

    out.push_str(&render_header(report));
    out.push_str(&render_total_time(report));
    out.push_str(&render_stats(report));
    out.push_str(&render_categories(report));
    out.push_str(&render_functions("Top Regressions", &report.deltas.top_regressions));
    out.push_str(&render_functions("Top Improvements", &report.deltas.top_improvements));
    out.push_str(&render_added_removed(report));
    out.push_str(&render_status(report));

    out
}

fn render_header(report: &DiffReport) -> String {
    let mut out = String::new();
    out.push_str("\n📊 ");
    out.push_str(&"Profile Comparison Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!("Baseline:   {}\n", report.baseline.name));
    out.push_str(&format!("Comparison: {}\n", report.comparison.name));
    out.push_str("---------------------------------------------------\n\n");
    out
}

fn render_total_time(report: &DiffReport) -> String {
    let total = &report.deltas.stats_comparison.total_time;
    format!(
        "{} Total Time: {} -> {} ({:+.2}%)\n",
        get_delta_symbol(total.diff),
        format_time(total.baseline),
        format_time(total.comparison),
        total.diff_percentage
    )
}

fn render_stats(report: &DiffReport) -> String {
    let stats = &report.deltas.stats_comparison;
    let mut out = String::new();
    out.push_str(&format!(
        "{} Samples: {} -> {}\n",
        get_delta_symbol(stats.total_samples.diff),
        stats.total_samples.baseline,
        stats.total_samples.comparison
    ));
    out.push_str(&format!(
        "{} GC Time: {} -> {}\n",
        get_delta_symbol(stats.gc_time.diff),
        format_time(stats.gc_time.baseline),
        format_time(stats.gc_time.comparison)
    ));
    out
}

fn render_categories(report: &DiffReport) -> String {
    let mut out = String::new();
    let mut rows: Vec<_> = report
        .deltas
        .category_comparison
        .iter()
        .filter(|c| c.time_diff != 0.0)
        .collect();

    if rows.is_empty() {
        return out;
    }

    rows.sort_by(|a, b| b.time_diff.abs().total_cmp(&a.time_diff.abs()));
    out.push_str("\nCategory Changes:\n");
    for row in rows.iter().take(5) {
        out.push_str(&format!(
            "  {} {}: {:.1}% -> {:.1}% ({:+.1} pts)\n",
            get_delta_symbol(row.time_diff),
            row.label,
            row.baseline_percentage,
            row.comparison_percentage,
            row.percentage_diff
        ));
    }
    out
}

fn render_functions(title: &str, functions: &[FunctionDiff]) -> String {
    let mut out = String::new();
    if functions.is_empty() {
        return out;
    }

    out.push_str(&format!("\n{}:\n", title));
    for function in functions.iter().take(5) {
        let line = format!(
            "  {} {}: {} -> {} ({:+.2}%)\n",
            get_delta_symbol(function.self_time_diff),
            function.name,
            format_time(function.baseline_self_time),
            format_time(function.comparison_self_time),
            function.self_time_diff_percentage
        );
        if function.self_time_diff > 0.0 {
            out.push_str(&line.red().to_string());
        } else {
            out.push_str(&line.green().to_string());
        }
    }
    out
}

fn render_added_removed(report: &DiffReport) -> String {
    let diff = &report.deltas.diff;
    if diff.added_functions.is_empty() && diff.removed_functions.is_empty() {
        return String::new();
    }
    format!(
        "\n➕ {} new function(s), ➖ {} removed function(s)\n",
        diff.added_functions.len(),
        diff.removed_functions.len()
    )
}

fn render_status(report: &DiffReport) -> String {
    let mut out = String::new();
    out.push_str("\n---------------------------------------------------\n");
    if let Some(warning) = &report.summary.warning {
        out.push_str(&format!("⚠️  {}\n", warning).yellow().to_string());
    }
    let status_msg = match report.summary.status.as_str() {
        "FAILED" => format!(
            "❌ STATUS: REGRESSION DETECTED ({} violations)",
            report.summary.violation_count
        )
        .red()
        .bold(),
        "WARNING" => format!(
            "⚠️  STATUS: WARNING ({} violations)",
            report.summary.violation_count
        )
        .yellow()
        .bold(),
        _ => "✅ STATUS: PASSED".green().bold(),
    };
    out.push_str(&status_msg.to_string());
    out.push('\n');
    out
}

fn get_delta_symbol(change: f64) -> &'static str {
    if change > 0.0 {
        "📈"
    } else if change < 0.0 {
        "📉"
    } else {
        "➡️"
    }
}
