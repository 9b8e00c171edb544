//! SVG flame graph generation from a built `FlameNode` tree.
//!
//! Frames are laid out from the precomputed `x`/`width` fractions, so the
//! picture always agrees with the JSON view. Layout details:
//! - Fill color comes from the frame's category
//! - Root sits at the bottom, callees stack upwards
//! - Frames narrower than half a pixel are skipped

use colored::*;
use log::info;
use std::collections::BTreeSet;

use crate::aggregator::flame::FlameNode;
use crate::aggregator::hot_functions::HotFunction;
use crate::parser::category::Category;
use crate::utils::error::FlamegraphError;
use crate::utils::{format_time, percent_of};

const TITLE_MARGIN: usize = 30;
const LEGEND_HEIGHT: usize = 80;
const CHAR_WIDTH: f64 = 7.0;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
    pub frame_height: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "CPU Profile".to_string(),
            width: 1200,
            frame_height: 20,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(100);
        self
    }
}

/// Generate an SVG flame graph
///
/// **Public** - used by the analyze command and the SVG writer
///
/// # Errors
/// * `FlamegraphError::EmptyGraph` - root has no width (no time recorded)
pub fn generate_flamegraph(
    root: &FlameNode,
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if root.width <= 0.0 || !root.width.is_finite() {
        return Err(FlamegraphError::EmptyGraph);
    }

    let config = config.cloned().unwrap_or_default();
    let frames = root.flatten();
    info!("Generating flamegraph with {} frames", frames.len());

    let max_depth = frames.iter().map(|f| f.depth).max().unwrap_or(0) as usize;
    let width = config.width as f64;
    let h = config.frame_height;
    let graph_height = (max_depth + 1) * h;
    let total_height = graph_height + TITLE_MARGIN + LEGEND_HEIGHT;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        config.width, total_height, config.width, total_height
    ));
    svg.push_str(
        r#"<style>.func { font: 12px sans-serif; } .func:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#,
    );
    svg.push_str(&format!(
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        config.width / 2,
        escape_xml(&config.title)
    ));

    let mut present = BTreeSet::new();
    for frame in &frames {
        let w = frame.width * width;
        if w < 0.5 {
            continue;
        }
        present.insert(frame.category);
        let x = frame.x * width;
        let y = TITLE_MARGIN + graph_height - (frame.depth as usize + 1) * h;
        render_frame(&mut svg, frame, x, y, w, h);
    }

    render_legend(&mut svg, &present, TITLE_MARGIN + graph_height);
    svg.push_str("</svg>");

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

fn render_frame(out: &mut String, frame: &FlameNode, x: f64, y: usize, w: f64, h: usize) {
    let name = escape_xml(&frame.name);
    let location = if frame.url.is_empty() {
        String::new()
    } else {
        format!(" {}:{}", escape_xml(&frame.url), frame.line_number + 1)
    };

    out.push_str(&format!(
        r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="func" data-id="{}"><title>{}{} ({}, {:.2}%)</title></rect>"#,
        x,
        y,
        w,
        h,
        frame.category.color(),
        frame.id,
        name,
        location,
        format_time(frame.value),
        frame.width * 100.0
    ));

    if w > 35.0 {
        let max_chars = (w / CHAR_WIDTH) as usize;
        let label = fit_label(&frame.name, max_chars);
        if !label.is_empty() {
            out.push_str(&format!(
                r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="white" pointer-events="none">{}</text>"#,
                x,
                y,
                escape_xml(&label)
            ));
        }
    }
}

fn render_legend(out: &mut String, present: &BTreeSet<Category>, graph_bottom: usize) {
    let legend_y = graph_bottom + 40;
    out.push_str(&format!(
        r#"<text x="10" y="{}" font-size="14" font-weight="bold">Legend:</text>"#,
        legend_y
    ));

    for (i, category) in present.iter().enumerate() {
        let x = 80 + i * 140;
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="15" height="15" fill="{}" rx="2"/>"#,
            x,
            legend_y - 12,
            category.color()
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="12">{}</text>"#,
            x + 20,
            legend_y,
            category.label()
        ));
    }
}

/// Shorten a name to `max_chars` characters, marking the cut with "..."
fn fit_label(name: &str, max_chars: usize) -> String {
    let count = name.chars().count();
    if count <= max_chars {
        return name.to_string();
    }
    if max_chars <= 3 {
        return String::new();
    }
    let kept: String = name.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn hex_rgb(color: &str) -> (u8, u8, u8) {
    let hex = color.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0x94)
    };
    (channel(0), channel(2), channel(4))
}

/// Create a terminal summary of the hottest functions
///
/// # Arguments
/// * `functions` - Hot functions, hottest first
/// * `max_lines` - Rows to show in the table
/// * `total_time` - Denominator for the percentage column, microseconds
pub fn generate_text_summary(functions: &[HotFunction], max_lines: usize, total_time: f64) -> String {
    let mut lines = Vec::new();

    lines.push("  🔥 HOT FUNCTIONS".to_string());
    lines.push(format!("  ┏{}┳{}┳{}┳{}┓", "━".repeat(44), "━".repeat(14), "━".repeat(14), "━".repeat(9)));
    lines.push(format!(
        "  ┃ {:<42} ┃ {:^12} ┃ {:^12} ┃ {:^7} ┃",
        "Function (Hottest First)", "SELF", "TOTAL", "%"
    ));
    lines.push(format!("  ┣{}╋{}╋{}╋{}┫", "━".repeat(44), "━".repeat(14), "━".repeat(14), "━".repeat(9)));

    for function in functions.iter().take(max_lines) {
        let (r, g, b) = hex_rgb(function.category.color());
        let name = fit_label(&function.name, 42);
        lines.push(format!(
            "  ┃ {} ┃ {:>12} ┃ {:>12} ┃ {:>6.1}% ┃",
            format!("{:<42}", name).truecolor(r, g, b),
            format_time(function.self_time),
            format_time(function.total_time),
            percent_of(function.self_time, total_time)
        ));
    }

    lines.push(format!("  ┗{}┻{}┻{}┻{}┛", "━".repeat(44), "━".repeat(14), "━".repeat(14), "━".repeat(9)));

    lines.push(String::new());
    lines.push("  📊 SELF TIME SHARE".to_string());
    for function in functions.iter().take(5) {
        let percentage = percent_of(function.self_time, total_time);
        let bar = "█".repeat((percentage / 2.0).clamp(0.0, 50.0) as usize);
        let (r, g, b) = hex_rgb(function.category.color());
        lines.push(format!(
            "  └─ {:<20} {:50} {:>5.1}%",
            fit_label(&function.name, 20),
            bar.truecolor(r, g, b),
            percentage
        ));
    }

    if functions.len() > max_lines {
        lines.push(String::new());
        lines.push(format!(
            "   (Showing top {} of {} functions)",
            max_lines,
            functions.len()
        ));
    }

    lines.join("\n")
}
