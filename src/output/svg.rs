//! SVG and folded-stack output writers.

use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::prepare_output_path;
use crate::aggregator::stack_builder::{to_folded_text, CollapsedStack};
use crate::utils::error::OutputError;

/// Write SVG content to a file
///
/// **Public** - main entry point for SVG output
///
/// # Arguments
/// * `svg_content` - SVG string from the flamegraph generator
/// * `output_path` - Path to output SVG file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
///
/// # Example
/// ```ignore
/// let svg = generate_flamegraph(&parsed.flame_graph, None)?;
/// write_svg(&svg, "flamegraph.svg")?;
/// ```
pub fn write_svg(svg_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing SVG to: {}", output_path.display());

    if output_path.extension().is_some_and(|ext| ext != "svg") {
        debug!("File does not have .svg extension: {}", output_path.display());
    }

    write_text(svg_content, output_path)?;

    info!(
        "SVG written successfully ({:.2} KB)",
        svg_content.len() as f64 / 1024.0
    );
    Ok(())
}

/// Write collapsed stacks in folded format, one stack per line
pub fn write_folded(
    stacks: &[CollapsedStack],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!(
        "Writing {} folded stacks to: {}",
        stacks.len(),
        output_path.display()
    );
    write_text(&to_folded_text(stacks), output_path)
}

fn write_text(content: &str, output_path: &Path) -> Result<(), OutputError> {
    prepare_output_path(output_path)?;
    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    Ok(())
}
