//! Flame graph rendering.
//!
//! This module turns the flame graph view into an SVG image colored by
//! execution category, plus a compact terminal summary.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
