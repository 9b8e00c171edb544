//! CPU Profile Studio
//!
//! Analysis, flamegraphs and regression diffing for V8 CPU profiles
//! (`.cpuprofile` files recorded by Node.js `--cpu-prof` or Chrome
//! DevTools).
//!
//! This crate provides the core implementation for the `cpuprof` CLI
//! tool, and can be used directly as a library.
//!
//! ## Getting Started
//!
//! ```ignore
//! use cpuprofile_studio::parser::{parse_profile, ViewMode};
//!
//! let parsed = parse_profile(&std::fs::read_to_string("app.cpuprofile")?)?;
//! for function in parsed.hot_functions.iter().take(5) {
//!     println!("{} {:.1}%", function.name, function.self_percentage);
//! }
//! let flame = parsed.view(ViewMode::Flamegraph);
//! ```

pub mod aggregator;
pub mod commands;
pub mod diff;
pub mod filter;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod utils;
