//! Profile parsing and schema definitions.
//!
//! This module handles:
//! - Decoding V8 `.cpuprofile` JSON
//! - Indexing nodes and resolving the call graph
//! - Categorizing call frames
//! - Defining the `ParsedProfile` aggregate and its views

pub mod category;
pub mod cpuprofile;
pub mod node_table;
pub mod schema;

// Re-export main types
pub use category::{categorize, Category};
pub use cpuprofile::{
    analyze, load_profile, parse_profile, parse_profile_bytes, parse_profile_with,
    validate_profile_format,
};
pub use node_table::{NodeTable, ProfileNode};
pub use schema::{
    CallFrame, ParsedProfile, PositionTick, ProfileView, RawNode, RawProfile, ScriptId, ViewMode,
};
