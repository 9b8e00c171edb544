//! Execution-kind classification of call frames.
//!
//! Classification is a pure function of the call frame: the same
//! (name, url) pair always lands in the same category, in every profile.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::schema::CallFrame;

/// Coarse execution kind used for cost attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Javascript,
    Native,
    Gc,
    Idle,
    Program,
    System,
    Wasm,
    Regexp,
    Compile,
    Other,
}

impl Category {
    /// Every category, in a fixed order
    pub const ALL: [Category; 10] = [
        Self::Javascript,
        Self::Native,
        Self::Gc,
        Self::Idle,
        Self::Program,
        Self::System,
        Self::Wasm,
        Self::Regexp,
        Self::Compile,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Javascript => "javascript",
            Self::Native => "native",
            Self::Gc => "gc",
            Self::Idle => "idle",
            Self::Program => "program",
            Self::System => "system",
            Self::Wasm => "wasm",
            Self::Regexp => "regexp",
            Self::Compile => "compile",
            Self::Other => "other",
        }
    }

    /// Human-readable label for charts and terminal output
    pub fn label(self) -> &'static str {
        match self {
            Self::Javascript => "JavaScript",
            Self::Native => "Native",
            Self::Gc => "Garbage Collection",
            Self::Idle => "Idle",
            Self::Program => "Program",
            Self::System => "System",
            Self::Wasm => "WebAssembly",
            Self::Regexp => "RegExp",
            Self::Compile => "Compile",
            Self::Other => "Other",
        }
    }

    /// Chart and flame graph fill color
    pub fn color(self) -> &'static str {
        match self {
            Self::Javascript => "#60a5fa",
            Self::Native => "#a78bfa",
            Self::Gc => "#f97316",
            Self::Idle => "#6b7280",
            Self::Program => "#64748b",
            Self::System => "#ec4899",
            Self::Wasm => "#14b8a6",
            Self::Regexp => "#eab308",
            Self::Compile => "#f472b6",
            Self::Other => "#94a3b8",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".ts", ".mjs"];

/// Classify a call frame
///
/// **Public** - used by the node table and by diffing
///
/// Rules are checked in order and the first match wins; anything left
/// over is `Other`.
///
/// # Example
/// ```ignore
/// let frame = CallFrame::new("(garbage collector)", "", -1, -1);
/// assert_eq!(categorize(&frame), Category::Gc);
/// ```
pub fn categorize(frame: &CallFrame) -> Category {
    categorize_parts(&frame.function_name, &frame.url)
}

/// Classify a bare (function name, url) pair
pub fn categorize_parts(function_name: &str, url: &str) -> Category {
    let name = function_name.to_lowercase();
    let url = url.to_lowercase();

    if name == "(idle)" {
        return Category::Idle;
    }
    if name == "(program)" || name == "(root)" {
        return Category::Program;
    }
    if name.contains("garbage collector") || name.contains("(gc)") {
        return Category::Gc;
    }
    if name.contains("regexp") || name.contains("regular expression") {
        return Category::Regexp;
    }
    if name.contains("compile") || name.contains("optimize") {
        return Category::Compile;
    }
    if url.contains("wasm") || name.contains("wasm") {
        return Category::Wasm;
    }
    if url.is_empty() || url.starts_with("native ") || name.starts_with("native ") {
        return Category::Native;
    }
    if url.contains("node:") || url.contains("internal/") {
        return Category::System;
    }
    if SCRIPT_EXTENSIONS.iter().any(|ext| url.ends_with(ext)) {
        return Category::Javascript;
    }

    Category::Other
}
