//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while turning profile text into a `ParsedProfile`
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed profile input: {0}")]
    MalformedInput(String),
}

/// Errors that can occur while loading a profile from disk
///
/// I/O failures are kept apart from parse failures: the file reader is an
/// upstream collaborator, not part of the analysis core.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Flame graph has no visible frames")]
    EmptyGraph,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading analysis options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Options TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
