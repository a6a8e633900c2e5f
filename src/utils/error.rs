//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while validating a single candidate trace record
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{0}")]
    Invalid(#[from] serde_json::Error),

    #[error("field `name` must not be empty")]
    EmptyName,

    #[error("field `{0}` must be a finite number")]
    NonFinite(&'static str),
}

/// Reason a trace line was rejected
///
/// Never fatal: the parser records it as a warning and moves on.
#[derive(Error, Debug)]
pub enum LineError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object or an array of objects, found {0}")]
    WrongShape(&'static str),

    #[error("Invalid trace event: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid trace event at index {index}: {source}")]
    Element { index: usize, source: SchemaError },
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to render flamegraph: {0}")]
    RenderFailed(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
