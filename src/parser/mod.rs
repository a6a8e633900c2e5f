//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Splitting a trace file into lines
//! - Discriminating object lines from array lines
//! - Validating each candidate record against the event schema
//! - Collecting per-line warnings

pub mod schema;
pub mod trace_file;

// Re-export main types
pub use schema::{ParseResult, ParseWarning, TraceEvent};
pub use trace_file::{excerpt, parse_line, parse_trace, LineOutcome};
