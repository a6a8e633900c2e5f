//! Line-delimited trace file parser.
//!
//! Every non-blank line holds either one event object or an array of
//! event objects. Lines are parsed independently: a bad line is skipped
//! and reported, it never aborts the whole file.

use super::schema::{ParseResult, ParseWarning, TraceEvent};
use crate::utils::config::EXCERPT_MAX_CHARS;
use crate::utils::error::LineError;
use log::{debug, info};
use serde_json::Value;

/// Result of parsing a single line
#[derive(Debug)]
pub enum LineOutcome {
    /// Whitespace only; produces neither events nor warnings
    Blank,

    /// Every candidate record on the line validated
    Parsed(Vec<TraceEvent>),

    /// The line was skipped as a whole
    Rejected(LineError),
}

/// Parse a raw trace file
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `raw` - Full text contents of the trace file
///
/// # Returns
/// All events from accepted lines plus one warning per rejected line.
/// Malformed input never produces an error.
pub fn parse_trace(raw: &str) -> ParseResult {
    let mut result = ParseResult::default();

    for (index, line) in raw.trim().split('\n').enumerate() {
        match parse_line(line) {
            LineOutcome::Blank => {}
            LineOutcome::Parsed(events) => result.events.extend(events),
            LineOutcome::Rejected(error) => {
                let warning = ParseWarning {
                    line: index + 1,
                    reason: error.to_string(),
                    excerpt: excerpt(line),
                };
                debug!("Skipping {}", warning);
                result.warnings.push(warning);
            }
        }
    }

    info!(
        "Parsed {} trace events ({} lines skipped)",
        result.events.len(),
        result.warnings.len()
    );

    result
}

/// Parse a single line into its discriminated outcome
///
/// **Public** - exposed for callers that stream lines themselves
pub fn parse_line(line: &str) -> LineOutcome {
    if line.trim().is_empty() {
        return LineOutcome::Blank;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return LineOutcome::Rejected(LineError::Json(e)),
    };

    let parsed = match value {
        Value::Array(items) => parse_batch(items),
        Value::Object(_) => TraceEvent::from_value(value)
            .map(|event| vec![event])
            .map_err(LineError::Schema),
        other => Err(LineError::WrongShape(json_kind(&other))),
    };

    match parsed {
        Ok(events) => LineOutcome::Parsed(events),
        Err(e) => LineOutcome::Rejected(e),
    }
}

/// Validate every element of an array line; one bad element rejects the line
///
/// **Private** - internal helper for parse_line
fn parse_batch(items: Vec<Value>) -> Result<Vec<TraceEvent>, LineError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            TraceEvent::from_value(item).map_err(|source| LineError::Element { index, source })
        })
        .collect()
}

/// Human-readable name of a JSON value's type
///
/// **Private** - internal utility
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Truncate a line for display in a warning
///
/// **Public** - counts characters, not bytes, so multi-byte text is never split
pub fn excerpt(line: &str) -> String {
    match line.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}
