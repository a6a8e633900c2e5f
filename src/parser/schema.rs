//! Trace record schema definitions.
//!
//! This module defines the shape of a single trace event as it appears
//! in a line-delimited trace file, and the result of parsing such a file.

use crate::utils::error::SchemaError;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single validated trace event
///
/// Field names follow the camelCase keys of the trace file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    /// Event label
    pub name: String,

    /// Elapsed time in milliseconds (may be fractional)
    pub duration: f64,

    /// Offset in milliseconds from the trace origin
    pub start_time: f64,

    /// Identifier of the trace session this event belongs to
    pub trace_id: String,

    /// Absolute wall-clock time
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,

    /// Unique identifier within the trace
    #[serde(default, deserialize_with = "present_integer", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// `id` of the enclosing event
    #[serde(default, deserialize_with = "present_integer", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,

    /// Arbitrary string metadata
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

/// Optional fields may be absent, but when present they must carry a value
/// of the declared type. `null` is rejected rather than read as absent.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Like `present`, for identifiers. Any integral JSON number is accepted,
/// so `1.0` and `1` name the same event.
fn present_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(id) = number.as_i64() {
        return Ok(Some(id));
    }

    match number.as_f64() {
        // 2^63 is the first float past i64::MAX
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < 9_223_372_036_854_775_808.0 => {
            Ok(Some(f as i64))
        }
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Other(&number.to_string()),
            &"an integer",
        )),
    }
}

impl TraceEvent {
    /// Validate one candidate record against the event schema
    ///
    /// **Public** - used by the line parser for objects and array elements
    ///
    /// # Errors
    /// * `SchemaError::Invalid` - missing required field or wrongly typed field
    /// * `SchemaError::EmptyName` - `name` is an empty string
    /// * `SchemaError::NonFinite` - `duration` or `startTime` is not finite
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let event: TraceEvent = serde_json::from_value(value)?;
        event.validate()?;
        Ok(event)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if !self.duration.is_finite() {
            return Err(SchemaError::NonFinite("duration"));
        }
        if !self.start_time.is_finite() {
            return Err(SchemaError::NonFinite("startTime"));
        }
        Ok(())
    }
}

/// A rejected line, as reported back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number (after trimming the whole input)
    pub line: usize,

    /// Human-readable failure reason
    pub reason: String,

    /// Start of the offending line, ellipsised when truncated
    pub excerpt: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {} - \"{}\"", self.line, self.reason, self.excerpt)
    }
}

/// Outcome of parsing a whole trace file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    /// Every event from every accepted line, in file order
    pub events: Vec<TraceEvent>,

    /// One entry per rejected line
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    /// True when no event could be extracted from the input
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Warnings rendered as plain strings
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_fields_only() {
        let event = TraceEvent::from_value(json!({
            "name": "compile",
            "duration": 12.5,
            "startTime": 3,
            "traceId": "abc"
        }))
        .unwrap();

        assert_eq!(event.name, "compile");
        assert_eq!(event.duration, 12.5);
        assert_eq!(event.start_time, 3.0);
        assert!(event.id.is_none());
        assert!(event.tags.is_none());
    }

    #[test]
    fn test_missing_trace_id() {
        let err = TraceEvent::from_value(json!({
            "name": "compile",
            "duration": 1,
            "startTime": 0
        }))
        .unwrap_err();

        assert!(err.to_string().contains("traceId"));
    }

    #[test]
    fn test_null_optional_field_rejected() {
        let result = TraceEvent::from_value(json!({
            "name": "compile",
            "duration": 1,
            "startTime": 0,
            "traceId": "t",
            "parentId": null
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_non_string_tag_rejected() {
        let result = TraceEvent::from_value(json!({
            "name": "compile",
            "duration": 1,
            "startTime": 0,
            "traceId": "t",
            "tags": { "count": 3 }
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_integral_float_id_accepted() {
        let event = TraceEvent::from_value(json!({
            "name": "resolve",
            "duration": 1,
            "startTime": 0,
            "traceId": "t",
            "id": 2.0,
            "parentId": 1.0
        }))
        .unwrap();

        assert_eq!(event.id, Some(2));
        assert_eq!(event.parent_id, Some(1));
    }

    #[test]
    fn test_fractional_id_rejected() {
        let err = TraceEvent::from_value(json!({
            "name": "resolve",
            "duration": 1,
            "startTime": 0,
            "traceId": "t",
            "id": 1.5
        }))
        .unwrap_err();

        assert!(err.to_string().contains("an integer"));
    }

    #[test]
    fn test_string_id_rejected() {
        let result = TraceEvent::from_value(json!({
            "name": "resolve",
            "duration": 1,
            "startTime": 0,
            "traceId": "t",
            "id": "1"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = TraceEvent::from_value(json!({
            "name": "",
            "duration": 1,
            "startTime": 0,
            "traceId": "t"
        }))
        .unwrap_err();

        assert!(matches!(err, SchemaError::EmptyName));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let event = TraceEvent::from_value(json!({
            "name": "compile",
            "duration": 1,
            "startTime": 0,
            "traceId": "t",
            "extra": [1, 2, 3]
        }))
        .unwrap();

        assert_eq!(event.trace_id, "t");
    }

    #[test]
    fn test_warning_display() {
        let warning = ParseWarning {
            line: 4,
            reason: "Invalid JSON: EOF".to_string(),
            excerpt: "{\"name\"".to_string(),
        };

        assert_eq!(warning.to_string(), "Line 4: Invalid JSON: EOF - \"{\"name\"\"");
    }
}
