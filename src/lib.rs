//! Build Trace Studio
//!
//! Flamegraph generation and analysis for line-delimited build
//! trace files.
//!
//! The core is a three-stage pipeline over an in-memory trace:
//!
//! ```text
//! raw text --parse_trace--> events + warnings
//!          --build_trace_tree--> forest of nodes
//!          --convert_to_flamegraph--> { name, value, children }
//! ```
//!
//! ## Getting Started
//!
//! ```
//! use build_trace_studio::aggregator::build_trace_tree;
//! use build_trace_studio::flamegraph::convert_to_flamegraph;
//! use build_trace_studio::parser::parse_trace;
//!
//! let raw = r#"{"name":"compile","duration":120,"startTime":0,"traceId":"t1","id":1}"#;
//! let parsed = parse_trace(raw);
//! let forest = build_trace_tree(&parsed.events);
//! let flame = convert_to_flamegraph(&forest);
//! assert_eq!(flame.value, 120.0);
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod utils;
