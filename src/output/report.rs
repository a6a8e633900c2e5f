//! Analysis report schema.
//!
//! The report bundles everything learned from one trace file besides the
//! flamegraph itself. Schema is versioned to allow future evolution.

use crate::aggregator::{
    analyze_pages, collect_tag_stats, summarize_events, PageAnalysis, TagStat, TraceForest,
    TraceSummary,
};
use crate::parser::ParseResult;
use crate::utils::config::SCHEMA_VERSION;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Trace file the report was computed from
    pub source: String,

    /// Timestamp when report was generated
    pub generated_at: String,

    pub event_count: usize,
    pub warning_count: usize,

    /// Rejected lines
    pub warnings: Vec<String>,

    /// Duplicate ids, dangling parents, cycles
    pub anomalies: Vec<String>,

    /// Number of top-level events in the rebuilt tree
    pub root_count: usize,

    pub summary: TraceSummary,
    pub tag_stats: Vec<TagStat>,
    pub page_analysis: PageAnalysis,
}

/// Assemble the report for one parsed trace
///
/// **Public** - used by commands to create the report output
pub fn to_report(source: &str, parsed: &ParseResult, forest: &TraceForest) -> TraceReport {
    TraceReport {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        event_count: parsed.events.len(),
        warning_count: parsed.warnings.len(),
        warnings: parsed.warning_messages(),
        anomalies: forest.warnings(),
        root_count: forest.roots.len(),
        summary: summarize_events(&parsed.events),
        tag_stats: collect_tag_stats(&parsed.events),
        page_analysis: analyze_pages(&parsed.events),
    }
}
