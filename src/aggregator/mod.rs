//! Aggregation of parsed trace events into trees and metrics.
//!
//! This module transforms validated events into:
//! - A forest of parent/child linked nodes (for flamegraph projection)
//! - Structural anomaly reports (duplicate ids, dangling parents, cycles)
//! - Tag statistics and page compilation analysis

pub mod metrics;
pub mod tree_builder;

// Re-export main types and functions
pub use metrics::{
    analyze_pages, collect_tag_stats, is_page_related, page_identifier, summarize_events,
    PageAnalysis, PageGroup, TagStat, TraceSummary,
};
pub use tree_builder::{
    build_trace_forest, build_trace_tree, StructuralAnomaly, TraceForest, TraceNode,
};
