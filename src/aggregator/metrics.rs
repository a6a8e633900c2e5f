//! Summary statistics over parsed trace events.
//!
//! Page analysis groups compilation-related events by the page or route
//! they belong to, so the slowest pages stand out.

use crate::parser::TraceEvent;
use crate::utils::config::{FILE_TAG_MARKERS, PAGE_NAME_MARKERS, PAGE_TAG_MARKERS};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Distinct values seen for one tag key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStat {
    pub key: String,
    pub values: Vec<String>,
    pub count: usize,
}

/// Collect every tag key with its distinct values
///
/// **Public** - keys and values are returned sorted
pub fn collect_tag_stats(events: &[TraceEvent]) -> Vec<TagStat> {
    let mut tags: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for tag_map in events.iter().filter_map(|e| e.tags.as_ref()) {
        for (key, value) in tag_map {
            tags.entry(key).or_default().insert(value);
        }
    }

    tags.into_iter()
        .map(|(key, values)| TagStat {
            key: key.to_string(),
            count: values.len(),
            values: values.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

/// Events attributed to one page, route or file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGroup {
    pub identifier: String,
    pub event_count: usize,
    pub total_duration: f64,
    pub avg_duration: f64,

    /// Slowest first
    pub events: Vec<TraceEvent>,
}

/// Page-related events grouped by identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub total_page_events: usize,

    /// Highest total duration first
    pub groups: Vec<PageGroup>,
}

/// Check whether an event belongs to page or route compilation
///
/// **Public** - matches on the lower-cased name or on any tag value
pub fn is_page_related(event: &TraceEvent) -> bool {
    let name = event.name.to_lowercase();
    if PAGE_NAME_MARKERS.iter().any(|m| name.contains(m)) {
        return true;
    }

    event.tags.as_ref().is_some_and(|tags| {
        tags.values()
            .any(|v| PAGE_TAG_MARKERS.iter().any(|m| v.contains(m)))
    })
}

/// Page identifier of an event: first file-like tag value, else its name
pub fn page_identifier(event: &TraceEvent) -> String {
    event
        .tags
        .as_ref()
        .and_then(|tags| {
            tags.values()
                .find(|v| FILE_TAG_MARKERS.iter().any(|m| v.contains(m)))
        })
        .unwrap_or(&event.name)
        .clone()
}

/// Group page-related events and rank the groups by total duration
///
/// **Public** - main entry point for page analysis. Only events with an
/// `id` take part, the same set the hierarchy is built from.
pub fn analyze_pages(events: &[TraceEvent]) -> PageAnalysis {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<TraceEvent>> = HashMap::new();
    let mut total_page_events = 0;

    for event in events.iter().filter(|e| e.id.is_some() && is_page_related(e)) {
        total_page_events += 1;
        let identifier = page_identifier(event);
        groups
            .entry(identifier.clone())
            .or_insert_with(|| {
                order.push(identifier);
                Vec::new()
            })
            .push(event.clone());
    }

    let mut ranked: Vec<PageGroup> = order
        .into_iter()
        .filter_map(|identifier| {
            let mut members = groups.remove(&identifier)?;
            members.sort_by(|a, b| b.duration.total_cmp(&a.duration));
            let total_duration: f64 = members.iter().map(|e| e.duration).sum();
            Some(PageGroup {
                identifier,
                event_count: members.len(),
                total_duration,
                avg_duration: total_duration / members.len() as f64,
                events: members,
            })
        })
        .collect();

    // Stable sort keeps first-seen order among equal totals
    ranked.sort_by(|a, b| b.total_duration.total_cmp(&a.total_duration));

    debug!(
        "Found {} page-related events in {} groups",
        total_page_events,
        ranked.len()
    );

    PageAnalysis {
        total_page_events,
        groups: ranked,
    }
}

/// Counts describing a parsed trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub total_events: usize,
    pub events_without_id: usize,
    pub page_related: usize,
    pub unique_names: Vec<String>,
}

/// Summarize a parsed event list
pub fn summarize_events(events: &[TraceEvent]) -> TraceSummary {
    let unique_names: BTreeSet<&str> = events.iter().map(|e| e.name.as_str()).collect();

    TraceSummary {
        total_events: events.len(),
        events_without_id: events.iter().filter(|e| e.id.is_none()).count(),
        page_related: events
            .iter()
            .filter(|e| e.id.is_some() && is_page_related(e))
            .count(),
        unique_names: unique_names.into_iter().map(str::to_string).collect(),
    }
}
