//! Flamegraph projection and rendering.
//!
//! Projects a forest of trace nodes onto a weighted `{ name, value, children }`
//! tree, the format flamegraph widgets consume, and renders that tree as an
//! SVG through inferno.

use super::collapsed::{collapse, CollapsedStack};
use crate::aggregator::TraceNode;
use crate::utils::config::{FLAME_ROOT_NAME, SVG_COUNT_NAME};
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{from_lines, Options};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,

    /// Frames narrower than this many pixels are omitted from the SVG
    pub min_width: f64,

    /// Decorate names with key tags and duration, attach tooltip details
    pub labels: bool,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Build Trace Profile".to_string(),
            width: 1200,
            min_width: 0.5,
            labels: false,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }
}

/// One flamegraph frame
///
/// `value` is the duration in milliseconds; children keep encounter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameGraphData {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub children: Vec<FlameGraphData>,

    /// Tooltip text (labelled projection only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl FlameGraphData {
    pub fn new(name: impl Into<String>, value: f64, children: Vec<FlameGraphData>) -> Self {
        Self {
            name: name.into(),
            value,
            children,
            detail: None,
            tags: None,
        }
    }

    /// Number of frames in this tree, including self
    pub fn total_nodes(&self) -> usize {
        1 + self.children.iter().map(FlameGraphData::total_nodes).sum::<usize>()
    }

    /// Longest root-to-leaf edge count
    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.max_depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Project a forest onto a flamegraph tree
///
/// **Public** - main entry point for projection
///
/// The synthetic root's value is the sum of the top-level durations only,
/// so nested time is not counted twice.
pub fn convert_to_flamegraph(forest: &[TraceNode]) -> FlameGraphData {
    convert_with_config(forest, &FlamegraphConfig::default())
}

/// Project a forest onto a flamegraph tree, honouring display options
///
/// **Public** - values and structure match `convert_to_flamegraph`
pub fn convert_with_config(forest: &[TraceNode], config: &FlamegraphConfig) -> FlameGraphData {
    FlameGraphData::new(
        FLAME_ROOT_NAME,
        forest.iter().map(|node| node.duration).sum(),
        forest
            .iter()
            .map(|node| to_flame_node(node, config.labels))
            .collect(),
    )
}

fn to_flame_node(node: &TraceNode, labels: bool) -> FlameGraphData {
    let children = node
        .children
        .iter()
        .map(|child| to_flame_node(child, labels))
        .collect();

    if !labels {
        return FlameGraphData::new(node.name.clone(), node.duration, children);
    }

    FlameGraphData {
        name: labelled_name(node),
        value: node.duration,
        children,
        detail: Some(detail_string(node)),
        tags: node.tags.clone(),
    }
}

/// Display name: `name [tags.name] v<tags.version> (tags.trigger) (<duration>ms)`
///
/// **Private** - tag parts appear only when the tag is present
fn labelled_name(node: &TraceNode) -> String {
    let mut name = node.name.clone();

    if let Some(tags) = &node.tags {
        let mut important = Vec::new();
        if let Some(label) = tags.get("name") {
            important.push(format!("[{}]", label));
        }
        if let Some(version) = tags.get("version") {
            important.push(format!("v{}", version));
        }
        if let Some(trigger) = tags.get("trigger") {
            important.push(format!("({})", trigger));
        }
        if !important.is_empty() {
            name = format!("{} {}", name, important.join(" "));
        }
    }

    format!("{} ({}ms)", name, node.duration)
}

fn detail_string(node: &TraceNode) -> String {
    let mut details = vec![
        format!("Name: {}", node.name),
        format!("Duration: {}ms", node.duration),
        format!("Start Time: {}", node.start_time),
    ];

    if let Some(tags) = node.tags.as_ref().filter(|t| !t.is_empty()) {
        details.push("Tags:".to_string());
        details.extend(tags.iter().map(|(key, value)| format!("  {}: {}", key, value)));
    }

    details.join("\n")
}

/// Generate SVG flamegraph from a projected tree
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - no frame carries any self time
/// * `FlamegraphError::RenderFailed` - the renderer failed or produced non-UTF-8 output
pub fn render_svg(data: &FlameGraphData, config: &FlamegraphConfig) -> Result<String, FlamegraphError> {
    let stacks = collapse(data);
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    info!("Generating flamegraph with {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();

    let mut options = Options::default();
    options.title = config.title.clone();
    options.count_name = SVG_COUNT_NAME.to_string();
    options.image_width = Some(config.width);
    options.min_width = config.min_width;

    let mut svg = Vec::new();
    from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    String::from_utf8(svg).map_err(|e| FlamegraphError::RenderFailed(e.to_string()))
}

/// Create a text summary of the heaviest top-level frames
pub fn generate_text_summary(data: &FlameGraphData, max_lines: usize) -> String {
    let mut lines = Vec::new();

    lines.push("  🔥 HEAVIEST ROOT EVENTS".to_string());
    lines.push(format!("  ┏{}┳{}┳{}┓", "━".repeat(44), "━".repeat(14), "━".repeat(9)));
    lines.push(format!("  ┃ {:<42} ┃ {:^12} ┃ {:^7} ┃", "Event", "DURATION ms", "%"));
    lines.push(format!("  ┣{}╋{}╋{}┫", "━".repeat(44), "━".repeat(14), "━".repeat(9)));

    let total = if data.value > 0.0 { data.value } else { 1.0 };

    let mut frames: Vec<&FlameGraphData> = data.children.iter().collect();
    frames.sort_by(|a, b| b.value.total_cmp(&a.value));

    for frame in frames.iter().take(max_lines) {
        let percentage = frame.value / total * 100.0;
        lines.push(format!(
            "  ┃ {:<42} ┃ {:>12.2} ┃ {:>6.1}% ┃",
            truncate_name(&frame.name, 42),
            frame.value,
            percentage
        ));
    }

    lines.push(format!("  ┗{}┻{}┻{}┛", "━".repeat(44), "━".repeat(14), "━".repeat(9)));

    lines.push(String::new());
    lines.push(format!("  {:<20} {} 100%", FLAME_ROOT_NAME, "█".repeat(50)));
    for frame in frames.iter().take(5) {
        let percentage = (frame.value / total * 100.0).clamp(0.0, 100.0);
        let bar = "█".repeat((percentage / 2.0) as usize);
        lines.push(format!(
            "  └─ {:<17} {:50} {:>5.1}%",
            truncate_name(&frame.name, 17),
            bar,
            percentage
        ));
    }

    if frames.len() > max_lines {
        lines.push(String::new());
        lines.push(format!(
            "   (Showing top {} of {} root events)",
            max_lines,
            frames.len()
        ));
    }

    lines.join("\n")
}

/// Shorten a name to `max_chars` characters, marking the cut with `...`
fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let kept: String = name.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, name: &str, duration: f64, children: Vec<TraceNode>) -> TraceNode {
        TraceNode {
            id,
            parent_id: None,
            name: name.to_string(),
            duration,
            start_time: 2.0,
            trace_id: "t".to_string(),
            timestamp: None,
            tags: None,
            children,
        }
    }

    #[test]
    fn test_labelled_name_with_tags() {
        let mut n = node(1, "webpack-compilation", 120.0, Vec::new());
        n.tags = Some(
            [("name", "server"), ("version", "14.1"), ("trigger", "hmr")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );

        assert_eq!(
            labelled_name(&n),
            "webpack-compilation [server] v14.1 (hmr) (120ms)"
        );
    }

    #[test]
    fn test_labelled_name_without_tags() {
        assert_eq!(labelled_name(&node(1, "emit", 2.5, Vec::new())), "emit (2.5ms)");
    }

    #[test]
    fn test_detail_string() {
        let mut n = node(1, "emit", 3.0, Vec::new());
        n.tags = Some([("k".to_string(), "v".to_string())].into_iter().collect());

        assert_eq!(
            detail_string(&n),
            "Name: emit\nDuration: 3ms\nStart Time: 2\nTags:\n  k: v"
        );
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("a_much_longer_name", 10), "a_much_...");
    }

    #[test]
    fn test_depth_and_count() {
        let forest = vec![node(1, "a", 3.0, vec![node(2, "b", 1.0, Vec::new())])];
        let data = convert_to_flamegraph(&forest);

        assert_eq!(data.total_nodes(), 3);
        assert_eq!(data.max_depth(), 2);
    }
}
