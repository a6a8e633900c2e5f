//! Fold a flamegraph tree into collapsed stack lines.
//!
//! Collapsed stacks are the input format of the SVG renderer.
//! Format: "parent;child;grandchild weight"
//!
//! Each frame contributes its self time (own value minus the values of
//! its children), scaled from milliseconds to integer microseconds.

use super::generator::FlameGraphData;
use crate::utils::config::SVG_UNITS_PER_MS;
use log::debug;
use std::collections::HashMap;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Self time of the innermost frame, in microseconds
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as a renderer input line
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Collapse a flamegraph tree
///
/// **Public** - the synthetic root is not emitted as a frame
///
/// # Returns
/// One entry per distinct stack with non-zero self time, heaviest first
pub fn collapse(data: &FlameGraphData) -> Vec<CollapsedStack> {
    let mut stack_map: HashMap<String, u64> = HashMap::new();
    let mut path: Vec<String> = Vec::new();

    for child in &data.children {
        fold(child, &mut path, &mut stack_map);
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Collapsed flamegraph into {} unique stacks", stacks.len());

    stacks
}

fn fold(node: &FlameGraphData, path: &mut Vec<String>, stack_map: &mut HashMap<String, u64>) {
    path.push(frame_name(&node.name));

    let child_total: f64 = node.children.iter().map(|c| c.value).sum();
    let self_ms = (node.value - child_total).max(0.0);
    // Float to int casts saturate, so huge durations clamp to u64::MAX
    let weight = (self_ms * SVG_UNITS_PER_MS).round() as u64;

    if weight > 0 {
        let total = stack_map.entry(path.join(";")).or_insert(0);
        *total = total.saturating_add(weight);
    }

    for child in &node.children {
        fold(child, path, stack_map);
    }

    path.pop();
}

/// `;` separates frames and a newline ends a line in the collapsed format
fn frame_name(name: &str) -> String {
    name.replace(';', ":").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, value: f64) -> FlameGraphData {
        FlameGraphData::new(name, value, Vec::new())
    }

    #[test]
    fn test_collapse_self_time() {
        let data = FlameGraphData::new(
            "root",
            10.0,
            vec![FlameGraphData::new("compile", 10.0, vec![leaf("resolve", 4.0)])],
        );

        let stacks = collapse(&data);

        assert_eq!(
            stacks,
            vec![
                CollapsedStack::new("compile".to_string(), 6_000),
                CollapsedStack::new("compile;resolve".to_string(), 4_000),
            ]
        );
    }

    #[test]
    fn test_children_exceeding_parent() {
        let data = FlameGraphData::new(
            "root",
            1.0,
            vec![FlameGraphData::new("a", 1.0, vec![leaf("b", 3.0)])],
        );

        let stacks = collapse(&data);

        assert_eq!(stacks, vec![CollapsedStack::new("a;b".to_string(), 3_000)]);
    }

    #[test]
    fn test_frame_name_sanitized() {
        let data = FlameGraphData::new("root", 1.0, vec![leaf("a;b\nc", 1.0)]);

        assert_eq!(collapse(&data)[0].to_line(), "a:b c 1000");
    }

    #[test]
    fn test_identical_stacks_merged() {
        let data = FlameGraphData::new("root", 3.0, vec![leaf("emit", 1.0), leaf("emit", 2.0)]);

        assert_eq!(collapse(&data), vec![CollapsedStack::new("emit".to_string(), 3_000)]);
    }

    #[test]
    fn test_huge_weights_saturate_when_merged() {
        let data = FlameGraphData::new("root", 2e300, vec![leaf("a", 1e300), leaf("a", 1e300)]);

        assert_eq!(collapse(&data), vec![CollapsedStack::new("a".to_string(), u64::MAX)]);
    }
}
