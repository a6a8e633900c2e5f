//! Flamegraph projection and rendering.
//!
//! This module converts the trace forest into a weighted tree and,
//! through collapsed stacks and inferno, into SVG flamegraphs.

pub mod collapsed;
pub mod generator;

// Re-export main types
pub use collapsed::{collapse, CollapsedStack};
pub use generator::{
    convert_to_flamegraph, convert_with_config, generate_text_summary, render_svg,
    FlameGraphData, FlamegraphConfig,
};
