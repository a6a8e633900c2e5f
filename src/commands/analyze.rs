//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the trace file
//! 2. Parses and validates every line
//! 3. Rebuilds the call hierarchy
//! 4. Projects it onto a flamegraph tree
//! 5. Renders the SVG flamegraph (optional)
//! 6. Writes output files

use super::models::AnalyzeArgs;
use crate::aggregator::{analyze_pages, build_trace_forest};
use crate::flamegraph::{convert_with_config, generate_text_summary, render_svg, FlameGraphData};
use crate::output::{to_report, write_flamegraph, write_report, write_svg};
use crate::parser::{parse_trace, TraceEvent};
use crate::utils::error::FlamegraphError;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::time::Instant;

/// Shown when a file yields no events at all
pub const NOTHING_PARSED_MESSAGE: &str = "No trace events could be parsed from the file";

/// Summary of a finished analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOutcome {
    pub event_count: usize,
    pub warning_count: usize,
    pub anomaly_count: usize,
    pub root_count: usize,
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// Counts describing the analysis. A file without any parsable event is
/// not an error: nothing is written and `event_count` is 0.
///
/// # Errors
/// * Input file cannot be read
/// * SVG rendering failures
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalyzeOutcome> {
    let start_time = Instant::now();

    info!("Analyzing trace file: {}", args.input.display());

    // Step 1: Read input
    info!("Step 1/6: Reading trace file...");
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read trace file {}", args.input.display()))?;

    // Step 2: Parse
    info!("Step 2/6: Parsing trace events...");
    let parsed = parse_trace(&raw);

    for warning in &parsed.warnings {
        warn!("{}", warning);
    }

    if parsed.is_empty() {
        warn!("{}", NOTHING_PARSED_MESSAGE);
        println!("{}", NOTHING_PARSED_MESSAGE);
        return Ok(AnalyzeOutcome {
            event_count: 0,
            warning_count: parsed.warnings.len(),
            anomaly_count: 0,
            root_count: 0,
        });
    }

    info!("Successfully parsed {} trace events", parsed.events.len());
    if !parsed.warnings.is_empty() {
        warn!(
            "{} lines couldn't be parsed and were ignored",
            parsed.warnings.len()
        );
    }

    // Step 3: Build hierarchy
    info!("Step 3/6: Rebuilding call hierarchy...");
    let forest = build_trace_forest(&parsed.events);
    debug!(
        "Forest: {} roots, {} nodes, {} events without id",
        forest.roots.len(),
        forest.node_count(),
        forest.skipped_without_id
    );

    // Step 4: Project
    info!("Step 4/6: Projecting flamegraph...");
    let data = convert_with_config(&forest.roots, &args.flamegraph_config);
    debug!(
        "Flamegraph: {} frames, depth {}, {}ms total",
        data.total_nodes(),
        data.max_depth(),
        data.value
    );

    // Step 5: Render SVG (if requested)
    let svg_content = if args.output_svg.is_some() {
        info!("Step 5/6: Rendering flamegraph SVG...");
        match render_svg(&data, &args.flamegraph_config) {
            Ok(svg) => Some(svg),
            Err(FlamegraphError::EmptyStacks) => {
                warn!("No event carries an id and a duration, skipping SVG flamegraph");
                None
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to generate flamegraph")),
        }
    } else {
        info!("Step 5/6: Skipping SVG rendering (not requested)");
        None
    };

    // Step 6: Write outputs
    info!("Step 6/6: Writing output files...");
    write_flamegraph(&data, &args.output_json).context("Failed to write flamegraph JSON")?;
    info!("✓ Flamegraph data written to: {}", args.output_json.display());

    if let (Some(svg), Some(svg_path)) = (svg_content, &args.output_svg) {
        write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;
        info!("✓ Flamegraph written to: {}", svg_path.display());
    }

    if let Some(report_path) = &args.output_report {
        let report = to_report(&args.input.display().to_string(), &parsed, &forest);
        write_report(&report, report_path).context("Failed to write analysis report")?;
        info!("✓ Report written to: {}", report_path.display());
    }

    if args.print_summary {
        print_summary(&args, &parsed.events, &data, forest.anomalies.len());
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(AnalyzeOutcome {
        event_count: parsed.events.len(),
        warning_count: parsed.warnings.len(),
        anomaly_count: forest.anomalies.len(),
        root_count: forest.roots.len(),
    })
}

/// Validate command arguments before doing any work
///
/// **Public** - called from main.rs before execute_analyze
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.input.is_file() {
        bail!("Trace file not found: {}", args.input.display());
    }
    if args.flamegraph_config.width == 0 {
        bail!("Flamegraph width must be greater than zero");
    }
    if args.output_svg.as_ref() == Some(&args.output_json) {
        bail!("JSON and SVG outputs must be different files");
    }
    Ok(())
}

fn print_summary(
    args: &AnalyzeArgs,
    events: &[TraceEvent],
    data: &FlameGraphData,
    anomaly_count: usize,
) {
    println!("\n{}", "=".repeat(80));
    println!("TRACE SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Trace File:     {}", args.input.display());
    println!("Total Events:   {}", events.len());
    println!("Total Duration: {}ms", data.value.round());
    println!("Root Events:    {}", data.children.len());
    println!("Anomalies:      {}", anomaly_count);
    println!("\n{}", generate_text_summary(data, args.top_groups));

    let pages = analyze_pages(events);
    if !pages.groups.is_empty() {
        println!("\n  📄 PAGE COMPILATION ({} events)", pages.total_page_events);
        for group in pages.groups.iter().take(args.top_groups) {
            println!(
                "  {:>10.2}ms  {:>4} events  {:>8.2}ms avg  {}",
                group.total_duration, group.event_count, group.avg_duration, group.identifier
            );
        }
        if pages.groups.len() > args.top_groups {
            println!("  ... and {} more", pages.groups.len() - args.top_groups);
        }
    }
    println!("{}", "=".repeat(80));
}
