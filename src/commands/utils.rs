use crate::parser::parse_trace;
use crate::utils::config::{EXCERPT_MAX_CHARS, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a trace file and report what would be accepted
///
/// Returns the number of valid events.
pub fn validate_trace_file(file_path: &Path) -> Result<usize> {
    println!("Validating trace: {}", file_path.display());

    let raw = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read trace file {}", file_path.display()))?;
    let parsed = parse_trace(&raw);

    if parsed.is_empty() {
        println!("✗ {}", super::analyze::NOTHING_PARSED_MESSAGE);
    } else {
        println!("✓ {} valid trace events", parsed.events.len());
    }
    println!("  Skipped lines: {}", parsed.warnings.len());
    for warning in &parsed.warnings {
        println!("    {}", warning);
    }

    Ok(parsed.events.len())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Build Trace Studio Event Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Each line holds one event object or an array of event objects.");
        println!();
        println!("Event Structure:");
        println!("  name: string             - Event label (non-empty)");
        println!("  duration: number         - Elapsed time in ms");
        println!("  startTime: number        - Offset in ms from trace origin");
        println!("  traceId: string          - Trace session identifier");
        println!("  timestamp: number?       - Absolute wall-clock time");
        println!("  id: integer?             - Unique id (required for the flamegraph)");
        println!("  parentId: integer?       - id of the enclosing event");
        println!("  tags: object?            - String to string metadata");
        println!();
        println!(
            "Invalid lines are skipped; warnings quote at most {} characters.",
            EXCERPT_MAX_CHARS
        );
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Build Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Flamegraphs and page compilation analysis for build trace files.");
}
