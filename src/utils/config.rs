//! Configuration and constants for the CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Maximum number of characters of an offending line quoted in a warning
pub const EXCERPT_MAX_CHARS: usize = 100;

/// Name of the synthetic node wrapping every top-level frame
pub const FLAME_ROOT_NAME: &str = "root";

// Collapsed stacks carry integer weights, trace durations are fractional milliseconds.
// 1 ms = 1,000 µs
pub const SVG_UNITS_PER_MS: f64 = 1_000.0;
pub const SVG_COUNT_NAME: &str = "µs";

/// Default number of page groups shown in the terminal summary
pub const DEFAULT_TOP_GROUPS: usize = 10;

// Markers used to classify page/route compilation events.
// Event names are compared lower-cased, tag values as-is.
pub const PAGE_NAME_MARKERS: &[&str] = &["page", "route", "module", "resolve", "build", "compile"];
pub const PAGE_TAG_MARKERS: &[&str] = &["/", "page", ".tsx", ".jsx", "app/"];
pub const FILE_TAG_MARKERS: &[&str] = &["/", ".tsx", ".jsx"];
