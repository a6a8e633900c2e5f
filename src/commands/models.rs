use crate::flamegraph::FlamegraphConfig;
use crate::utils::config::DEFAULT_TOP_GROUPS;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Line-delimited trace file to analyze
    pub input: PathBuf,

    /// Output path for flamegraph JSON
    pub output_json: PathBuf,

    /// Output path for SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Output path for the analysis report (optional)
    pub output_report: Option<PathBuf>,

    /// Flamegraph configuration
    pub flamegraph_config: FlamegraphConfig,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Number of page groups in the text summary
    pub top_groups: usize,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("trace"),
            output_json: PathBuf::from("artifacts/flamegraph.json"),
            output_svg: None,
            output_report: None,
            flamegraph_config: FlamegraphConfig::default(),
            print_summary: false,
            top_groups: DEFAULT_TOP_GROUPS,
        }
    }
}
