//! Build Trace Studio CLI
//!
//! Turns line-delimited build trace files into flamegraphs and
//! page compilation reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use build_trace_studio::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_trace_file,
    AnalyzeArgs,
};
use build_trace_studio::flamegraph::FlamegraphConfig;

/// Build Trace Studio - Flamegraphs for build traces
#[derive(Parser, Debug)]
#[command(name = "build-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a trace file and generate a flamegraph
    Analyze {
        /// Line-delimited trace file
        #[arg(short, long)]
        file: PathBuf,

        /// Output path for flamegraph JSON
        #[arg(short, long, default_value = "artifacts/flamegraph.json")]
        output: PathBuf,

        /// Output path for SVG flamegraph (placed in artifacts/ by default)
        #[arg(long, default_missing_value = "artifacts/flamegraph.svg", num_args = 0..=1)]
        flamegraph: Option<PathBuf>,

        /// Output path for the JSON analysis report
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long, env = "BUILD_TRACE_TITLE")]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Decorate frame names with key tags and durations
        #[arg(long)]
        labels: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of entries per section in the text summary
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Validate a trace file without writing anything
    Validate {
        /// Line-delimited trace file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            file,
            output,
            flamegraph,
            report,
            title,
            width,
            labels,
            summary,
            top,
        } => {
            let mut fg_config = FlamegraphConfig::new()
                .with_width(width)
                .with_labels(labels);
            if let Some(title_str) = title {
                fg_config = fg_config.with_title(title_str);
            }

            let args = AnalyzeArgs {
                input: file,
                output_json: output,
                output_svg: flamegraph,
                output_report: report,
                flamegraph_config: fg_config,
                print_summary: summary,
                top_groups: top,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_trace_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
