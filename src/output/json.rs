//! JSON output writer.
//!
//! Writes flamegraph trees and analysis reports to JSON files with proper formatting.

use super::report::TraceReport;
use crate::flamegraph::FlameGraphData;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a flamegraph tree to a JSON file
///
/// **Public** - main entry point for flamegraph JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_flamegraph(
    data: &FlameGraphData,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_pretty(data, output_path.as_ref())
}

/// Read a flamegraph tree back from a JSON file
pub fn read_flamegraph(input_path: impl AsRef<Path>) -> Result<FlameGraphData, OutputError> {
    let data: FlameGraphData = read_json(input_path.as_ref())?;
    debug!("Flamegraph loaded: {} frames", data.total_nodes());
    Ok(data)
}

/// Write an analysis report to a JSON file
pub fn write_report(report: &TraceReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_pretty(report, output_path.as_ref())
}

/// Read an analysis report from a JSON file
pub fn read_report(input_path: impl AsRef<Path>) -> Result<TraceReport, OutputError> {
    let report: TraceReport = read_json(input_path.as_ref())?;
    debug!(
        "Report loaded: version {}, {} events",
        report.version, report.event_count
    );
    Ok(report)
}

/// Serialize a value as pretty JSON to a file, creating parent directories
///
/// **Private** - shared by the writers above
fn write_pretty<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    info!("Writing JSON to: {}", output_path.display());

    super::validate_path(output_path)?;
    super::ensure_parent_dir(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value).map_err(OutputError::SerializationFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "JSON written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

fn read_json<T: DeserializeOwned>(input_path: &Path) -> Result<T, OutputError> {
    debug!("Reading JSON from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::ReadFailed)?;
    let value = serde_json::from_reader(BufReader::new(file))?;

    Ok(value)
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_flamegraph() -> FlameGraphData {
        FlameGraphData::new(
            "root",
            120.0,
            vec![FlameGraphData::new(
                "compile",
                120.0,
                vec![FlameGraphData::new("resolve", 40.0, Vec::new())],
            )],
        )
    }

    #[test]
    fn test_write_and_read_flamegraph() {
        let data = create_test_flamegraph();
        let temp_file = NamedTempFile::new().unwrap();

        write_flamegraph(&data, temp_file.path()).unwrap();
        let loaded = read_flamegraph(temp_file.path()).unwrap();

        assert_eq!(loaded, data);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/flamegraph.json");

        write_flamegraph(&create_test_flamegraph(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = read_flamegraph(temp_dir.path().join("absent.json"));

        assert!(matches!(result, Err(OutputError::ReadFailed(_))));
    }
}
