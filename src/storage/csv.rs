//! CSV export for benchmark records.

use std::io::Write;
use std::path::Path;

use crate::BenchError;
use crate::core::BenchmarkRecord;
use crate::report::Speedup;

/// CSV column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "id",
    "timestamp",
    "file_name",
    "file_type",
    "file_size_bytes",
    "status",
    "data_source",
    "threads",
    "driver_memory",
    "target_partition_size_mb",
    "spark_ms",
    "pandas_ms",
    "spark_mbps",
    "pandas_mbps",
    "spark_speedup",
    "spark_version",
    "error",
];

/// CSV exporter for benchmark records.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter
    }

    /// Export records to a CSV file, replacing it.
    pub fn export(&self, records: &[BenchmarkRecord], output: &Path) -> Result<(), BenchError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BenchError::Message(format!("failed to create directory: {e}")))?;
            }
        }

        let file = std::fs::File::create(output)
            .map_err(|e| BenchError::Message(format!("failed to create file: {e}")))?;

        self.export_to_writer(records, file)
    }

    pub fn export_to_writer<W: Write>(&self, records: &[BenchmarkRecord], writer: W) -> Result<(), BenchError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(CSV_HEADERS)
            .map_err(|e| BenchError::Message(format!("failed to write CSV headers: {e}")))?;

        for record in records {
            csv_writer
                .write_record(record_to_row(record))
                .map_err(|e| BenchError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| BenchError::Message(format!("failed to flush CSV writer: {e}")))?;

        Ok(())
    }
}

fn record_to_row(record: &BenchmarkRecord) -> Vec<String> {
    let config = record.spark_config.as_ref();
    let speedup = match Speedup::of(record) {
        Some(_) => format!(
            "{:.3}",
            record.pandas_execution_time_ms / record.spark_execution_time_ms
        ),
        None => String::new(),
    };
    vec![
        record.id.clone(),
        record.timestamp.clone(),
        record.file_name.clone(),
        record.file_type.to_string(),
        record.file_size.to_string(),
        record.status.as_str().to_string(),
        record.data_source.as_str().to_string(),
        config.map(|c| c.threads.to_string()).unwrap_or_default(),
        config.map(|c| c.driver_memory.clone()).unwrap_or_default(),
        config
            .and_then(|c| c.partition_size_for(record.file_type))
            .map(|v| v.to_string())
            .unwrap_or_default(),
        format!("{:.3}", record.spark_execution_time_ms),
        format!("{:.3}", record.pandas_execution_time_ms),
        format!("{:.3}", record.spark_throughput_mbps),
        format!("{:.3}", record.pandas_throughput_mbps),
        speedup,
        record
            .spark_job_info
            .as_ref()
            .and_then(|j| j.spark_version.clone())
            .unwrap_or_default(),
        record.error_message.clone().unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataSource, FileType, RecordStatus, SparkConfig};

    #[test]
    fn test_row_matches_headers() {
        let mut record = BenchmarkRecord::pending(FileType::Csv, "a.csv", 2048);
        record.status = RecordStatus::Completed;
        record.data_source = DataSource::Simulated;
        record.spark_execution_time_ms = 500.0;
        record.pandas_execution_time_ms = 1500.0;
        record.spark_config = Some(SparkConfig::new(4, "8g").with_partition_size_mb(128));

        let row = record_to_row(&record);
        assert_eq!(row.len(), CSV_HEADERS.len());
        assert_eq!(row[6], "simulated");
        assert_eq!(row[7], "4");
        assert_eq!(row[9], "128");
        assert_eq!(row[14], "3.000");
    }

    #[test]
    fn test_export_to_writer() {
        let mut buf = Vec::new();
        let record = BenchmarkRecord::pending(FileType::Edf, "sleep,night1.edf", 1);
        CsvExporter::new().export_to_writer(&[record], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,timestamp,file_name"));
        // comma in the file name is quoted
        assert!(lines.next().unwrap().contains("\"sleep,night1.edf\""));
    }
}
