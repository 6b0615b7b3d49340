//! Benchmark record schema and engine configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::{BenchError, BenchResult};

/// Driver memory tokens accepted by the processing server.
pub const MEMORY_OPTIONS: &[&str] = &["1g", "2g", "4g", "8g", "12g", "16g", "20g", "24g"];

pub const MIN_THREADS: u32 = 1;
pub const MAX_THREADS: u32 = 12;

pub const MIN_PARTITION_SIZE_MB: u32 = 1;
pub const MAX_PARTITION_SIZE_MB: u32 = 1024;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Declared type of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Parquet,
    Avro,
    Csv,
    Xlsx,
    Json,
    Dicom,
    Fastq,
    Edf,
}

impl FileType {
    pub const ALL: [FileType; 8] = [
        FileType::Parquet,
        FileType::Avro,
        FileType::Csv,
        FileType::Xlsx,
        FileType::Json,
        FileType::Dicom,
        FileType::Fastq,
        FileType::Edf,
    ];

    /// Wire name sent in the `fileType` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Parquet => "PARQUET",
            FileType::Avro => "AVRO",
            FileType::Csv => "CSV",
            FileType::Xlsx => "XLSX",
            FileType::Json => "JSON",
            FileType::Dicom => "DICOM",
            FileType::Fastq => "FASTQ",
            FileType::Edf => "EDF",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        FileType::ALL
            .into_iter()
            .find(|ft| ft.as_str() == upper)
            .ok_or_else(|| format!("unknown file type '{s}'"))
    }
}

/// Lifecycle tag of a benchmark record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Processing => "processing",
            RecordStatus::Completed => "completed",
            RecordStatus::Error => "error",
        }
    }
}

/// Where the measured values of a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Server,
    Simulated,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Server => "server",
            DataSource::Simulated => "simulated",
        }
    }
}

/// Spark job metadata reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkJobInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_version: Option<String>,
}

/// Structural summary of what an engine read from the file.
///
/// Which fields are present depends on the format: tabular formats report
/// rows/columns, FASTQ reports records, images report dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<String>>,
}

/// CSV-only tuning block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvOptions {
    pub target_partition_size_mb: u32,
}

/// Engine parameters echoed to the server with every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkConfig {
    pub threads: u32,
    pub driver_memory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_options: Option<CsvOptions>,
}

impl Default for SparkConfig {
    fn default() -> Self {
        SparkConfig {
            threads: 6,
            driver_memory: "4g".to_string(),
            csv_options: None,
        }
    }
}

impl SparkConfig {
    pub fn new(threads: u32, driver_memory: impl Into<String>) -> Self {
        SparkConfig {
            threads,
            driver_memory: driver_memory.into(),
            csv_options: None,
        }
    }

    /// Enable the CSV tuning block with the given target partition size.
    pub fn with_partition_size_mb(mut self, size_mb: u32) -> Self {
        self.csv_options = Some(CsvOptions {
            target_partition_size_mb: size_mb,
        });
        self
    }

    /// Partition size to send for `file_type`. Only CSV uploads carry it.
    pub fn partition_size_for(&self, file_type: FileType) -> Option<u32> {
        match file_type {
            FileType::Csv => self.csv_options.map(|o| o.target_partition_size_mb),
            _ => None,
        }
    }

    pub fn validate(&self) -> BenchResult<()> {
        if !(MIN_THREADS..=MAX_THREADS).contains(&self.threads) {
            return Err(BenchError::Config(format!(
                "threads must be between {MIN_THREADS} and {MAX_THREADS}, got {}",
                self.threads
            )));
        }
        if !MEMORY_OPTIONS.contains(&self.driver_memory.as_str()) {
            return Err(BenchError::Config(format!(
                "driver memory must be one of {}, got '{}'",
                MEMORY_OPTIONS.join(", "),
                self.driver_memory
            )));
        }
        if let Some(opts) = self.csv_options {
            if !(MIN_PARTITION_SIZE_MB..=MAX_PARTITION_SIZE_MB)
                .contains(&opts.target_partition_size_mb)
            {
                return Err(BenchError::Config(format!(
                    "target partition size must be between {MIN_PARTITION_SIZE_MB} and {MAX_PARTITION_SIZE_MB} MB, got {}",
                    opts.target_partition_size_mb
                )));
            }
        }
        Ok(())
    }
}

/// One row of benchmark history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Unique identifier generated at submission time
    pub id: String,

    /// RFC 3339 submission timestamp
    pub timestamp: String,

    pub file_type: FileType,
    pub file_name: String,
    pub file_size: u64,

    // --- Measurements (zero until resolved) ---
    pub spark_execution_time_ms: f64,
    pub pandas_execution_time_ms: f64,
    pub spark_throughput_mbps: f64,
    pub pandas_throughput_mbps: f64,

    pub status: RecordStatus,
    pub data_source: DataSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    // --- Server enrichment ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_result: Option<ProcessingResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pandas_result: Option<ProcessingResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_job_info: Option<SparkJobInfo>,

    /// Configuration the benchmark ran with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_config: Option<SparkConfig>,
}

impl BenchmarkRecord {
    /// Create a pending record with a fresh identity.
    pub fn pending(file_type: FileType, file_name: impl Into<String>, file_size: u64) -> Self {
        let timestamp = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();

        BenchmarkRecord {
            id: new_record_id(),
            timestamp,
            file_type,
            file_name: file_name.into(),
            file_size,
            spark_execution_time_ms: 0.0,
            pandas_execution_time_ms: 0.0,
            spark_throughput_mbps: 0.0,
            pandas_throughput_mbps: 0.0,
            status: RecordStatus::Pending,
            data_source: DataSource::Server,
            error_message: None,
            spark_result: None,
            pandas_result: None,
            spark_job_info: None,
            spark_config: None,
        }
    }

    pub fn file_size_mb(&self) -> f64 {
        bytes_to_mb(self.file_size)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, RecordStatus::Completed | RecordStatus::Error)
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

static RECORD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a record identity that is unique within the process.
///
/// The wall-clock part keeps ids distinct across sessions, the counter
/// keeps them distinct when two submissions land in the same nanosecond.
pub fn new_record_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = RECORD_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("benchmark-{nanos:x}-{seq}")
}
