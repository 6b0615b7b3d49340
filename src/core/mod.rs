//! Core types for sparkbench.
//!
//! This module contains the `BenchmarkRecord` schema, the engine configuration
//! sent with each submission, the live `ProcessingStatus` projection and the
//! client configuration.

pub mod config;
pub mod schema;
pub mod status;

// Re-export key types for convenience
pub use config::ClientConfig;
pub use schema::{
    BenchmarkRecord, CsvOptions, DataSource, FileType, ProcessingResult, RecordStatus,
    SparkConfig, SparkJobInfo,
};
pub use status::{ProcessingStage, ProcessingStatus, QueueInfo};
