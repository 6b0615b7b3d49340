//! Service trait and wire types for the remote processing server.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::BenchResult;
use crate::core::{FileType, ProcessingResult, SparkConfig, SparkJobInfo};

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        UploadFile {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub async fn read(path: &std::path::Path) -> BenchResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(UploadFile { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Multipart payload of a submit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitForm {
    pub file: UploadFile,
    pub file_type: FileType,
    pub threads: u32,
    pub driver_memory: String,
    pub target_partition_size_mb: Option<u32>,
}

impl SubmitForm {
    pub fn new(file: UploadFile, file_type: FileType, config: &SparkConfig) -> Self {
        SubmitForm {
            file,
            file_type,
            threads: config.threads,
            driver_memory: config.driver_memory.clone(),
            target_partition_size_mb: config.partition_size_for(file_type),
        }
    }

    /// Text fields sent alongside the `file` part, in request order.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("fileType", self.file_type.as_str().to_string()),
            ("threads", self.threads.to_string()),
            ("driverMemory", self.driver_memory.clone()),
        ];
        if let Some(size) = self.target_partition_size_mb {
            fields.push(("target_partition_size_mb", size.to_string()));
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(alias = "taskId")]
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

/// Status reported by the queue-status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    Queued,
    Processing,
    #[serde(alias = "processing_engine_b")]
    ProcessingPandas,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatusResponse {
    pub status: QueueState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueStatusResponse {
    pub fn new(status: QueueState) -> Self {
        QueueStatusResponse {
            status,
            position: None,
            total: None,
            error: None,
        }
    }

    pub fn queued(position: u32, total: u32) -> Self {
        QueueStatusResponse {
            position: Some(position),
            total: Some(total),
            ..Self::new(QueueState::Queued)
        }
    }
}

/// Final measurements for both engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResult {
    pub spark_execution_time: f64,
    pub pandas_execution_time: f64,
    pub spark_throughput: f64,
    pub pandas_throughput: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_job_info: Option<SparkJobInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_result: Option<ProcessingResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pandas_result: Option<ProcessingResult>,
    /// Configuration the server actually used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_config: Option<SparkConfig>,
}

impl ServerResult {
    pub fn new(
        spark_execution_time: f64,
        pandas_execution_time: f64,
        spark_throughput: f64,
        pandas_throughput: f64,
    ) -> Self {
        ServerResult {
            spark_execution_time,
            pandas_execution_time,
            spark_throughput,
            pandas_throughput,
            spark_job_info: None,
            spark_result: None,
            pandas_result: None,
            spark_config: None,
        }
    }
}

/// The three operations of the remote processing service.
///
/// Implementations report transport failures, non-success statuses and
/// undecodable bodies as errors; the orchestrator decides what to do with them.
pub trait BenchmarkService: Send + Sync {
    /// Upload a file and enqueue a benchmark job.
    fn submit(&self, form: SubmitForm) -> impl Future<Output = BenchResult<SubmitResponse>> + Send;

    /// Report queue position or processing phase of a job.
    fn queue_status(
        &self,
        task_id: &str,
    ) -> impl Future<Output = BenchResult<QueueStatusResponse>> + Send;

    /// Fetch the measurements of a completed job.
    fn fetch_result(&self, task_id: &str) -> impl Future<Output = BenchResult<ServerResult>> + Send;
}
