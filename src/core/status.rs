//! Live status projection for an in-flight benchmark.

use serde::{Deserialize, Serialize};

/// Stage of a submission, ordered for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Queued,
    Uploading,
    ProcessingSpark,
    ProcessingPandas,
    Completed,
    Error,
}

impl ProcessingStage {
    /// Stages shown in the progress strip, in order.
    pub const PIPELINE: [ProcessingStage; 5] = [
        ProcessingStage::Queued,
        ProcessingStage::Uploading,
        ProcessingStage::ProcessingSpark,
        ProcessingStage::ProcessingPandas,
        ProcessingStage::Completed,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStage::Completed | ProcessingStage::Error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessingStage::Queued => "queued",
            ProcessingStage::Uploading => "uploading",
            ProcessingStage::ProcessingSpark => "processing spark",
            ProcessingStage::ProcessingPandas => "processing pandas",
            ProcessingStage::Completed => "completed",
            ProcessingStage::Error => "error",
        }
    }
}

/// Queue placement while a job waits for its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub position: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStatus {
    pub stage: ProcessingStage,
    /// 0-100
    pub progress: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueInfo>,
}

impl ProcessingStatus {
    fn at(stage: ProcessingStage, progress: u8, message: impl Into<String>) -> Self {
        ProcessingStatus {
            stage,
            progress,
            message: message.into(),
            queue: None,
        }
    }

    /// Initial projection before the server has answered.
    pub fn joining() -> Self {
        Self::at(ProcessingStage::Queued, 5, "Joining queue...")
    }

    pub fn queued(position: u32, total: u32) -> Self {
        ProcessingStatus {
            queue: Some(QueueInfo { position, total }),
            ..Self::at(
                ProcessingStage::Queued,
                5,
                format!("Position {position} of {total} in queue"),
            )
        }
    }

    pub fn uploading() -> Self {
        Self::at(ProcessingStage::Uploading, 20, "Your turn! Preparing file...")
    }

    pub fn processing_spark() -> Self {
        Self::at(ProcessingStage::ProcessingSpark, 50, "Running Apache Spark processing...")
    }

    pub fn processing_pandas() -> Self {
        Self::at(
            ProcessingStage::ProcessingPandas,
            75,
            "Running Pandas processing (control group)...",
        )
    }

    pub fn completed() -> Self {
        Self::at(ProcessingStage::Completed, 100, "Benchmark completed!")
    }

    pub fn simulated() -> Self {
        Self::at(ProcessingStage::Completed, 100, "Demo mode: Using simulated results")
    }

    /// Terminal projection for a cancelled submission; keeps the progress reached.
    pub fn cancelled(progress: u8) -> Self {
        Self::at(ProcessingStage::Error, progress, "Benchmark cancelled")
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}
