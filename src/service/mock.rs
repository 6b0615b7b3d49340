//! Scripted in-process service for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{BenchError, BenchResult};

use super::traits::{
    BenchmarkService, QueueState, QueueStatusResponse, ServerResult, SubmitForm, SubmitResponse,
};

/// How a mocked call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Transport error, as if the server were unreachable
    Network,
    /// Non-success HTTP status
    Status(u16),
}

impl MockFailure {
    fn into_error(self, operation: &'static str) -> BenchError {
        match self {
            MockFailure::Network => {
                BenchError::Network(format!("mock {operation}: connection refused"))
            }
            MockFailure::Status(status) => BenchError::Status { operation, status },
        }
    }
}

/// Configuration for mock service responses.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Submit response to return
    pub submit_response: SubmitResponse,
    /// Queue-status responses, one per poll; the last one repeats
    pub poll_script: Vec<QueueStatusResponse>,
    /// Result to return
    pub result: ServerResult,
    /// Whether submit should fail
    pub submit_fails: Option<MockFailure>,
    /// Zero-based poll index at which polling fails
    pub poll_fails_at: Option<(usize, MockFailure)>,
    /// Whether fetching the result should fail
    pub result_fails: Option<MockFailure>,
    /// Simulated latency of every call
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        MockConfig {
            submit_response: SubmitResponse {
                task_id: "mock-task".to_string(),
                position: Some(1),
                total: Some(1),
            },
            poll_script: vec![
                QueueStatusResponse::new(QueueState::Processing),
                QueueStatusResponse::new(QueueState::Completed),
            ],
            result: ServerResult::new(800.0, 3200.0, 12.5, 3.1),
            submit_fails: None,
            poll_fails_at: None,
            result_fails: None,
            latency: Duration::ZERO,
        }
    }
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the submit response.
    pub fn with_task(mut self, task_id: impl Into<String>, position: u32, total: u32) -> Self {
        self.submit_response = SubmitResponse {
            task_id: task_id.into(),
            position: Some(position),
            total: Some(total),
        };
        self
    }

    /// Set the sequence of queue states reported by polling.
    pub fn with_poll_states(mut self, states: &[QueueState]) -> Self {
        self.poll_script = states.iter().map(|s| QueueStatusResponse::new(*s)).collect();
        self
    }

    /// Set the full queue-status responses reported by polling.
    pub fn with_poll_script(mut self, script: Vec<QueueStatusResponse>) -> Self {
        self.poll_script = script;
        self
    }

    /// Set the final result.
    pub fn with_result(mut self, result: ServerResult) -> Self {
        self.result = result;
        self
    }

    /// Make submit fail.
    pub fn submit_fails(mut self, failure: MockFailure) -> Self {
        self.submit_fails = Some(failure);
        self
    }

    /// Make the poll with the given index fail.
    pub fn poll_fails_at(mut self, index: usize, failure: MockFailure) -> Self {
        self.poll_fails_at = Some((index, failure));
        self
    }

    /// Make the result fetch fail.
    pub fn result_fails(mut self, failure: MockFailure) -> Self {
        self.result_fails = Some(failure);
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Calls observed by a `MockService`.
#[derive(Debug, Default)]
struct CallLog {
    submitted: Mutex<Vec<SubmitForm>>,
    polls: AtomicUsize,
    result_fetches: AtomicUsize,
}

/// Mock service for unit testing.
///
/// Returns configured responses without any network I/O and records the
/// calls it receives. Clones share the same call log.
#[derive(Debug, Clone)]
pub struct MockService {
    config: MockConfig,
    calls: Arc<CallLog>,
}

impl MockService {
    pub fn new(config: MockConfig) -> Self {
        MockService {
            config,
            calls: Arc::new(CallLog::default()),
        }
    }

    /// Mock that completes immediately after one processing report.
    pub fn default_mock() -> Self {
        Self::new(MockConfig::new())
    }

    /// Forms received by `submit`, in call order.
    pub fn submitted_forms(&self) -> Vec<SubmitForm> {
        self.calls
            .submitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn poll_count(&self) -> usize {
        self.calls.polls.load(Ordering::SeqCst)
    }

    pub fn result_fetch_count(&self) -> usize {
        self.calls.result_fetches.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }
}

impl BenchmarkService for MockService {
    async fn submit(&self, form: SubmitForm) -> BenchResult<SubmitResponse> {
        self.calls
            .submitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(form);
        self.delay().await;
        if let Some(failure) = self.config.submit_fails {
            return Err(failure.into_error("submit"));
        }
        Ok(self.config.submit_response.clone())
    }

    async fn queue_status(&self, _task_id: &str) -> BenchResult<QueueStatusResponse> {
        let index = self.calls.polls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if let Some((fail_at, failure)) = self.config.poll_fails_at {
            if index == fail_at {
                return Err(failure.into_error("queue-status"));
            }
        }
        let script = &self.config.poll_script;
        script
            .get(index.min(script.len().saturating_sub(1)))
            .cloned()
            .ok_or_else(|| BenchError::Message("no poll script configured".into()))
    }

    async fn fetch_result(&self, _task_id: &str) -> BenchResult<ServerResult> {
        self.calls.result_fetches.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if let Some(failure) = self.config.result_fails {
            return Err(failure.into_error("result"));
        }
        Ok(self.config.result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileType, SparkConfig};
    use crate::service::UploadFile;

    fn form() -> SubmitForm {
        SubmitForm::new(
            UploadFile::new("x.csv", vec![1, 2, 3]),
            FileType::Csv,
            &SparkConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_mock_records_submitted_forms() {
        let svc = MockService::default_mock();
        let resp = svc.submit(form()).await.unwrap();
        assert_eq!(resp.task_id, "mock-task");
        assert_eq!(svc.submitted_forms().len(), 1);
        assert_eq!(svc.submitted_forms()[0].file.name, "x.csv");
    }

    #[tokio::test]
    async fn test_poll_script_repeats_last_state() {
        let svc = MockService::new(
            MockConfig::new().with_poll_states(&[QueueState::Queued, QueueState::Processing]),
        );
        let states: Vec<QueueState> = [
            svc.queue_status("t").await.unwrap().status,
            svc.queue_status("t").await.unwrap().status,
            svc.queue_status("t").await.unwrap().status,
        ]
        .to_vec();
        assert_eq!(
            states,
            vec![QueueState::Queued, QueueState::Processing, QueueState::Processing]
        );
        assert_eq!(svc.poll_count(), 3);
    }

    #[tokio::test]
    async fn test_failures() {
        let svc = MockService::new(
            MockConfig::new()
                .submit_fails(MockFailure::Status(502))
                .poll_fails_at(0, MockFailure::Network)
                .result_fails(MockFailure::Network),
        );
        let err = svc.submit(form()).await.unwrap_err();
        assert!(matches!(err, BenchError::Status { status: 502, .. }));
        assert!(matches!(svc.queue_status("t").await, Err(BenchError::Network(_))));
        assert!(svc.fetch_result("t").await.is_err());
        assert_eq!(svc.result_fetch_count(), 1);
    }
}
