//! Submission lifecycle: enqueue, poll, fetch, and fall back to simulated data.
//!
//! Every call to [`Orchestrator::submit`] inserts one record at the head of
//! the result list and drives it to a terminal state:
//!
//! 1. submit the file and get a task id plus queue position
//! 2. poll the queue every `poll_interval` and project stage transitions
//! 3. fetch the final measurements
//!
//! Any failure along the way (transport, non-success status, a server-reported
//! error, a poll timeout) completes the record with simulated values instead.
//! Cancellation is the only way a record ends in `error`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::{
    BenchmarkRecord, ClientConfig, DataSource, FileType, ProcessingStage, ProcessingStatus,
    RecordStatus, SparkConfig,
};
use crate::service::{BenchmarkService, QueueState, ServerResult, SubmitForm, UploadFile};
use crate::{BenchError, BenchResult};

use super::notify::{Notification, Notifier};
use super::simulate::simulate;
use super::state::{DashboardState, Snapshot, StatusEvent};

const EVENT_CAPACITY: usize = 256;

/// Drives benchmark submissions against a [`BenchmarkService`].
///
/// Cheap to clone; clones share state.
pub struct Orchestrator<S, N> {
    inner: Arc<Inner<S, N>>,
}

impl<S, N> Clone for Orchestrator<S, N> {
    fn clone(&self) -> Self {
        Orchestrator {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S, N> {
    service: S,
    notifier: N,
    config: ClientConfig,
    state: Mutex<DashboardState>,
    cancels: Mutex<HashMap<String, CancellationToken>>,
    events: broadcast::Sender<StatusEvent>,
}

impl<S, N> Inner<S, N> {
    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cancels(&self) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.cancels.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, id: &str, status: ProcessingStatus) {
        tracing::debug!(record_id = id, stage = ?status.stage, progress = status.progress, "{}", status.message);
        self.state().set_status(id, status.clone());
        let _ = self.events.send(StatusEvent {
            record_id: id.to_string(),
            status: Some(status),
        });
    }

    fn clear(&self, id: &str) {
        if self.state().clear_status(id) {
            let _ = self.events.send(StatusEvent {
                record_id: id.to_string(),
                status: None,
            });
        }
    }

    fn update_record<F: FnOnce(&mut BenchmarkRecord)>(&self, id: &str, f: F) {
        if !self.state().update_record(id, f) {
            tracing::warn!(record_id = id, "record vanished before update");
        }
    }
}

/// Race `fut` against cancellation.
async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> BenchResult<T>
where
    F: Future<Output = BenchResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(BenchError::Cancelled),
        res = fut => res,
    }
}

async fn pause(token: &CancellationToken, duration: std::time::Duration) -> BenchResult<()> {
    cancellable(token, async {
        tokio::time::sleep(duration).await;
        Ok(())
    })
    .await
}

impl<S, N> Orchestrator<S, N>
where
    S: BenchmarkService + 'static,
    N: Notifier,
{
    pub fn new(service: S, notifier: N, config: ClientConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Orchestrator {
            inner: Arc::new(Inner {
                service,
                notifier,
                config,
                state: Mutex::new(DashboardState::default()),
                cancels: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// All records, newest first.
    pub fn results(&self) -> Vec<BenchmarkRecord> {
        self.inner.state().results().to_vec()
    }

    pub fn record(&self, id: &str) -> Option<BenchmarkRecord> {
        self.inner.state().results().iter().find(|r| r.id == id).cloned()
    }

    /// Projection of the most recently started submission, if still live.
    pub fn processing_status(&self) -> Option<ProcessingStatus> {
        self.inner.state().current_status().cloned()
    }

    /// Projection of a specific submission, if still live.
    pub fn status_of(&self, id: &str) -> Option<ProcessingStatus> {
        self.inner.state().status_of(id).cloned()
    }

    pub fn is_processing(&self) -> bool {
        self.inner.state().is_processing()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.state().snapshot()
    }

    /// Stream of every projection change, including clears.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.inner.events.subscribe()
    }

    /// Cancel an in-flight submission. Returns false if it already finished.
    pub fn cancel(&self, id: &str) -> bool {
        match self.inner.cancels().get(id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for token in self.inner.cancels().values() {
            token.cancel();
        }
    }

    /// Benchmark `file` as `file_type` with `config`.
    ///
    /// Never fails: the outcome is visible through the record with the
    /// returned id, the status projection and the notifier. The lifecycle
    /// runs on its own task, so dropping the returned future does not stop
    /// it; use [`Orchestrator::cancel`] for that.
    pub async fn submit(&self, file: UploadFile, file_type: FileType, config: SparkConfig) -> String {
        let record = BenchmarkRecord::pending(file_type, &file.name, file.size());
        let id = record.id.clone();
        let file_size = file.size();
        let token = CancellationToken::new();

        self.inner.state().begin(record);
        self.inner.cancels().insert(id.clone(), token.clone());
        self.inner.publish(&id, ProcessingStatus::joining());

        tracing::info!(record_id = %id, file = %file.name, %file_type, threads = config.threads, memory = %config.driver_memory, "benchmark submitted");

        let this = self.clone();
        let task_record = id.clone();
        let requested = config.clone();
        let handle = tokio::spawn(async move {
            this.drive(&task_record, file, file_type, requested, token).await;
        });

        if let Err(err) = handle.await {
            // The task died before reaching a terminal state.
            tracing::error!(record_id = %id, error = %err, "benchmark task aborted");
            self.fall_back(&id, BenchError::Message(err.to_string()), &config, file_size);
            self.finalize(&id);
        }
        id
    }

    async fn drive(
        &self,
        id: &str,
        file: UploadFile,
        file_type: FileType,
        config: SparkConfig,
        token: CancellationToken,
    ) {
        let file_name = file.name.clone();
        let file_size = file.size();
        let form = SubmitForm::new(file, file_type, &config);
        match self.run(id, form, &token).await {
            Ok(result) => self.complete(id, result, &config, &file_name),
            Err(BenchError::Cancelled) => self.abort(id, &file_name),
            Err(err) => self.fall_back(id, err, &config, file_size),
        }
        self.finalize(id);
    }

    async fn run(&self, id: &str, form: SubmitForm, token: &CancellationToken) -> BenchResult<ServerResult> {
        let service = &self.inner.service;

        let queued = cancellable(token, service.submit(form)).await?;
        let position = queued.position.unwrap_or(1);
        let total = queued.total.unwrap_or(position).max(position);
        tracing::info!(record_id = id, task_id = %queued.task_id, position, total, "job enqueued");

        self.inner.update_record(id, |r| r.status = RecordStatus::Processing);
        self.inner.publish(id, ProcessingStatus::queued(position, total));

        self.poll_until_complete(id, &queued.task_id, token).await?;

        cancellable(token, service.fetch_result(&queued.task_id)).await
    }

    /// Poll until the server reports a terminal state, bounded by `max_wait`.
    ///
    /// The deadline also cuts short an in-flight poll or pause.
    async fn poll_until_complete(&self, id: &str, task_id: &str, token: &CancellationToken) -> BenchResult<()> {
        let max_wait = self.inner.config.max_wait();
        let deadline = Instant::now() + max_wait;
        match tokio::time::timeout_at(deadline, self.poll_loop(id, task_id, token)).await {
            Ok(res) => res,
            Err(_) => Err(BenchError::Timeout(max_wait)),
        }
    }

    async fn poll_loop(&self, id: &str, task_id: &str, token: &CancellationToken) -> BenchResult<()> {
        let config = &self.inner.config;
        let mut stage = ProcessingStage::Queued;

        loop {
            let report = cancellable(token, self.inner.service.queue_status(task_id)).await?;
            tracing::debug!(record_id = id, task_id, status = ?report.status, "polled queue");

            match report.status {
                QueueState::Queued => {
                    if stage == ProcessingStage::Queued {
                        let position = report.position.unwrap_or(1);
                        let total = report.total.unwrap_or(position).max(position);
                        self.inner.publish(id, ProcessingStatus::queued(position, total));
                    }
                }
                QueueState::Processing => {
                    self.advance(id, &mut stage, ProcessingStage::ProcessingSpark, token).await?;
                }
                QueueState::ProcessingPandas => {
                    self.advance(id, &mut stage, ProcessingStage::ProcessingPandas, token).await?;
                }
                QueueState::Completed => return Ok(()),
                QueueState::Error => {
                    let reason = report
                        .error
                        .unwrap_or_else(|| "server reported an error".to_string());
                    return Err(BenchError::ProcessingFailed(reason));
                }
            }

            pause(token, config.poll_interval()).await?;
        }
    }

    /// Move the projection forward to `target`, emitting every intermediate stage once.
    async fn advance(
        &self,
        id: &str,
        stage: &mut ProcessingStage,
        target: ProcessingStage,
        token: &CancellationToken,
    ) -> BenchResult<()> {
        if *stage == ProcessingStage::Queued {
            self.inner.publish(id, ProcessingStatus::uploading());
            *stage = ProcessingStage::Uploading;
            pause(token, self.inner.config.stage_pause()).await?;
        }
        if *stage < ProcessingStage::ProcessingSpark {
            self.inner.publish(id, ProcessingStatus::processing_spark());
            *stage = ProcessingStage::ProcessingSpark;
        }
        if target == ProcessingStage::ProcessingPandas && *stage < target {
            self.inner.publish(id, ProcessingStatus::processing_pandas());
            *stage = target;
        }
        Ok(())
    }

    fn complete(&self, id: &str, result: ServerResult, requested: &SparkConfig, file_name: &str) {
        tracing::info!(
            record_id = id,
            spark_ms = result.spark_execution_time,
            pandas_ms = result.pandas_execution_time,
            "benchmark completed"
        );
        self.inner.update_record(id, |r| {
            r.status = RecordStatus::Completed;
            r.data_source = DataSource::Server;
            r.spark_execution_time_ms = result.spark_execution_time;
            r.pandas_execution_time_ms = result.pandas_execution_time;
            r.spark_throughput_mbps = result.spark_throughput;
            r.pandas_throughput_mbps = result.pandas_throughput;
            r.spark_job_info = result.spark_job_info;
            r.spark_result = result.spark_result;
            r.pandas_result = result.pandas_result;
            r.spark_config = Some(result.spark_config.unwrap_or_else(|| requested.clone()));
        });
        self.inner.publish(id, ProcessingStatus::completed());
        self.inner.notifier.notify(Notification::completed(file_name));
    }

    fn fall_back(&self, id: &str, err: BenchError, requested: &SparkConfig, file_size: u64) {
        tracing::warn!(record_id = id, kind = ?err.kind(), error = %err, "benchmark failed, using simulated results");
        let sim = simulate(&mut rand::thread_rng(), file_size);
        self.inner.update_record(id, |r| {
            r.status = RecordStatus::Completed;
            r.data_source = DataSource::Simulated;
            r.spark_execution_time_ms = sim.spark_ms;
            r.pandas_execution_time_ms = sim.pandas_ms;
            r.spark_throughput_mbps = sim.spark_throughput;
            r.pandas_throughput_mbps = sim.pandas_throughput;
            r.spark_config = Some(requested.clone());
        });
        self.inner.publish(id, ProcessingStatus::simulated());
        self.inner.notifier.notify(Notification::demo_mode());
    }

    fn abort(&self, id: &str, file_name: &str) {
        tracing::info!(record_id = id, "benchmark cancelled");
        let progress = self.inner.state().status_of(id).map(|s| s.progress).unwrap_or(0);
        self.inner.update_record(id, |r| {
            r.status = RecordStatus::Error;
            r.error_message = Some("Benchmark cancelled".to_string());
        });
        self.inner.publish(id, ProcessingStatus::cancelled(progress));
        self.inner.notifier.notify(Notification::cancelled(file_name));
    }

    /// Drop the in-flight guard and schedule the projection clear.
    fn finalize(&self, id: &str) {
        self.inner.cancels().remove(id);
        self.inner.state().finish(id);

        let inner = Arc::clone(&self.inner);
        let id = id.to_string();
        let delay = inner.config.clear_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.clear(&id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::notify::RecordingNotifier;
    use crate::service::{MockConfig, MockService};

    fn orchestrator(config: MockConfig) -> Orchestrator<MockService, RecordingNotifier> {
        Orchestrator::new(
            MockService::new(config),
            RecordingNotifier::new(),
            ClientConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_id() {
        let orch = orchestrator(MockConfig::new());
        assert!(!orch.cancel("nope"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skipped_processing_report_still_orders_stages() {
        let orch = orchestrator(MockConfig::new().with_poll_states(&[
            QueueState::ProcessingPandas,
            QueueState::Completed,
        ]));
        let mut events = orch.subscribe();
        orch.submit(UploadFile::new("a.csv", vec![0; 10]), FileType::Csv, SparkConfig::default())
            .await;

        let mut stages = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let Some(status) = event.status {
                stages.push(status.stage);
            }
        }
        assert_eq!(
            stages,
            vec![
                ProcessingStage::Queued,
                ProcessingStage::Queued,
                ProcessingStage::Uploading,
                ProcessingStage::ProcessingSpark,
                ProcessingStage::ProcessingPandas,
                ProcessingStage::Completed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_config_echo_preferred() {
        let mut result = ServerResult::new(1.0, 2.0, 3.0, 4.0);
        result.spark_config = Some(SparkConfig::new(12, "24g"));
        let orch = orchestrator(MockConfig::new().with_result(result));
        let id = orch
            .submit(UploadFile::new("a.json", vec![1]), FileType::Json, SparkConfig::default())
            .await;
        assert_eq!(orch.record(&id).unwrap().spark_config, Some(SparkConfig::new(12, "24g")));
    }
}
