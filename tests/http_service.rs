//! End-to-end tests of `HttpService` against an in-process axum server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use sparkbench::core::{
    ClientConfig, DataSource, FileType, ProcessingStage, QueueInfo, RecordStatus, SparkConfig,
};
use sparkbench::engine::{Orchestrator, RecordingNotifier, Severity};
use sparkbench::service::{BenchmarkService, HttpService, QueueState, UploadFile};

const TASK_ID: &str = "task-42";

/// What the fake processing server should do.
#[derive(Default)]
struct FakeServer {
    submit_status: Option<StatusCode>,
    poll_error: Option<String>,
    bodies: Mutex<Vec<String>>,
    polls: AtomicUsize,
}

type Shared = Arc<FakeServer>;

async fn submit(State(fake): State<Shared>, body: Bytes) -> Response {
    fake.bodies
        .lock()
        .unwrap()
        .push(String::from_utf8_lossy(&body).into_owned());
    if let Some(status) = fake.submit_status {
        return status.into_response();
    }
    Json(json!({ "task_id": TASK_ID, "position": 1, "total": 2 })).into_response()
}

async fn queue_status(State(fake): State<Shared>, Path(task_id): Path<String>) -> Response {
    if task_id != TASK_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    let poll = fake.polls.fetch_add(1, Ordering::SeqCst);
    if let Some(reason) = &fake.poll_error {
        return Json(json!({ "status": "error", "error": reason })).into_response();
    }
    let body: Value = match poll {
        0 => json!({ "status": "queued", "position": 1, "total": 2 }),
        1 => json!({ "status": "processing" }),
        2 => json!({ "status": "processing_pandas" }),
        _ => json!({ "status": "completed" }),
    };
    Json(body).into_response()
}

async fn result(Path(task_id): Path<String>) -> Response {
    if task_id != TASK_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "sparkExecutionTime": 812.5,
        "pandasExecutionTime": 3050.0,
        "sparkThroughput": 12.31,
        "pandasThroughput": 3.28,
        "sparkConfig": { "threads": 4, "driverMemory": "8g" }
    }))
    .into_response()
}

async fn spawn_server(fake: Shared) -> String {
    let app = Router::new()
        .route("/api/benchmark/submit", post(submit))
        .route("/api/queue-status/:task_id", get(queue_status))
        .route("/api/benchmark/result/:task_id", get(result))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn fast_config(origin: &str) -> ClientConfig {
    ClientConfig {
        api_url: "/api".to_string(),
        server_origin: origin.to_string(),
        poll_interval_ms: 20,
        stage_pause_ms: 5,
        clear_delay_ms: 50,
        max_wait_secs: 10,
        ..ClientConfig::default()
    }
}

fn orchestrator(config: ClientConfig) -> (Orchestrator<HttpService, RecordingNotifier>, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let service = HttpService::new(&config).unwrap();
    (Orchestrator::new(service, notifier.clone(), config), notifier)
}

#[tokio::test]
async fn test_full_lifecycle_over_http() {
    let fake = Arc::new(FakeServer::default());
    let origin = spawn_server(fake.clone()).await;
    let (orch, notifier) = orchestrator(fast_config(&origin));
    let mut events = orch.subscribe();

    let upload = UploadFile::new("vitals.csv", b"a,b\n1,2\n".to_vec());
    let config = SparkConfig::new(6, "4g").with_partition_size_mb(64);
    let id = orch.submit(upload, FileType::Csv, config).await;

    let record = orch.record(&id).unwrap();
    assert_eq!(record.status, RecordStatus::Completed);
    assert_eq!(record.data_source, DataSource::Server);
    assert_eq!(record.spark_execution_time_ms, 812.5);
    assert_eq!(record.pandas_execution_time_ms, 3050.0);
    assert_eq!(record.spark_throughput_mbps, 12.31);
    assert_eq!(record.pandas_throughput_mbps, 3.28);
    assert_eq!(record.spark_config, Some(SparkConfig::new(4, "8g")));
    assert_eq!(notifier.count(Severity::Success), 1);

    let bodies = fake.bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert!(body.contains("filename=\"vitals.csv\""));
    assert!(body.contains("name=\"fileType\"\r\n\r\nCSV"));
    assert!(body.contains("name=\"threads\"\r\n\r\n6"));
    assert!(body.contains("name=\"driverMemory\"\r\n\r\n4g"));
    assert!(body.contains("name=\"target_partition_size_mb\"\r\n\r\n64"));

    let mut stages = Vec::new();
    let mut queue = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Some(status) = event.status {
            stages.push(status.stage);
            queue.extend(status.queue);
        }
    }
    assert_eq!(stages.last(), Some(&ProcessingStage::Completed));
    assert!(stages.contains(&ProcessingStage::ProcessingPandas));
    assert!(stages.windows(2).all(|w| w[0] <= w[1]));
    assert!(queue.contains(&QueueInfo { position: 1, total: 2 }));
}

#[tokio::test]
async fn test_non_csv_upload_omits_partition_field() {
    let fake = Arc::new(FakeServer::default());
    let origin = spawn_server(fake.clone()).await;
    let (orch, _) = orchestrator(fast_config(&origin));

    let config = SparkConfig::default().with_partition_size_mb(64);
    orch.submit(UploadFile::new("scan.dcm", vec![0u8; 32]), FileType::Dicom, config)
        .await;

    let bodies = fake.bodies.lock().unwrap().clone();
    assert!(bodies[0].contains("name=\"fileType\"\r\n\r\nDICOM"));
    assert!(!bodies[0].contains("target_partition_size_mb"));
}

#[tokio::test]
async fn test_submit_server_error_falls_back() {
    let fake = Arc::new(FakeServer {
        submit_status: Some(StatusCode::INTERNAL_SERVER_ERROR),
        ..FakeServer::default()
    });
    let origin = spawn_server(fake.clone()).await;
    let (orch, notifier) = orchestrator(fast_config(&origin));

    let id = orch
        .submit(UploadFile::new("a.csv", vec![1; 1024]), FileType::Csv, SparkConfig::default())
        .await;

    let record = orch.record(&id).unwrap();
    assert_eq!(record.status, RecordStatus::Completed);
    assert_eq!(record.data_source, DataSource::Simulated);
    assert_eq!(fake.polls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.count(Severity::Degraded), 1);
}

#[tokio::test]
async fn test_server_reported_error_falls_back() {
    let fake = Arc::new(FakeServer {
        poll_error: Some("executor lost".to_string()),
        ..FakeServer::default()
    });
    let origin = spawn_server(fake.clone()).await;
    let (orch, notifier) = orchestrator(fast_config(&origin));

    let id = orch
        .submit(UploadFile::new("a.json", vec![b'{'; 10]), FileType::Json, SparkConfig::default())
        .await;

    assert_eq!(orch.record(&id).unwrap().data_source, DataSource::Simulated);
    assert_eq!(notifier.count(Severity::Degraded), 1);
}

#[tokio::test]
async fn test_unreachable_server_falls_back() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (orch, notifier) = orchestrator(fast_config(&origin));
    let id = orch
        .submit(UploadFile::new("r.fastq", vec![b'A'; 64]), FileType::Fastq, SparkConfig::default())
        .await;

    assert_eq!(orch.record(&id).unwrap().data_source, DataSource::Simulated);
    assert_eq!(notifier.count(Severity::Degraded), 1);
}

#[tokio::test]
async fn test_queue_status_decodes_pandas_stage() {
    let fake = Arc::new(FakeServer::default());
    let origin = spawn_server(fake.clone()).await;
    let service = HttpService::new(&fast_config(&origin)).unwrap();

    let states = [
        service.queue_status(TASK_ID).await.unwrap(),
        service.queue_status(TASK_ID).await.unwrap(),
        service.queue_status(TASK_ID).await.unwrap(),
    ];
    assert_eq!(states[0].position, Some(1));
    assert_eq!(states[1].status, QueueState::Processing);
    assert_eq!(states[2].status, QueueState::ProcessingPandas);

    let err = service.queue_status("unknown").await.unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
}
