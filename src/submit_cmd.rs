use std::io::Write;
use std::path::PathBuf;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::core::{ClientConfig, FileType, RecordStatus, SparkConfig};
use crate::engine::{Orchestrator, StatusEvent, TracingNotifier};
use crate::report::{render_markdown, render_status_line};
use crate::service::{HttpService, UploadFile};
use crate::storage::{CsvExporter, JsonlWriter};
use crate::{BenchError, BenchResult, catalog};

#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub file: PathBuf,
    /// Inferred from the extension when absent
    pub file_type: Option<FileType>,
    pub threads: u32,
    pub driver_memory: String,
    pub partition_size_mb: Option<u32>,
    pub config: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub jsonl: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

fn resolve_file_type(opts: &SubmitOptions) -> BenchResult<FileType> {
    if let Some(ft) = opts.file_type {
        return Ok(ft);
    }
    let name = opts
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    catalog::detect(name).ok_or_else(|| {
        BenchError::Config(format!(
            "cannot infer file type of '{}', pass --type",
            opts.file.display()
        ))
    })
}

/// Print status lines until `done`, then flush whatever is still buffered.
async fn relay_status<W: Write>(
    mut events: broadcast::Receiver<StatusEvent>,
    done: CancellationToken,
    mut out: W,
) -> W {
    fn print<W: Write>(event: StatusEvent, out: &mut W) {
        if let Some(status) = event.status {
            let _ = writeln!(out, "{}", render_status_line(&status));
        }
    }
    loop {
        tokio::select! {
            res = events.recv() => match res {
                Ok(event) => print(event, &mut out),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = done.cancelled() => {
                while let Ok(event) = events.try_recv() {
                    print(event, &mut out);
                }
                break;
            }
        }
    }
    out
}

/// Engine parameters for the upload. The partition size is dropped for non-CSV types.
fn spark_config(opts: &SubmitOptions, file_type: FileType) -> SparkConfig {
    let spark = SparkConfig::new(opts.threads, opts.driver_memory.clone());
    match opts.partition_size_mb {
        Some(size_mb) if file_type == FileType::Csv => spark.with_partition_size_mb(size_mb),
        Some(_) => {
            tracing::warn!(%file_type, "--partition-size-mb only applies to CSV, ignoring");
            spark
        }
        None => spark,
    }
}

pub async fn run(opts: SubmitOptions) -> BenchResult<()> {
    let config = match &opts.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    let file_type = resolve_file_type(&opts)?;
    tracing::debug!(format = catalog::get(file_type).name, "resolved file type");
    let spark = spark_config(&opts, file_type);
    spark.validate()?;

    let upload = UploadFile::read(&opts.file).await?;
    let service = HttpService::new(&config)?;
    tracing::info!(api = %service.base_url(), "using processing server");

    let orchestrator = Orchestrator::new(service, TracingNotifier, config);

    let done = CancellationToken::new();
    let printer = tokio::spawn(relay_status(
        orchestrator.subscribe(),
        done.clone(),
        std::io::stderr(),
    ));

    let canceller = orchestrator.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel_all();
        }
    });

    let id = orchestrator.submit(upload, file_type, spark).await;
    ctrl_c.abort();
    done.cancel();
    if let Err(e) = printer.await {
        tracing::debug!(error = %e, "status printer stopped early");
    }

    let record = orchestrator
        .record(&id)
        .ok_or_else(|| BenchError::Message(format!("record {id} missing after submission")))?;

    println!("{}", render_markdown(std::slice::from_ref(&record)));

    if let Some(path) = &opts.json {
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| BenchError::Message(format!("failed to serialize record: {e}")))?;
        std::fs::write(path, json)?;
    }
    if let Some(path) = &opts.jsonl {
        JsonlWriter::new(path).append(&record)?;
    }
    if let Some(path) = &opts.csv {
        CsvExporter::new().export(std::slice::from_ref(&record), path)?;
    }

    match record.status {
        RecordStatus::Error => Err(BenchError::Message(
            record.error_message.unwrap_or_else(|| "benchmark failed".to_string()),
        )),
        _ => Ok(()),
    }
}
