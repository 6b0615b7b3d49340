//! Side-by-side Spark vs Pandas comparison rendering.

use serde::{Deserialize, Serialize};

use crate::core::{BenchmarkRecord, DataSource, ProcessingStage, ProcessingStatus, RecordStatus};

/// Which engine finished first, and by how much.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "winner", content = "factor", rename_all = "lowercase")]
pub enum Speedup {
    Spark(f64),
    Pandas(f64),
}

impl Speedup {
    /// `None` until both times are known.
    pub fn of(record: &BenchmarkRecord) -> Option<Self> {
        let spark = record.spark_execution_time_ms;
        let pandas = record.pandas_execution_time_ms;
        if record.status != RecordStatus::Completed || spark <= 0.0 || pandas <= 0.0 {
            return None;
        }
        if spark < pandas {
            Some(Speedup::Spark(pandas / spark))
        } else {
            Some(Speedup::Pandas(spark / pandas))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Speedup::Spark(f) => format!("Spark {f:.1}x faster"),
            Speedup::Pandas(f) => format!("Pandas {f:.1}x faster"),
        }
    }
}

/// Aggregate over completed records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total: usize,
    pub completed: usize,
    pub simulated: usize,
    pub spark_wins: usize,
    pub pandas_wins: usize,
    /// Geometric mean of pandas_time / spark_time
    pub mean_spark_speedup: Option<f64>,
}

impl ComparisonSummary {
    pub fn from_records(records: &[BenchmarkRecord]) -> Self {
        let mut summary = ComparisonSummary {
            total: records.len(),
            ..Default::default()
        };
        let mut log_sum = 0.0;
        let mut n = 0usize;
        for record in records {
            if record.status != RecordStatus::Completed {
                continue;
            }
            summary.completed += 1;
            if record.data_source == DataSource::Simulated {
                summary.simulated += 1;
            }
            match Speedup::of(record) {
                Some(Speedup::Spark(_)) => summary.spark_wins += 1,
                Some(Speedup::Pandas(_)) => summary.pandas_wins += 1,
                None => continue,
            }
            log_sum += (record.pandas_execution_time_ms / record.spark_execution_time_ms).ln();
            n += 1;
        }
        if n > 0 {
            summary.mean_spark_speedup = Some((log_sum / n as f64).exp());
        }
        summary
    }
}

/// Human-readable size using binary units, e.g. `1.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= 1024.0 && exp < UNITS.len() - 1 {
        value /= 1024.0;
        exp += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[exp])
}

/// Human-readable duration: `800ms`, `3.20s`, `1.05min`.
pub fn format_time(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{ms:.0}ms")
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{:.2}min", ms / 60_000.0)
    }
}

/// One-line progress rendering for terminals.
pub fn render_status_line(status: &ProcessingStatus) -> String {
    const WIDTH: usize = 20;
    let filled = (status.progress as usize * WIDTH) / 100;
    let bar: String = "#".repeat(filled) + &"-".repeat(WIDTH - filled);
    let marker = match status.stage {
        ProcessingStage::Completed => "done",
        ProcessingStage::Error => "failed",
        _ => status.stage.label(),
    };
    format!("[{bar}] {:>3}% {marker}: {}", status.progress, status.message)
}

pub fn render_markdown(records: &[BenchmarkRecord]) -> String {
    let mut out = String::new();
    out.push_str("## SparkBench Results\n\n");

    if records.is_empty() {
        out.push_str("_No benchmarks yet. Upload a file to start comparing Apache Spark and Pandas performance._\n");
        return out;
    }

    out.push_str("| File | Type | Size | Spark | Spark MB/s | Pandas | Pandas MB/s | Result | Source |\n");
    out.push_str("|------|------|------|-------|------------|--------|-------------|--------|--------|\n");
    for r in records {
        let (spark, spark_tp, pandas, pandas_tp, verdict) = match r.status {
            RecordStatus::Completed => (
                format_time(r.spark_execution_time_ms),
                format!("{:.2}", r.spark_throughput_mbps),
                format_time(r.pandas_execution_time_ms),
                format!("{:.2}", r.pandas_throughput_mbps),
                Speedup::of(r).map(|s| s.describe()).unwrap_or_else(|| "-".to_string()),
            ),
            RecordStatus::Error => {
                let msg = r.error_message.clone().unwrap_or_else(|| "error".to_string());
                ("-".into(), "-".into(), "-".into(), "-".into(), msg)
            }
            _ => ("-".into(), "-".into(), "-".into(), "-".into(), r.status.as_str().to_string()),
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            r.file_name,
            r.file_type,
            format_bytes(r.file_size),
            spark,
            spark_tp,
            pandas,
            pandas_tp,
            verdict,
            r.data_source.as_str(),
        ));
    }

    let summary = ComparisonSummary::from_records(records);
    out.push_str(&format!(
        "\n**{}** completed ({} simulated). Spark faster in {}, Pandas faster in {}.",
        summary.completed, summary.simulated, summary.spark_wins, summary.pandas_wins
    ));
    if let Some(mean) = summary.mean_spark_speedup {
        out.push_str(&format!(" Mean Spark speedup: {mean:.2}x."));
    }
    out.push('\n');

    let with_jobs: Vec<&BenchmarkRecord> = records.iter().filter(|r| r.spark_job_info.is_some()).collect();
    if !with_jobs.is_empty() {
        out.push_str("\n### Spark Jobs\n\n");
        out.push_str("| File | Version | Stages | Tasks | Executors |\n|------|---------|--------|-------|-----------|\n");
        for r in with_jobs {
            if let Some(job) = &r.spark_job_info {
                let opt = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    r.file_name,
                    job.spark_version.as_deref().unwrap_or("-"),
                    opt(job.stage_count),
                    opt(job.task_count),
                    opt(job.executor_count),
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileType, SparkJobInfo};

    fn completed(spark: f64, pandas: f64, source: DataSource) -> BenchmarkRecord {
        let mut r = BenchmarkRecord::pending(FileType::Csv, "vitals.csv", 10 * 1024 * 1024);
        r.status = RecordStatus::Completed;
        r.data_source = source;
        r.spark_execution_time_ms = spark;
        r.pandas_execution_time_ms = pandas;
        r.spark_throughput_mbps = 12.5;
        r.pandas_throughput_mbps = 3.1;
        r
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 + 1024 * 1024 * 512), "3.5 GB");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(800.0), "800ms");
        assert_eq!(format_time(3200.0), "3.20s");
        assert_eq!(format_time(63_000.0), "1.05min");
    }

    #[test]
    fn test_speedup() {
        let r = completed(800.0, 3200.0, DataSource::Server);
        assert_eq!(Speedup::of(&r), Some(Speedup::Spark(4.0)));
        assert_eq!(Speedup::of(&r).unwrap().describe(), "Spark 4.0x faster");

        let r = completed(1000.0, 500.0, DataSource::Server);
        assert_eq!(Speedup::of(&r).unwrap().describe(), "Pandas 2.0x faster");

        let pending = BenchmarkRecord::pending(FileType::Avro, "a.avro", 1);
        assert!(Speedup::of(&pending).is_none());
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            completed(800.0, 3200.0, DataSource::Server),
            completed(1000.0, 4000.0, DataSource::Simulated),
            BenchmarkRecord::pending(FileType::Csv, "b.csv", 1),
        ];
        let summary = ComparisonSummary::from_records(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.simulated, 1);
        assert_eq!(summary.spark_wins, 2);
        assert!((summary.mean_spark_speedup.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_markdown() {
        let mut r = completed(800.0, 3200.0, DataSource::Server);
        r.spark_job_info = Some(SparkJobInfo {
            spark_version: Some("3.5.7".into()),
            stage_count: Some(3),
            ..Default::default()
        });
        let md = render_markdown(&[r]);
        assert!(md.contains("| vitals.csv | CSV | 10 MB | 800ms | 12.50 | 3.20s | 3.10 | Spark 4.0x faster | server |"));
        assert!(md.contains("### Spark Jobs"));
        assert!(md.contains("| vitals.csv | 3.5.7 | 3 | - | - |"));
    }

    #[test]
    fn test_render_empty() {
        assert!(render_markdown(&[]).contains("No benchmarks yet"));
    }

    #[test]
    fn test_status_line() {
        let line = render_status_line(&ProcessingStatus::processing_spark());
        assert_eq!(line, "[##########----------]  50% processing spark: Running Apache Spark processing...");
        assert!(render_status_line(&ProcessingStatus::completed()).contains("100% done"));
    }
}
