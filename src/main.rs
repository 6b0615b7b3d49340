#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use sparkbench::core::FileType;
use sparkbench::submit_cmd::SubmitOptions;
use sparkbench::{formats_cmd, submit_cmd};

#[derive(Parser, Debug)]
#[command(name = "sparkbench")]
#[command(about = "Compare Apache Spark and Pandas on your data files", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set SPARKBENCH_LOG)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a file and benchmark it on the processing server
    Submit {
        /// File to benchmark
        file: std::path::PathBuf,
        /// Declared file type (PARQUET, AVRO, CSV, XLSX, JSON, DICOM, FASTQ, EDF); inferred from the extension if omitted
        #[arg(long = "type")]
        file_type: Option<FileType>,
        /// Spark CPU threads (1-12)
        #[arg(long, default_value_t = 6)]
        threads: u32,
        /// Spark driver memory (1g, 2g, 4g, 8g, 12g, 16g, 20g, 24g)
        #[arg(long, default_value = "4g")]
        memory: String,
        /// Target partition size in MB (CSV only, 1-1024)
        #[arg(long)]
        partition_size_mb: Option<u32>,
        /// Client configuration file (TOML)
        #[arg(long)]
        config: Option<std::path::PathBuf>,
        /// Write the resulting record as JSON to this file
        #[arg(long)]
        json: Option<std::path::PathBuf>,
        /// Append the resulting record to this JSONL history
        #[arg(long)]
        jsonl: Option<std::path::PathBuf>,
        /// Export the resulting record as CSV to this file
        #[arg(long)]
        csv: Option<std::path::PathBuf>,
    },

    /// List supported file formats
    Formats {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("SPARKBENCH_LOG").unwrap_or_else(|_| {
        if verbose { "sparkbench=debug".to_string() } else { "sparkbench=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Submit { file, file_type, threads, memory, partition_size_mb, config, json, jsonl, csv } => {
            let opts = SubmitOptions {
                file,
                file_type,
                threads,
                driver_memory: memory,
                partition_size_mb,
                config,
                json,
                jsonl,
                csv,
            };
            tokio::runtime::Runtime::new()
                .map_err(sparkbench::BenchError::from)
                .and_then(|rt| rt.block_on(submit_cmd::run(opts)))
        }
        Commands::Formats { json } => formats_cmd::run(json),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
