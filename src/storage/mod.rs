//! Local export of benchmark records.
//!
//! Finished records can be appended to a JSONL history or exported to CSV.

pub mod csv;
pub mod jsonl;

// Re-export key types
pub use csv::{CSV_HEADERS, CsvExporter};
pub use jsonl::JsonlWriter;
