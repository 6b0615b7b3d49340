//! Reporting module for benchmark results.
//!
//! This module provides:
//! - Size and duration formatting for display
//! - Speedup classification and aggregate summaries
//! - Markdown rendering of the result list

pub mod comparison;

// Re-export key types
pub use comparison::{
    ComparisonSummary, Speedup, format_bytes, format_time, render_markdown, render_status_line,
};
