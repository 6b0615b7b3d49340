//! Engine module: drives benchmark submissions against the processing service.
//!
//! # Architecture
//!
//! - **Service**: the remote server, reached through `crate::service::BenchmarkService`.
//! - **Orchestrator**: owns the result list and status projections and runs the
//!   submit / poll / fetch state machine for each submission.
//! - **Notifier**: injected sink for user-facing messages.
//!
//! Presentation layers only read snapshots and subscribe to status events; they
//! never mutate orchestrator state.

pub mod notify;
pub mod orchestrator;
pub mod simulate;
pub mod state;

// Re-export key types for convenience
pub use notify::{ChannelNotifier, Notification, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use orchestrator::Orchestrator;
pub use simulate::{SimulatedTimings, simulate, throughput_mbps};
pub use state::{Snapshot, StatusEvent};
