//! Client side of the remote processing service.
//!
//! `BenchmarkService` is the seam between the orchestrator and the server:
//! `HttpService` speaks the real HTTP API, `MockService` replays a script.

pub mod http;
pub mod mock;
pub mod traits;

// Re-export key types
pub use http::HttpService;
pub use mock::{MockConfig, MockFailure, MockService};
pub use traits::{
    BenchmarkService, QueueState, QueueStatusResponse, ServerResult, SubmitForm, SubmitResponse,
    UploadFile,
};
