//! Run orchestration for brandlens.
//!
//! [`Orchestrator`] drives one analysis run across the registered source
//! adapters and hands the finished [`RunReport`](brandlens_core::RunReport)
//! to an [`AnalysisStore`](brandlens_store::AnalysisStore).

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod request;
pub mod state;

pub use error::PipelineError;
pub use orchestrator::{Orchestrator, OrchestratorBuilder, PipelineSettings};
pub use progress::{
    NoopProgressSink, PhaseProgress, PhaseSpec, ProgressEvent, ProgressSink, TracingProgressSink,
};
pub use request::{AnalysisRequest, RunOutcome};
pub use state::{RunState, RunTracker};
