use brandlens_store::StoreError;
use thiserror::Error;

/// Conditions that stop a whole run. Per-source problems never surface here;
/// they end up in the report's skip list.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no profile reference resolved for any requested source of {brand:?}")]
    NoTargetsResolved { brand: String },

    #[error("failed to persist analysis: {0}")]
    Persistence(#[source] StoreError),
}
