//! Persistence for completed analysis runs.
//!
//! [`AnalysisStore`] is the seam the pipeline saves through; [`JsonFileStore`]
//! keeps one JSON document per run plus an `index.json` summary list.

mod error;
mod json_file;
mod run_id;

use async_trait::async_trait;
use brandlens_core::{Platform, RunReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use run_id::RunId;

/// A persisted run: the full report plus its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: RunId,
    pub saved_at: DateTime<Utc>,
    pub report: RunReport,
}

/// One `index.json` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub id: RunId,
    pub saved_at: DateTime<Utc>,
    pub brand: String,
    pub profile_refs: BTreeMap<Platform, String>,
    pub ai_enabled: bool,
}

impl AnalysisSummary {
    #[must_use]
    pub fn of(stored: &StoredAnalysis) -> Self {
        Self {
            id: stored.id.clone(),
            saved_at: stored.saved_at,
            brand: stored.report.brand.clone(),
            profile_refs: stored.report.profile_refs.clone(),
            ai_enabled: stored.report.analysis.is_some(),
        }
    }
}

/// Narrows [`AnalysisStore::list`]. The default lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Case-insensitive exact brand match.
    pub brand: Option<String>,
    /// Newest entries to keep. `Some(0)` means no limit.
    pub limit: Option<usize>,
}

impl ListFilter {
    fn matches(&self, summary: &AnalysisSummary) -> bool {
        match self.brand.as_deref() {
            Some(brand) => summary.brand.to_lowercase() == brand.to_lowercase(),
            None => true,
        }
    }
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist `report` under a fresh id.
    async fn save(&self, report: &RunReport) -> Result<RunId, StoreError>;

    /// `Ok(None)` when no run with `id` exists.
    async fn load(&self, id: &RunId) -> Result<Option<StoredAnalysis>, StoreError>;

    /// Matching runs, newest first.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<AnalysisSummary>, StoreError>;

    /// Returns whether anything was removed.
    async fn delete(&self, id: &RunId) -> Result<bool, StoreError>;
}
