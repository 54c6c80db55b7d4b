//! Filesystem-backed [`AnalysisStore`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use brandlens_core::RunReport;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{AnalysisStore, AnalysisSummary, ListFilter, RunId, StoreError, StoredAnalysis};

const INDEX_FILE: &str = "index.json";

/// Stores each run as `<dir>/<id>.json` and keeps `<dir>/index.json` in sync.
///
/// The directory is created on first save. Index updates are serialized
/// within a process; concurrent processes sharing a directory are not
/// coordinated.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    index_lock: Mutex<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            index_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn run_path(&self, id: &RunId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    async fn read_index(&self) -> Result<Vec<AnalysisSummary>, StoreError> {
        Ok(read_json(&self.index_path()).await?.unwrap_or_default())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Write through a sibling temp file and rename, so readers never observe a
/// half-written document.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(StoreError::Serialize)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

#[async_trait]
impl AnalysisStore for JsonFileStore {
    async fn save(&self, report: &RunReport) -> Result<RunId, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let saved_at = Utc::now();
        let stored = StoredAnalysis {
            id: RunId::generate(saved_at),
            saved_at,
            report: report.clone(),
        };
        write_json(&self.run_path(&stored.id), &stored).await?;

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        index.push(AnalysisSummary::of(&stored));
        write_json(&self.index_path(), &index).await?;

        tracing::info!(
            run_id = %stored.id,
            brand = %report.brand,
            path = %self.run_path(&stored.id).display(),
            "analysis saved"
        );
        Ok(stored.id)
    }

    async fn load(&self, id: &RunId) -> Result<Option<StoredAnalysis>, StoreError> {
        read_json(&self.run_path(id)).await
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<AnalysisSummary>, StoreError> {
        let mut entries: Vec<AnalysisSummary> = self
            .read_index()
            .await?
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();

        entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit.filter(|&n| n > 0) {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn delete(&self, id: &RunId) -> Result<bool, StoreError> {
        let path = self.run_path(id);
        let file_removed = match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|entry| &entry.id != id);
        let entry_removed = index.len() != before;
        if entry_removed {
            write_json(&self.index_path(), &index).await?;
        }

        if file_removed || entry_removed {
            tracing::info!(run_id = %id, "analysis deleted");
        } else {
            tracing::debug!(run_id = %id, "delete requested for unknown analysis");
        }
        Ok(file_removed || entry_removed)
    }
}
