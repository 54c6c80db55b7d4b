//! Read and delete stored analyses.

use brandlens_core::AppConfig;
use brandlens_store::{AnalysisStore, JsonFileStore, ListFilter, RunId};

pub(crate) async fn run_list(
    config: &AppConfig,
    brand: Option<&str>,
    limit: usize,
) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.storage_dir);
    let filter = ListFilter {
        brand: brand.map(str::to_string),
        limit: Some(limit),
    };
    let entries = store.list(&filter).await?;

    if entries.is_empty() {
        println!(
            "no stored analyses{}; run `analyze` first",
            brand.map(|b| format!(" for brand '{b}'")).unwrap_or_default()
        );
        return Ok(());
    }

    println!("{:<28}{:<20}{:<25}{:<5}SOURCES", "ID", "SAVED", "BRAND", "AI");
    for entry in &entries {
        let saved = entry.saved_at.format("%Y-%m-%d %H:%M").to_string();
        let sources: Vec<&str> = entry.profile_refs.keys().map(|p| p.as_str()).collect();
        println!(
            "{:<28}{saved:<20}{:<25}{:<5}{}",
            entry.id.as_str(),
            entry.brand,
            if entry.ai_enabled { "yes" } else { "no" },
            sources.join(",")
        );
    }
    Ok(())
}

/// # Errors
///
/// Returns an error for a malformed id, a missing analysis, or an unreadable
/// file.
pub(crate) async fn run_show(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let id = RunId::parse(id)?;
    let store = JsonFileStore::new(&config.storage_dir);
    let stored = store
        .load(&id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("analysis '{id}' not found"))?;
    println!("{}", serde_json::to_string_pretty(&stored)?);
    Ok(())
}

pub(crate) async fn run_delete(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let id = RunId::parse(id)?;
    let store = JsonFileStore::new(&config.storage_dir);
    if store.delete(&id).await? {
        println!("deleted {id}");
        Ok(())
    } else {
        anyhow::bail!("analysis '{id}' not found")
    }
}
