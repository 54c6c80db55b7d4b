//! The source adapter contract and the registry the pipeline resolves
//! adapters from.

use std::sync::Arc;

use async_trait::async_trait;
use brandlens_core::{Comment, ContentItem, Platform};

use crate::error::ScraperError;

/// Retrieval capability for one platform.
///
/// Implementations make a single provider call per method; retries and
/// pacing are applied by the caller. Items or comments that fail to parse
/// are dropped with a warning and never fail the call.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Up to `max_items` items from `profile_ref`, in provider order.
    async fn fetch_items(
        &self,
        profile_ref: &str,
        max_items: usize,
    ) -> Result<Vec<ContentItem>, ScraperError>;

    /// Up to `max_comments` comments on the item at `item_ref` (its url).
    async fn fetch_comments(
        &self,
        item_ref: &str,
        max_comments: usize,
    ) -> Result<Vec<Comment>, ScraperError>;
}

/// Adapters keyed by platform, in registration order.
///
/// Registration order is the tie-break order for source ranking.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<(Platform, Arc<dyn SourceAdapter>)>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `adapter` under its own platform. Re-registering a platform
    /// replaces the adapter but keeps the original position.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) -> &mut Self {
        let platform = adapter.platform();
        if let Some(slot) = self.adapters.iter_mut().find(|(p, _)| *p == platform) {
            tracing::debug!(source = %platform, "replacing registered adapter");
            slot.1 = adapter;
        } else {
            self.adapters.push((platform, adapter));
        }
        self
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters
            .iter()
            .find(|(p, _)| *p == platform)
            .map(|(_, a)| Arc::clone(a))
    }

    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        self.adapters.iter().map(|(p, _)| *p).collect()
    }

    /// Registration index of `platform`, if registered.
    #[must_use]
    pub fn position(&self, platform: Platform) -> Option<usize> {
        self.adapters.iter().position(|(p, _)| *p == platform)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}
