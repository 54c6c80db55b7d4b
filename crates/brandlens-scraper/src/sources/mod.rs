//! Apify-backed adapters, one per platform.

pub mod instagram;
pub mod tiktok;
pub mod youtube;

use std::sync::Arc;

use crate::adapter::AdapterRegistry;
use crate::apify::ApifyClient;

pub use instagram::InstagramAdapter;
pub use tiktok::TiktokAdapter;
pub use youtube::YoutubeAdapter;

/// Registry with every Apify adapter, registered as Instagram, TikTok,
/// YouTube.
#[must_use]
pub fn apify_registry(client: &Arc<ApifyClient>) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry
        .register(Arc::new(InstagramAdapter::new(Arc::clone(client))))
        .register(Arc::new(TiktokAdapter::new(Arc::clone(client))))
        .register(Arc::new(YoutubeAdapter::new(Arc::clone(client))));
    registry
}
