use std::collections::BTreeMap;

use brandlens_core::{Platform, RunReport};
use brandlens_store::RunId;

/// What to analyze in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub brand: String,
    /// Requested sources, deduplicated, in request order.
    pub sources: Vec<Platform>,
    /// Profile references supplied by the caller. These win over discovery.
    pub manual_refs: BTreeMap<Platform, String>,
    /// Ask the profile resolver for sources without a manual reference.
    pub discover: bool,
    pub ai_enabled: bool,
    pub max_items: usize,
    /// Per item. Zero skips comment retrieval.
    pub max_comments: usize,
}

impl AnalysisRequest {
    pub const DEFAULT_MAX_ITEMS: usize = 10;
    pub const DEFAULT_MAX_COMMENTS: usize = 50;

    #[must_use]
    pub fn new(brand: impl Into<String>, sources: impl IntoIterator<Item = Platform>) -> Self {
        let mut unique: Vec<Platform> = Vec::new();
        for source in sources {
            if !unique.contains(&source) {
                unique.push(source);
            }
        }
        Self {
            brand: brand.into(),
            sources: unique,
            manual_refs: BTreeMap::new(),
            discover: true,
            ai_enabled: false,
            max_items: Self::DEFAULT_MAX_ITEMS,
            max_comments: Self::DEFAULT_MAX_COMMENTS,
        }
    }

    #[must_use]
    pub fn with_manual_ref(mut self, platform: Platform, profile_ref: impl Into<String>) -> Self {
        self.manual_refs.insert(platform, profile_ref.into());
        self
    }

    #[must_use]
    pub fn with_discovery(mut self, discover: bool) -> Self {
        self.discover = discover;
        self
    }

    #[must_use]
    pub fn with_ai(mut self, enabled: bool) -> Self {
        self.ai_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, max_items: usize, max_comments: usize) -> Self {
        self.max_items = max_items;
        self.max_comments = max_comments;
        self
    }
}

/// A completed, persisted run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub report: RunReport,
}
