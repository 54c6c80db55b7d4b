//! The run orchestrator.
//!
//! One run walks [`RunState`] forward: resolve a profile reference per
//! requested source, retrieve items and comments through the registered
//! adapters (every call retried and throttled), compute metrics, optionally
//! analyze comments, and persist the report. Only a run with no resolvable
//! source at all, or a failed save, returns `Err`; everything else degrades
//! into the report's skip list.

use std::collections::BTreeMap;
use std::sync::Arc;

use brandlens_core::{
    AppConfig, CommentAnalysis, MetricsSettings, Platform, RateLimits, RetryPolicy, RunReport,
    SkipReason, SkippedSource, SourceResult,
};
use brandlens_metrics::{aggregate, attach_metrics};
use brandlens_scraper::{
    run_with_retry, AdapterRegistry, ProfileResolver, RateLimiter, ScraperError, Sleeper,
    SourceAdapter, TokioSleeper,
};
use brandlens_sentiment::{CommentAnalyzer, CommentContext};
use brandlens_store::AnalysisStore;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::Instrument;

use crate::error::PipelineError;
use crate::progress::{PhaseProgress, ProgressSink, TracingProgressSink};
use crate::request::{AnalysisRequest, RunOutcome};
use crate::state::{RunState, RunTracker};

/// Tunables the orchestrator reads on every run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub retry: RetryPolicy,
    pub rate_limits: RateLimits,
    pub metrics: MetricsSettings,
    /// Sources retrieved at once. `1` retrieves one source after another.
    pub max_concurrent_sources: usize,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            retry: config.retry,
            rate_limits: config.rate_limits,
            metrics: config.metrics,
            max_concurrent_sources: config.max_concurrent_sources,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            rate_limits: RateLimits::default(),
            metrics: MetricsSettings::default(),
            max_concurrent_sources: 1,
        }
    }
}

pub struct OrchestratorBuilder {
    registry: AdapterRegistry,
    store: Arc<dyn AnalysisStore>,
    resolver: Option<Arc<dyn ProfileResolver>>,
    analyzer: Option<Arc<dyn CommentAnalyzer>>,
    progress: Arc<dyn ProgressSink>,
    sleeper: Arc<dyn Sleeper>,
    settings: PipelineSettings,
}

impl OrchestratorBuilder {
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn ProfileResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn analyzer(mut self, analyzer: Arc<dyn CommentAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Used for both retry backoff and rate limiting.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn build(self) -> Orchestrator {
        let limiter = RateLimiter::new(self.settings.rate_limits, Arc::clone(&self.sleeper));
        Orchestrator {
            registry: self.registry,
            store: self.store,
            resolver: self.resolver,
            analyzer: self.analyzer,
            progress: self.progress,
            sleeper: self.sleeper,
            limiter,
            settings: self.settings,
        }
    }
}

pub struct Orchestrator {
    registry: AdapterRegistry,
    store: Arc<dyn AnalysisStore>,
    resolver: Option<Arc<dyn ProfileResolver>>,
    analyzer: Option<Arc<dyn CommentAnalyzer>>,
    progress: Arc<dyn ProgressSink>,
    sleeper: Arc<dyn Sleeper>,
    limiter: RateLimiter,
    settings: PipelineSettings,
}

/// A source with a reference and an adapter, ready to retrieve.
struct RetrievalJob {
    order: usize,
    platform: Platform,
    profile_ref: String,
    adapter: Arc<dyn SourceAdapter>,
}

impl Orchestrator {
    #[must_use]
    pub fn builder(registry: AdapterRegistry, store: Arc<dyn AnalysisStore>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            registry,
            store,
            resolver: None,
            analyzer: None,
            progress: Arc::new(TracingProgressSink),
            sleeper: Arc::new(TokioSleeper),
            settings: PipelineSettings::default(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one analysis to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoTargetsResolved`] when no requested source
    /// has a profile reference (no adapter is called), and
    /// [`PipelineError::Persistence`] when the report cannot be saved.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<RunOutcome, PipelineError> {
        let span = tracing::info_span!("pipeline_run", brand = %request.brand);
        self.execute(request).instrument(span).await
    }

    #[allow(clippy::too_many_lines)] // Orchestration: one block per phase
    async fn execute(&self, request: &AnalysisRequest) -> Result<RunOutcome, PipelineError> {
        let started_at = Utc::now();
        let sink = self.progress.as_ref();
        let progress = PhaseProgress::for_run(request.sources.len(), request.ai_enabled);
        let mut tracker = RunTracker::new();

        tracing::info!(
            sources = ?request.sources,
            discover = request.discover,
            ai_enabled = request.ai_enabled,
            "starting analysis run"
        );

        tracker.advance(RunState::Discovering);
        progress.start_phase(RunState::Discovering, sink);
        let (targets, mut skipped) = self.discover(request).await;
        progress.step(
            format!("resolved {} of {} sources", targets.len(), request.sources.len()),
            sink,
        );

        if targets.is_empty() {
            tracker.advance(RunState::Failed);
            tracing::error!("no profile reference available for any requested source");
            return Err(PipelineError::NoTargetsResolved {
                brand: request.brand.clone(),
            });
        }

        tracker.advance(RunState::Retrieving);
        progress.start_phase(RunState::Retrieving, sink);
        for skip in &skipped {
            progress.step(format!("{}: {}", skip.platform, skip.reason), sink);
        }

        let mut jobs = Vec::with_capacity(targets.len());
        let mut profile_refs = BTreeMap::new();
        for (platform, profile_ref) in targets {
            profile_refs.insert(platform, profile_ref.clone());
            match self.registry.get(platform) {
                Some(adapter) => jobs.push(RetrievalJob {
                    order: self.registry.position(platform).unwrap_or(usize::MAX),
                    platform,
                    profile_ref,
                    adapter,
                }),
                None => {
                    tracing::warn!(source = %platform, "no adapter registered; skipping source");
                    progress.step(format!("{platform}: {}", SkipReason::AdapterUnavailable), sink);
                    skipped.push(SkippedSource {
                        platform,
                        reason: SkipReason::AdapterUnavailable,
                        detail: None,
                    });
                }
            }
        }

        let mut sources = self.retrieve_all(jobs, request, &progress, &mut skipped).await;

        tracker.advance(RunState::ComputingMetrics);
        progress.start_phase(RunState::ComputingMetrics, sink);
        for source in &mut sources {
            attach_metrics(source, &self.settings.metrics);
        }
        let aggregate = aggregate(&sources, &self.settings.metrics);
        progress.step(
            format!("metrics computed for {} sources", aggregate.sources_analyzed),
            sink,
        );

        let analysis = if request.ai_enabled {
            tracker.advance(RunState::AnalyzingAi);
            progress.start_phase(RunState::AnalyzingAi, sink);
            let analysis = match &self.analyzer {
                Some(analyzer) => analyze_comments(analyzer.as_ref(), &sources).await,
                None => {
                    tracing::warn!("comment analysis requested but no analyzer is configured");
                    BTreeMap::new()
                }
            };
            progress.step(format!("comments analyzed for {} sources", analysis.len()), sink);
            Some(analysis)
        } else {
            None
        };

        tracker.advance(RunState::Persisting);
        progress.start_phase(RunState::Persisting, sink);
        let report = RunReport {
            brand: request.brand.clone(),
            profile_refs,
            sources,
            aggregate,
            analysis,
            skipped,
            started_at,
            finished_at: Utc::now(),
        };

        let run_id = match self.store.save(&report).await {
            Ok(id) => id,
            Err(e) => {
                tracker.advance(RunState::Failed);
                tracing::error!(error = %e, "failed to persist analysis");
                return Err(PipelineError::Persistence(e));
            }
        };
        progress.step(format!("analysis saved as {run_id}"), sink);
        tracker.advance(RunState::Done);

        if !report.skipped.is_empty() {
            tracing::warn!(
                skipped = report.skipped.len(),
                produced = report.sources.len(),
                "run finished with missing sources"
            );
        }
        tracing::info!(
            run_id = %run_id,
            sources_analyzed = report.aggregate.sources_analyzed,
            total_posts = report.aggregate.total_posts,
            "analysis run complete"
        );

        Ok(RunOutcome { run_id, report })
    }

    /// Pick one profile reference per requested source, manual first, then
    /// the resolver's first candidate. Only sources with a registered adapter
    /// are searched. Returns targets in request order plus a skip record for
    /// every source left without one.
    async fn discover(&self, request: &AnalysisRequest) -> (Vec<(Platform, String)>, Vec<SkippedSource>) {
        let mut refs: BTreeMap<Platform, String> = BTreeMap::new();
        for (platform, profile_ref) in &request.manual_refs {
            let trimmed = profile_ref.trim();
            if !request.sources.contains(platform) {
                tracing::debug!(source = %platform, "ignoring manual reference for unrequested source");
            } else if !trimmed.is_empty() {
                refs.insert(*platform, trimmed.to_string());
            }
        }

        let missing: Vec<Platform> = request
            .sources
            .iter()
            .copied()
            .filter(|p| !refs.contains_key(p) && self.registry.get(*p).is_some())
            .collect();

        if request.discover && !missing.is_empty() {
            match &self.resolver {
                Some(resolver) => match resolver.resolve(&request.brand, &missing).await {
                    Ok(found) => {
                        for platform in &missing {
                            if let Some(first) = found.get(platform).and_then(|c| c.first()) {
                                tracing::info!(source = %platform, profile_ref = %first, "profile discovered");
                                refs.insert(*platform, first.clone());
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "profile discovery failed; using manual references only");
                    }
                },
                None => tracing::warn!("discovery requested but no profile resolver is configured"),
            }
        }

        let mut targets = Vec::new();
        let mut skipped = Vec::new();
        for platform in &request.sources {
            if let Some(profile_ref) = refs.remove(platform) {
                targets.push((*platform, profile_ref));
            } else if self.registry.get(*platform).is_none() {
                tracing::warn!(source = %platform, "no adapter registered; skipping source");
                skipped.push(SkippedSource {
                    platform: *platform,
                    reason: SkipReason::AdapterUnavailable,
                    detail: None,
                });
            } else {
                tracing::warn!(source = %platform, "no profile reference resolved; skipping source");
                skipped.push(SkippedSource {
                    platform: *platform,
                    reason: SkipReason::TargetUnresolved,
                    detail: None,
                });
            }
        }
        (targets, skipped)
    }

    /// Retrieve every job on a bounded pool and return the successes in
    /// registration order. Failures become skip records.
    async fn retrieve_all(
        &self,
        jobs: Vec<RetrievalJob>,
        request: &AnalysisRequest,
        progress: &PhaseProgress,
        skipped: &mut Vec<SkippedSource>,
    ) -> Vec<SourceResult> {
        let sink = self.progress.as_ref();
        let max_concurrent = self.settings.max_concurrent_sources.max(1);

        let mut settled: Vec<(usize, Platform, Result<SourceResult, ScraperError>)> =
            stream::iter(jobs)
                .map(|job| {
                    let span = tracing::info_span!(
                        "source",
                        source = %job.platform,
                        profile_ref = %job.profile_ref
                    );
                    async move {
                        let result = self
                            .retrieve_source(job.adapter.as_ref(), job.platform, &job.profile_ref, request)
                            .await;
                        let note = match &result {
                            Ok(source) => format!("{}: {} items", job.platform, source.items.len()),
                            Err(_) => format!("{}: {}", job.platform, SkipReason::RetrievalFailed),
                        };
                        progress.step(note, sink);
                        (job.order, job.platform, result)
                    }
                    .instrument(span)
                })
                .buffer_unordered(max_concurrent)
                .collect()
                .await;

        settled.sort_by_key(|(order, _, _)| *order);

        let mut sources = Vec::with_capacity(settled.len());
        for (_, platform, result) in settled {
            match result {
                Ok(source) => sources.push(source),
                Err(e) => {
                    tracing::error!(source = %platform, error = %e, "source abandoned");
                    skipped.push(SkippedSource {
                        platform,
                        reason: SkipReason::RetrievalFailed,
                        detail: Some(e.to_string()),
                    });
                }
            }
        }
        sources
    }

    /// Items, then comments item by item. Any exhausted call abandons the
    /// whole source.
    async fn retrieve_source(
        &self,
        adapter: &dyn SourceAdapter,
        platform: Platform,
        profile_ref: &str,
        request: &AnalysisRequest,
    ) -> Result<SourceResult, ScraperError> {
        let policy = &self.settings.retry;
        let sleeper = self.sleeper.as_ref();

        let description = format!("{platform} items for {profile_ref}");
        let fetched = run_with_retry(
            || adapter.fetch_items(profile_ref, request.max_items),
            policy,
            &description,
            sleeper,
        )
        .await;
        self.limiter.throttle(platform).await;
        let mut items = fetched?;
        tracing::info!(items = items.len(), "items retrieved");

        if request.max_comments > 0 {
            for item in &mut items {
                let item_ref = item.url.clone();
                let description = format!("{platform} comments for {item_ref}");
                let fetched = run_with_retry(
                    || adapter.fetch_comments(&item_ref, request.max_comments),
                    policy,
                    &description,
                    sleeper,
                )
                .await;
                self.limiter.throttle(platform).await;
                item.comments = fetched?;
            }
        }

        let result = SourceResult::new(platform, profile_ref, items);
        tracing::info!(
            items = result.items.len(),
            comments = result.retrieved_comment_count(),
            "source retrieved"
        );
        Ok(result)
    }
}

/// Analyzer failures fall back to an empty analysis for that source.
async fn analyze_comments(
    analyzer: &dyn CommentAnalyzer,
    sources: &[SourceResult],
) -> BTreeMap<Platform, CommentAnalysis> {
    let mut analysis = BTreeMap::new();
    for source in sources {
        let contexts = CommentContext::from_items(&source.items);
        if contexts.is_empty() {
            tracing::debug!(source = %source.platform, "no comments to analyze");
            continue;
        }
        let result = match analyzer.analyze(&contexts, source.platform).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    source = %source.platform,
                    error = %e,
                    "comment analysis failed; recording empty analysis"
                );
                CommentAnalysis::empty()
            }
        };
        analysis.insert(source.platform, result);
    }
    analysis
}
