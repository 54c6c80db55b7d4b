//! `analyze` command: wire the Apify-backed collaborators into an
//! orchestrator, run it, and print a summary.

use std::collections::BTreeMap;
use std::sync::Arc;

use brandlens_core::{AppConfig, Platform, RunReport};
use brandlens_pipeline::{AnalysisRequest, Orchestrator, PipelineSettings};
use brandlens_scraper::{
    apify_registry, ApifyClient, ApifySearchResolver, RateLimiter, Sleeper, TokioSleeper,
};
use brandlens_sentiment::LexiconAnalyzer;
use brandlens_store::JsonFileStore;

use crate::AnalyzeArgs;

/// Merge command-line arguments, the optional targets file, and config
/// defaults into a request. `--manual` wins over the targets file.
pub(crate) fn build_request(
    config: &AppConfig,
    args: AnalyzeArgs,
) -> anyhow::Result<AnalysisRequest> {
    let targets = args
        .targets
        .as_deref()
        .map(brandlens_core::load_targets)
        .transpose()?;

    let brand = match (args.brand, &targets) {
        (Some(brand), _) => brand,
        (None, Some(targets)) => targets.brand.clone(),
        (None, None) => anyhow::bail!("a brand is required: pass --brand or --targets"),
    };
    if brand.trim().is_empty() {
        anyhow::bail!("brand must not be empty");
    }

    let mut manual: BTreeMap<Platform, String> =
        targets.map(|t| t.sources).unwrap_or_default();
    manual.extend(args.manual);

    let sources = if args.sources.is_empty() {
        Platform::ALL.to_vec()
    } else {
        args.sources
    };

    let mut request = AnalysisRequest::new(brand.trim(), sources)
        .with_discovery(!args.no_discovery)
        .with_ai(args.ai || config.ai_enabled)
        .with_limits(
            args.max_items.unwrap_or(config.max_items),
            args.max_comments.unwrap_or(config.max_comments),
        );
    for (platform, profile_ref) in manual {
        request = request.with_manual_ref(platform, profile_ref);
    }
    Ok(request)
}

/// Run one analysis and print what it produced.
///
/// # Errors
///
/// Returns an error if `APIFY_TOKEN` is unset, the request is invalid, no
/// source could be resolved, or the result cannot be saved.
pub(crate) async fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let token = config
        .apify_token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("APIFY_TOKEN is not set; it is required for analyze"))?;
    let request = build_request(config, args)?;

    let client = Arc::new(ApifyClient::new(
        token,
        config.request_timeout_secs,
        config.retry.call_timeout().as_secs(),
        &config.user_agent,
    )?);
    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
    let resolver = ApifySearchResolver::new(
        Arc::clone(&client),
        RateLimiter::new(config.rate_limits, Arc::clone(&sleeper)),
    );

    let orchestrator = Orchestrator::builder(
        apify_registry(&client),
        Arc::new(JsonFileStore::new(&config.storage_dir)),
    )
    .resolver(Arc::new(resolver))
    .analyzer(Arc::new(LexiconAnalyzer::new()))
    .sleeper(sleeper)
    .settings(PipelineSettings::from_app_config(config))
    .build();

    let outcome = orchestrator.run(&request).await?;
    print_summary(&outcome.report);
    println!("saved as {}", outcome.run_id);
    Ok(())
}

fn print_summary(report: &RunReport) {
    let aggregate = &report.aggregate;
    println!("brand: {}", report.brand);
    println!(
        "sources analyzed: {}  posts: {}  likes: {}  comments: {}  views: {}",
        aggregate.sources_analyzed,
        aggregate.total_posts,
        aggregate.total_likes,
        aggregate.total_comments,
        aggregate.total_views
    );

    println!();
    println!("{:<12}{:<8}{:<12}{:<12}PROFILE", "SOURCE", "POSTS", "ENGAGEMENT", "LEVEL");
    for source in &report.sources {
        let rate = format!("{:.2}%", source.metrics.avg_engagement_rate);
        let level = source.metrics.performance.to_string();
        println!(
            "{:<12}{:<8}{rate:<12}{level:<12}{}",
            source.platform.as_str(),
            source.metrics.total_posts,
            source.profile_ref
        );
    }

    if let Some(best) = aggregate.best_performing {
        println!("\nbest performing: {best}");
    }
    if !aggregate.top_hashtags_global.is_empty() {
        let tags: Vec<String> = aggregate
            .top_hashtags_global
            .iter()
            .take(5)
            .map(|h| format!("#{} ({})", h.tag, h.count))
            .collect();
        println!("top hashtags: {}", tags.join(", "));
    }

    if let Some(analysis) = &report.analysis {
        for (platform, result) in analysis {
            let s = &result.sentiment;
            println!(
                "{platform} sentiment: {:.1}% positive, {:.1}% neutral, {:.1}% negative ({} comments)",
                s.positive_pct, s.neutral_pct, s.negative_pct, result.total_analyzed
            );
        }
    }

    for skip in &report.skipped {
        let detail = skip
            .detail
            .as_deref()
            .map(|d| format!(": {d}"))
            .unwrap_or_default();
        eprintln!("warning: {} missing ({}){detail}", skip.platform, skip.reason);
    }
}
