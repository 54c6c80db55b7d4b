mod analyze;
mod history;

use std::path::PathBuf;

use brandlens_core::Platform;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "brandlens")]
#[command(about = "Social media analytics for brands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Retrieve, measure, and store a brand's social content
    Analyze(AnalyzeArgs),
    /// List stored analyses, newest first
    List {
        /// Only analyses for this brand (case-insensitive)
        #[arg(long)]
        brand: Option<String>,

        /// Maximum entries; 0 lists all
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print a stored analysis as JSON
    Show { id: String },
    /// Delete a stored analysis
    Delete { id: String },
}

#[derive(Debug, Args)]
pub(crate) struct AnalyzeArgs {
    /// Brand name; falls back to the targets file
    #[arg(long)]
    brand: Option<String>,

    /// Source to analyze; repeat for several. Defaults to every platform
    #[arg(long = "source", value_name = "PLATFORM")]
    sources: Vec<Platform>,

    /// YAML file with a brand and manual profile references
    #[arg(long, value_name = "FILE")]
    targets: Option<PathBuf>,

    /// Manual profile reference, e.g. `instagram=https://www.instagram.com/acme`
    #[arg(long = "manual", value_name = "PLATFORM=URL", value_parser = parse_manual_ref)]
    manual: Vec<(Platform, String)>,

    /// Use only manual references
    #[arg(long)]
    no_discovery: bool,

    /// Run comment analysis
    #[arg(long)]
    ai: bool,

    /// Items per source (default from BRANDLENS_MAX_ITEMS)
    #[arg(long)]
    max_items: Option<usize>,

    /// Comments per item (default from BRANDLENS_MAX_COMMENTS)
    #[arg(long)]
    max_comments: Option<usize>,
}

fn parse_manual_ref(raw: &str) -> Result<(Platform, String), String> {
    let (platform, url) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PLATFORM=URL, got '{raw}'"))?;
    let platform: Platform = platform.parse().map_err(|e| format!("{e}"))?;
    let url = url.trim();
    if url.is_empty() {
        return Err(format!("empty url for {platform}"));
    }
    Ok((platform, url.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = brandlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Analyze(args) => analyze::run_analyze(&config, args).await,
        Commands::List { brand, limit } => {
            history::run_list(&config, brand.as_deref(), limit).await
        }
        Commands::Show { id } => history::run_show(&config, &id).await,
        Commands::Delete { id } => history::run_delete(&config, &id).await,
    }
}
