//! CLI definition, tracing setup, and the job entry point.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};

use storyfeed_core::{Pipeline, RunSummary};
use storyfeed_crawler::Crawler;
use storyfeed_rewriter::GeminiRewriter;
use storyfeed_shared::{AppConfig, load_config, load_config_from, validate_api_key};
use storyfeed_source::HackerNewsSource;
use storyfeed_storage::JsonFileStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// storyfeed: rewrite today's top Hacker News stories into another language.
#[derive(Parser)]
#[command(
    name = "storyfeed",
    version,
    about = "Fetch, crawl, and rewrite the current Hacker News top stories into a JSON record set.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.storyfeed/storyfeed.toml).
    #[arg(short, long, env = "STORYFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "storyfeed=info",
        1 => "storyfeed=debug",
        _ => "storyfeed=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Load config, wire the collaborators, and run the pipeline once.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("loading config from {}", path.display()))?,
        None => load_config()?,
    };
    let api_key = validate_api_key(&config)?;

    let summary = run_pipeline(&config, api_key).await?;
    print_summary(&config, &summary);
    Ok(())
}

async fn run_pipeline(config: &AppConfig, api_key: String) -> Result<RunSummary> {
    let source = HackerNewsSource::new(&config.source)?;
    let crawler = Crawler::new(&config.crawl)?;
    let rewriter = GeminiRewriter::new(&config.gemini, api_key, config.pipeline.title_label())?;
    let store = JsonFileStore::new(&config.store.path);

    info!(
        store = %store.path().display(),
        model = %config.gemini.model,
        language = %config.pipeline.target_language,
        "starting run"
    );

    let pipeline = Pipeline::new(&config.pipeline, &source, &crawler, &rewriter, &store);
    let summary = pipeline
        .run()
        .await
        .wrap_err_with(|| format!("saving {}", store.path().display()))?;

    if summary.ranking_unavailable {
        warn!("no ranking this run; record set left as it was");
    }
    Ok(summary)
}

fn print_summary(config: &AppConfig, summary: &RunSummary) {
    println!();
    println!("  Ranked:    {}", summary.ranked);
    println!("  New:       {}", summary.new_ids);
    println!("  Processed: {}", summary.processed);
    println!("  Persisted: {}", summary.persisted);
    println!(
        "  Store:     {}{}",
        config.store.path.display(),
        if summary.saved { "" } else { " (unchanged)" }
    );
    println!();
}
