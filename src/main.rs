// =============================================================================
// FX Session Feed: Main Entry Point
// =============================================================================
//
// One run produces one feed item: headlines, a technical snapshot and a trade
// setup per configured pair, appended to the rolling item store and
// republished as RSS.
// =============================================================================

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fx_session_feed::feed::{self, FeedItem, ItemStore};
use fx_session_feed::headlines::HeadlineClient;
use fx_session_feed::market_data::AlphaVantageClient;
use fx_session_feed::report;
use fx_session_feed::runtime_config::FeedConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate an FX session plan and publish it as an RSS item")]
struct Cli {
    /// JSON feed configuration (pairs, headline sources, feed metadata)
    #[arg(long, default_value = "config/feed.json")]
    config: PathBuf,

    /// RSS output path
    #[arg(long, default_value = "feed.xml")]
    out: PathBuf,

    /// Rolling item store
    #[arg(long, default_value = "data/items.json")]
    itemsdb: PathBuf,

    /// Write the default configuration to --config and exit
    #[arg(long, default_value_t = false)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.init_config {
        if let Some(dir) = cli.config.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        FeedConfig::default().save(&cli.config)?;
        info!(path = %cli.config.display(), "Default config written");
        return Ok(());
    }

    let config = FeedConfig::load(&cli.config).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load feed config, using defaults");
        FeedConfig::default()
    });
    info!(pairs = ?config.pairs.iter().map(ToString::to_string).collect::<Vec<_>>(), "Configured pairs");

    // The key is read here and only here; everything below receives it
    // explicitly.
    let api_key = std::env::var("ALPHAVANTAGE_API_KEY").unwrap_or_default();
    if api_key.trim().is_empty() {
        warn!("ALPHAVANTAGE_API_KEY is not set; market data requests will fail");
    }

    // ── 2. Clients ───────────────────────────────────────────────────────
    let market = AlphaVantageClient::new(api_key, config.http_timeout())?;
    let news = HeadlineClient::new(config.http_timeout())?;

    // ── 3. Headlines + per-pair setups ───────────────────────────────────
    let now = chrono::Utc::now();
    let headlines = news
        .fetch_headlines(
            config.source_urls(),
            config.headlines_per_source,
            config.headline_limit,
        )
        .await;

    let report = report::build_report(&market, &config, headlines, now)
        .await
        .context("failed to build session report")?;

    // ── 4. Persist and publish ───────────────────────────────────────────
    let mut store = ItemStore::load(&cli.itemsdb)?;
    store.push(FeedItem::from_report(&report, &config.feed_link), config.max_items);
    store.save(&cli.itemsdb)?;

    let xml = feed::render_rss(&config, &store)?;
    feed::write_feed(&cli.out, &xml)?;

    info!(
        out = %cli.out.display(),
        session = %report.session,
        "Wrote RSS feed"
    );
    Ok(())
}
