// =============================================================================
// Feed Configuration: pairs, headline sources and feed metadata
// =============================================================================
//
// Loaded from JSON.  All fields carry `#[serde(default)]` so that a partial or
// empty file still yields a working configuration.  The market-data API key is
// not part of this file: `main` reads it from the environment.
//
// Persistence uses an atomic tmp + rename pattern.
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::CurrencyPair;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_pairs() -> Vec<CurrencyPair> {
    vec![
        CurrencyPair::new("EUR", "USD"),
        CurrencyPair::new("GBP", "USD"),
        CurrencyPair::new("USD", "JPY"),
    ]
}

fn default_intraday_interval() -> String {
    "5min".to_string()
}

fn default_headline_limit() -> usize {
    6
}

fn default_headlines_per_source() -> usize {
    2
}

fn default_max_items() -> usize {
    60
}

fn default_feed_title() -> String {
    "FX Session Feed".to_string()
}

fn default_feed_link() -> String {
    "https://example.com/fx-session-feed".to_string()
}

fn default_feed_description() -> String {
    "Automated EUR/USD, GBP/USD, USD/JPY session plans".to_string()
}

fn default_feed_language() -> String {
    "en-us".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

// =============================================================================
// FeedConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    // --- Market data ---------------------------------------------------------

    /// Pairs to analyse, in report order.
    #[serde(default = "default_pairs")]
    pub pairs: Vec<CurrencyPair>,

    /// Alpha Vantage intraday interval ("1min", "5min", "15min", ...).
    #[serde(default = "default_intraday_interval")]
    pub intraday_interval: String,

    /// Timeout applied to every HTTP request.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    // --- Headlines -----------------------------------------------------------

    /// RSS sources grouped by label, e.g. `{"macro": ["https://..."]}`.
    #[serde(default)]
    pub headline_sources: BTreeMap<String, Vec<String>>,

    /// Maximum headlines in one report after de-duplication.
    #[serde(default = "default_headline_limit")]
    pub headline_limit: usize,

    /// Items taken from the top of each source.
    #[serde(default = "default_headlines_per_source")]
    pub headlines_per_source: usize,

    // --- Feed ----------------------------------------------------------------

    /// Items kept in the rolling store and the published feed (0 = no cap).
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    #[serde(default = "default_feed_title")]
    pub feed_title: String,

    #[serde(default = "default_feed_link")]
    pub feed_link: String,

    #[serde(default = "default_feed_description")]
    pub feed_description: String,

    #[serde(default = "default_feed_language")]
    pub feed_language: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            pairs: default_pairs(),
            intraday_interval: default_intraday_interval(),
            http_timeout_secs: default_http_timeout_secs(),
            headline_sources: BTreeMap::new(),
            headline_limit: default_headline_limit(),
            headlines_per_source: default_headlines_per_source(),
            max_items: default_max_items(),
            feed_title: default_feed_title(),
            feed_link: default_feed_link(),
            feed_description: default_feed_description(),
            feed_language: default_feed_language(),
        }
    }
}

impl FeedConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or malformed file is an error so the caller can fall back to
    /// defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feed config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse feed config from {}", path.display()))?;

        info!(
            path = %path.display(),
            pairs = config.pairs.len(),
            sources = config.source_urls().count(),
            "feed config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise feed config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "feed config saved (atomic)");
        Ok(())
    }

    /// Every headline URL, group by group.
    pub fn source_urls(&self) -> impl Iterator<Item = &str> {
        self.headline_sources.values().flatten().map(String::as_str)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
