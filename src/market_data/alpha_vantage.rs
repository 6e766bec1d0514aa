// =============================================================================
// Alpha Vantage FX Client: intraday and daily OHLC series
// =============================================================================
//
// The API key is handed in by the caller; nothing here reads the environment.
// Every response is parsed by a pure function so the wire format can be tested
// without the network.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, instrument, warn};

use super::{MarketDataSource, PriceBar, PriceSeries};
use crate::types::CurrencyPair;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage REST client for FX time series.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the key.
        f.debug_struct("AlphaVantageClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

impl AlphaVantageClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        debug!(base_url = BASE_URL, "AlphaVantageClient initialised");

        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            base_url: BASE_URL.to_string(),
            client,
        })
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// FX_INTRADAY for `pair` at `interval` (e.g. "5min").
    #[instrument(skip(self, pair), fields(pair = %pair), name = "alpha_vantage::fx_intraday")]
    pub async fn fetch_intraday(&self, pair: &CurrencyPair, interval: &str) -> Result<PriceSeries> {
        let body = self
            .query(&[
                ("function", "FX_INTRADAY"),
                ("from_symbol", pair.base.as_str()),
                ("to_symbol", pair.quote.as_str()),
                ("interval", interval),
                ("outputsize", "compact"),
                ("datatype", "json"),
            ])
            .await?;
        let series = parse_time_series(&body, &format!("Time Series FX ({interval})"))?;
        debug!(bars = series.len(), "intraday series fetched");
        Ok(series)
    }

    /// FX_DAILY for `pair`.
    #[instrument(skip(self, pair), fields(pair = %pair), name = "alpha_vantage::fx_daily")]
    pub async fn fetch_daily(&self, pair: &CurrencyPair) -> Result<PriceSeries> {
        let body = self
            .query(&[
                ("function", "FX_DAILY"),
                ("from_symbol", pair.base.as_str()),
                ("to_symbol", pair.quote.as_str()),
                ("outputsize", "compact"),
                ("datatype", "json"),
            ])
            .await?;
        let series = parse_time_series(&body, "Time Series FX (Daily)")?;
        debug!(bars = series.len(), "daily series fetched");
        Ok(series)
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        if self.api_key.is_empty() {
            anyhow::bail!("missing Alpha Vantage API key");
        }

        let resp = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Alpha Vantage request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Alpha Vantage returned HTTP {status}");
        }

        resp.json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to parse Alpha Vantage response")
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    async fn intraday(&self, pair: &CurrencyPair, interval: &str) -> Result<PriceSeries> {
        self.fetch_intraday(pair, interval).await
    }

    async fn daily(&self, pair: &CurrencyPair) -> Result<PriceSeries> {
        self.fetch_daily(pair).await
    }
}

// -------------------------------------------------------------------------
// Response parsing
// -------------------------------------------------------------------------

/// Parse an Alpha Vantage FX time-series payload.
///
/// Expected shape:
/// ```json
/// { "Meta Data": { ... },
///   "Time Series FX (5min)": {
///     "2025-06-02 14:35:00": { "1. open": "1.1412", "2. high": "1.1415",
///                              "3. low": "1.1409", "4. close": "1.1413" } } }
/// ```
/// Rate-limit and error notes come back as a 200 without the series key, so
/// the body is included in that error.
pub fn parse_time_series(body: &serde_json::Value, key: &str) -> Result<PriceSeries> {
    let Some(rows) = body.get(key).and_then(|v| v.as_object()) else {
        anyhow::bail!("Alpha Vantage response missing {key:?}: {body}");
    };

    let mut bars = Vec::with_capacity(rows.len());
    for (ts, ohlc) in rows {
        let timestamp = parse_timestamp(ts)?;
        bars.push(PriceBar::new(
            timestamp,
            parse_field(ohlc, "1. open", ts)?,
            parse_field(ohlc, "2. high", ts)?,
            parse_field(ohlc, "3. low", ts)?,
            parse_field(ohlc, "4. close", ts)?,
        ));
    }

    let series =
        PriceSeries::from_unsorted(bars).with_context(|| format!("invalid bars in {key:?}"))?;
    if series.is_empty() {
        warn!(key, "Alpha Vantage returned an empty series");
    }
    Ok(series)
}

/// Timestamps are UTC, either "YYYY-MM-DD HH:MM:SS" or a bare "YYYY-MM-DD".
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("unrecognised timestamp {raw:?}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("unrecognised timestamp {raw:?}"))?;
    Ok(midnight.and_utc())
}

/// Prices arrive as JSON strings.
fn parse_field(ohlc: &serde_json::Value, field: &str, ts: &str) -> Result<f64> {
    let raw = ohlc
        .get(field)
        .and_then(|v| v.as_str())
        .with_context(|| format!("missing {field:?} at {ts}"))?;
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("bad {field:?} value {raw:?} at {ts}"))
}
