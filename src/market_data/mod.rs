pub mod alpha_vantage;
pub mod price_series;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::CurrencyPair;

// Re-export the series types for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use alpha_vantage::AlphaVantageClient;
pub use price_series::{PriceBar, PriceSeries};

/// Anything that can hand the pipeline an intraday and a daily series for a
/// pair: the Alpha Vantage client in production, fixtures in tests.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn intraday(&self, pair: &CurrencyPair, interval: &str) -> Result<PriceSeries>;

    async fn daily(&self, pair: &CurrencyPair) -> Result<PriceSeries>;
}
