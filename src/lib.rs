// =============================================================================
// FX Session Feed: library root
// =============================================================================
//
// Core (pure, no I/O):
//   indicators  EMA, RSI, MACD, ATR series and classic pivots
//   snapshot    one technical reading per pair from intraday + daily series
//   strategy    bias vote and entry / stop / target synthesis
//
// Plumbing around the core:
//   market_data validated price series and the Alpha Vantage client
//   headlines, session, report, feed, runtime_config
// =============================================================================

pub mod error;
pub mod feed;
pub mod headlines;
pub mod indicators;
pub mod market_data;
pub mod report;
pub mod runtime_config;
pub mod session;
pub mod snapshot;
pub mod strategy;
pub mod types;

pub use error::AnalysisError;
pub use market_data::{MarketDataSource, PriceBar, PriceSeries};
pub use snapshot::TechSnapshot;
pub use strategy::{build_setup, Setup, TradePlan};
pub use types::{Bias, CurrencyPair, Session};
