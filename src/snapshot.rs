// =============================================================================
// Technical Snapshot: one reading of the indicator stack per pair
// =============================================================================
//
// Intraday bars drive momentum and oscillators; daily bars drive pivots and
// volatility:
//   close, EMA20, EMA50, RSI14, MACD histogram  <- intraday closes
//   pivots                                     <- last *completed* daily bar
//   ATR14                                      <- full daily series
//
// This is the single place that rejects series too short to be meaningful.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::indicators::{atr, ema, macd, rsi, PivotSet};
use crate::market_data::PriceSeries;

pub const EMA_FAST_SPAN: usize = 20;
pub const EMA_SLOW_SPAN: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;

/// Indicator readings for one pair at one generation instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSnapshot {
    pub close: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub rsi14: f64,
    pub macd_hist: f64,
    pub atr14: f64,
    pub pivots: PivotSet,
}

/// Intraday bars required: the longest of EMA50, RSI14 and MACD(26, 9).
pub fn min_intraday_bars() -> usize {
    ema::min_bars(EMA_FAST_SPAN)
        .max(ema::min_bars(EMA_SLOW_SPAN))
        .max(rsi::min_bars(RSI_PERIOD))
        .max(macd::min_bars(macd::DEFAULT_SLOW, macd::DEFAULT_SIGNAL))
}

/// Daily bars required: a full ATR14 window and a completed prior day.
pub fn min_daily_bars() -> usize {
    atr::min_bars(ATR_PERIOD).max(2)
}

impl TechSnapshot {
    /// Build the snapshot from an intraday and a daily series of one pair.
    ///
    /// Fails with `InsufficientHistory` when either series is shorter than
    /// the indicator stack needs.
    pub fn build(intraday: &PriceSeries, daily: &PriceSeries) -> Result<Self> {
        let need_intraday = min_intraday_bars();
        if intraday.len() < need_intraday {
            return Err(AnalysisError::insufficient_history(
                "intraday",
                need_intraday,
                intraday.len(),
            ));
        }
        let need_daily = min_daily_bars();
        if daily.len() < need_daily {
            return Err(AnalysisError::insufficient_history("daily", need_daily, daily.len()));
        }

        let closes = intraday.closes();
        let last = |series: Vec<f64>| series.last().copied().unwrap_or_default();

        let close = last(closes.clone());
        let ema20 = last(ema::calculate_ema(&closes, EMA_FAST_SPAN));
        let ema50 = last(ema::calculate_ema(&closes, EMA_SLOW_SPAN));
        let rsi14 = last(rsi::calculate_rsi(&closes, RSI_PERIOD));
        let macd_hist = macd::calculate(&closes).last_histogram().unwrap_or_default();

        // The last daily bar is still forming; pivots come from the one before.
        let prior = daily
            .completed_prior()
            .ok_or_else(|| AnalysisError::insufficient_history("daily", 2, daily.len()))?;
        let pivots = PivotSet::classic(prior.high, prior.low, prior.close);
        let atr14 = last(atr::calculate_atr(daily.bars(), ATR_PERIOD));

        debug!(
            close,
            ema50,
            rsi14 = format!("{rsi14:.2}"),
            macd_hist,
            atr14,
            pivot = pivots.p,
            "technical snapshot built"
        );

        Ok(Self {
            close,
            ema20,
            ema50,
            rsi14,
            macd_hist,
            atr14,
            pivots,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceBar;
    use chrono::{Duration, TimeZone, Utc};

    fn intraday(closes: &[f64]) -> PriceSeries {
        let origin = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(origin + Duration::minutes(5 * i as i64), c, c + 0.0005, c - 0.0005, c))
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn daily(hlc: &[(f64, f64, f64)]) -> PriceSeries {
        let origin = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let bars = hlc
            .iter()
            .enumerate()
            .map(|(i, &(h, l, c))| PriceBar::new(origin + Duration::days(i as i64), c, h, l, c))
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    fn rising_intraday(n: usize) -> PriceSeries {
        intraday(&(0..n).map(|i| 1.1000 + i as f64 * 0.0001).collect::<Vec<_>>())
    }

    fn flat_daily(n: usize) -> Vec<(f64, f64, f64)> {
        vec![(1.1050, 1.0950, 1.1000); n]
    }

    #[test]
    fn minimum_windows() {
        assert_eq!(min_intraday_bars(), 50);
        assert_eq!(min_daily_bars(), 14);
    }

    #[test]
    fn rejects_short_intraday_series() {
        let err = TechSnapshot::build(&rising_intraday(49), &daily(&flat_daily(20))).unwrap_err();
        assert_eq!(err, AnalysisError::insufficient_history("intraday", 50, 49));
    }

    #[test]
    fn rejects_short_daily_series() {
        let err = TechSnapshot::build(&rising_intraday(60), &daily(&flat_daily(13))).unwrap_err();
        assert_eq!(err, AnalysisError::insufficient_history("daily", 14, 13));
    }

    #[test]
    fn pivots_come_from_second_to_last_daily_bar() {
        let mut hlc = flat_daily(20);
        let n = hlc.len();
        hlc[n - 2] = (1.1000, 1.0900, 1.0950);
        hlc[n - 1] = (1.2000, 1.0000, 1.1500); // still forming, must be ignored
        let snap = TechSnapshot::build(&rising_intraday(60), &daily(&hlc)).unwrap();
        assert_eq!(snap.pivots, PivotSet::classic(1.1000, 1.0900, 1.0950));
    }

    #[test]
    fn atr_covers_full_daily_series_including_last_bar() {
        let mut hlc = flat_daily(14);
        let snap_flat = TechSnapshot::build(&rising_intraday(60), &daily(&hlc)).unwrap();
        assert!((snap_flat.atr14 - 0.0100).abs() < 1e-12);

        hlc[13] = (1.1150, 1.0950, 1.1100); // TR 0.02 on the forming bar
        let snap = TechSnapshot::build(&rising_intraday(60), &daily(&hlc)).unwrap();
        assert!((snap.atr14 - (0.0100 * 13.0 + 0.0200) / 14.0).abs() < 1e-12);
    }

    #[test]
    fn intraday_readings_use_last_values() {
        let series = rising_intraday(80);
        let closes = series.closes();
        let snap = TechSnapshot::build(&series, &daily(&flat_daily(20))).unwrap();

        assert_eq!(snap.close, *closes.last().unwrap());
        assert_eq!(snap.ema20, *ema::calculate_ema(&closes, 20).last().unwrap());
        assert_eq!(snap.ema50, *ema::calculate_ema(&closes, 50).last().unwrap());
        assert_eq!(snap.rsi14, 100.0);
        assert!(snap.close > snap.ema20 && snap.ema20 > snap.ema50);
        assert!(snap.macd_hist.is_finite());
    }
}
