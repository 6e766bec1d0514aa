use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLC bar for one instrument at one sampling interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Check the price fields of this bar; `index` is only used for the error.
    fn validate(&self, index: usize) -> Result<()> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AnalysisError::invalid_bar(index, format!("{name} is not finite")));
            }
            if value <= 0.0 {
                return Err(AnalysisError::invalid_bar(index, format!("{name} is not positive")));
            }
        }
        if self.high < self.low {
            return Err(AnalysisError::invalid_bar(
                index,
                format!("high {} below low {}", self.high, self.low),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, ascending sequence of bars
// ---------------------------------------------------------------------------

/// Ordered bars for one instrument at one fixed interval.
///
/// Construction is the only validation point: once a `PriceSeries` exists its
/// bars are finite, positive and strictly increasing in time, so indicator
/// code never has to re-check them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars that are already oldest-first.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate(i)?;
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(AnalysisError::NonMonotonicTimestamp { index: i });
            }
        }
        Ok(Self { bars })
    }

    /// Sort by timestamp first, then validate. Upstream feeds usually deliver
    /// newest-first.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Result<Self> {
        bars.sort_by_key(|b| b.timestamp);
        Self::new(bars)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The most recent bar that is known to be complete: the second-to-last
    /// one, since the last bar may still be forming.
    pub fn completed_prior(&self) -> Option<&PriceBar> {
        self.bars.len().checked_sub(2).map(|i| &self.bars[i])
    }
}
