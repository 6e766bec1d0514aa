// =============================================================================
// Average True Range (ATR): simple rolling mean
// =============================================================================
//
// True Range (TR) for each bar:
//   TR_0 = H - L                                  (no previous close)
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR_t is the plain mean of the last `period` TR values.  The first
// `period - 1` bars have no full window and report 0.
//
// Default period: 14
// =============================================================================

use crate::market_data::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

/// True range per bar, one value per input bar.
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            match i.checked_sub(1).map(|p| bars[p].close) {
                Some(prev_close) => hl
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs()),
                None => hl,
            }
        })
        .collect()
}

/// Compute the ATR series for `bars` (oldest first).
///
/// # Edge cases
/// - `period == 0` => all zeros
/// - indices `0..period - 1` => 0.0 (warm-up)
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<f64> {
    let mut result = vec![0.0; bars.len()];
    if period == 0 || bars.len() < period {
        return result;
    }

    let tr = true_range(bars);
    let period_f = period as f64;
    for (i, window) in tr.windows(period).enumerate() {
        result[i + period - 1] = window.iter().sum::<f64>() / period_f;
    }

    result
}

/// Convenience: most recent ATR with the standard 14-period default.
pub fn calculate(bars: &[PriceBar]) -> Option<f64> {
    calculate_atr(bars, DEFAULT_PERIOD).last().copied()
}

/// Bars needed before ATR has a full window.
pub fn min_bars(period: usize) -> usize {
    period.max(1)
}
