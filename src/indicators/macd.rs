// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd_line   = EMA(fast) - EMA(slow)
//   signal_line = EMA(macd_line, signal)
//   histogram   = macd_line - signal_line
//
// All three series are aligned one-per-input-bar because the underlying EMA
// is seeded from the first value.
// =============================================================================

use super::ema::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// The three MACD series, each the same length as the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    /// Most recent histogram value, if the input was non-empty.
    pub fn last_histogram(&self) -> Option<f64> {
        self.histogram.last().copied()
    }
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = calculate_ema(&line, signal);
    let histogram = line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}

/// MACD with the conventional 12 / 26 / 9 spans.
pub fn calculate(closes: &[f64]) -> Macd {
    calculate_macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// Bars needed for the slow EMA and the signal EMA to both see a full span.
pub fn min_bars(slow: usize, signal: usize) -> usize {
    slow + signal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty_input() {
        let macd = calculate(&[]);
        assert!(macd.line.is_empty());
        assert!(macd.last_histogram().is_none());
    }

    #[test]
    fn macd_series_are_aligned() {
        let closes: Vec<f64> = (0..80).map(|i| 1.1 + (i as f64 * 0.3).sin() * 0.01).collect();
        let macd = calculate(&closes);
        assert_eq!(macd.line.len(), closes.len());
        assert_eq!(macd.signal.len(), closes.len());
        assert_eq!(macd.histogram.len(), closes.len());
        for i in 0..closes.len() {
            assert!((macd.histogram[i] - (macd.line[i] - macd.signal[i])).abs() < 1e-15);
        }
    }

    #[test]
    fn macd_first_bar_is_zero() {
        // Both EMAs and the signal start at the first value.
        let macd = calculate(&[1.25, 1.26, 1.27]);
        assert_eq!(macd.line[0], 0.0);
        assert_eq!(macd.histogram[0], 0.0);
    }

    #[test]
    fn macd_matches_hand_computed_ema_difference() {
        let closes = [1.0, 2.0, 4.0];
        let macd = calculate_macd(&closes, 1, 3, 1);
        // fast span 1 == input, slow span 3 => multiplier 0.5: 1, 1.5, 2.75
        assert!((macd.line[1] - 0.5).abs() < 1e-12);
        assert!((macd.line[2] - 1.25).abs() < 1e-12);
        // signal span 1 == macd line, so histogram is flat zero
        assert!(macd.histogram.iter().all(|&h| h == 0.0));
    }

    #[test]
    fn macd_histogram_positive_on_accelerating_rally() {
        let closes: Vec<f64> = (0..60).map(|i| 1.0 + (i as f64).powi(2) * 1e-4).collect();
        assert!(calculate(&closes).last_histogram().unwrap() > 0.0);
    }

    #[test]
    fn min_bars_is_slow_plus_signal() {
        assert_eq!(min_bars(DEFAULT_SLOW, DEFAULT_SIGNAL), 35);
    }
}
