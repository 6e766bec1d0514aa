// =============================================================================
// Relative Strength Index (RSI): simple rolling means
// =============================================================================
//
// Step 1 - Price changes (deltas) from consecutive closes.
// Step 2 - Mean gain / mean loss over the last `period` deltas (plain rolling
//          mean, not Wilder's smoothing).
// Step 3 - RS  = mean_gain / mean_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Policy:
//   - The first `period` closes have no full window of deltas: RSI = 0.
//   - A window with zero mean loss yields RSI = 100.
// =============================================================================

/// Compute the RSI series for `closes`, one value per close.
///
/// # Edge cases
/// - `period == 0` or empty input => all zeros (same length as input)
/// - indices `0..period` => 0.0 (warm-up)
/// - zero mean loss in a full window => 100.0
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![0.0; closes.len()];
    if period == 0 || closes.len() <= period {
        return result;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let period_f = period as f64;

    // Close index `i` owns deltas[i - period .. i] (delta k sits between
    // closes k and k + 1).
    for i in period..closes.len() {
        let (sum_gain, sum_loss) = deltas[i - period..i].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });
        result[i] = rsi_from_means(sum_gain / period_f, sum_loss / period_f);
    }

    result
}

/// Bars needed before RSI produces a value from a full window.
pub fn min_bars(period: usize) -> usize {
    period + 1
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert mean gain / mean loss into an RSI value in [0, 100].
fn rsi_from_means(mean_gain: f64, mean_loss: f64) -> f64 {
    if mean_loss == 0.0 {
        return 100.0;
    }
    let rs = mean_gain / mean_loss;
    100.0 - 100.0 / (1.0 + rs)
}
