// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Formula:
//   multiplier = 2 / (span + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The series is seeded with the first value (no bias correction), so there is
// one output per input and the early values are simply less smoothed.
// =============================================================================

/// Compute the EMA series for `values` with the given `span`.
///
/// Output has the same length as the input. The first `span - 1` values are
/// defined but low-confidence.
///
/// # Edge cases
/// - empty input => empty vec
/// - `span <= 1` => multiplier of 1, i.e. the input is returned unchanged
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let multiplier = 2.0 / (span.max(1) + 1) as f64;

    let mut result = Vec::with_capacity(values.len());
    result.push(first);

    let mut prev_ema = first;
    for &value in &values[1..] {
        let ema = value * multiplier + prev_ema * (1.0 - multiplier);
        result.push(ema);
        prev_ema = ema;
    }

    result
}

/// Bars needed before the EMA of `span` has seen a full span of history.
pub fn min_bars(span: usize) -> usize {
    span.max(1)
}
