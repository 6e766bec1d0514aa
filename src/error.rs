// =============================================================================
// Analysis Errors: failures surfaced by the technical-analysis core
// =============================================================================
//
// Only two things can go wrong inside the core: a series is too short for the
// indicator stack, or a bar handed to `PriceSeries` is malformed.  A zero
// average loss in RSI is handled by policy and never reaches this enum.
// =============================================================================

use thiserror::Error;

/// Result alias for the pure analysis core.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A series is shorter than the minimum window of an indicator, or the
    /// daily series lacks a completed prior day for pivots.
    #[error("insufficient history in {series} series: need at least {required} bars, got {available}")]
    InsufficientHistory {
        series: &'static str,
        required: usize,
        available: usize,
    },

    /// A price field is non-finite, non-positive, or high < low.
    #[error("invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },

    /// Timestamps must strictly increase within one series.
    #[error("bar at index {index} does not advance the timestamp")]
    NonMonotonicTimestamp { index: usize },
}

impl AnalysisError {
    pub fn insufficient_history(series: &'static str, required: usize, available: usize) -> Self {
        Self::InsufficientHistory {
            series,
            required,
            available,
        }
    }

    pub fn invalid_bar(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidBar {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_message_names_the_series() {
        let err = AnalysisError::insufficient_history("daily", 14, 3);
        assert_eq!(
            err.to_string(),
            "insufficient history in daily series: need at least 14 bars, got 3"
        );
    }

    #[test]
    fn invalid_bar_message_carries_reason() {
        let err = AnalysisError::invalid_bar(4, "close is not positive");
        assert_eq!(err.to_string(), "invalid bar at index 4: close is not positive");
    }
}
