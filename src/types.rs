// =============================================================================
// Shared types used across the session feed
// =============================================================================

use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// An FX currency pair such as EUR/USD.
///
/// The pair owns the quoting precision: JPY crosses are quoted to 2 decimal
/// places, everything else to 4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// Number of decimals a price in this pair is quoted with.
    pub fn decimals(&self) -> usize {
        if self.base == "JPY" || self.quote == "JPY" {
            2
        } else {
            4
        }
    }

    /// Round `value` to the pair's quoting precision. Always agrees with
    /// `format_price`.
    pub fn round_price(&self, value: f64) -> f64 {
        round_decimal(value, self.decimals())
    }

    /// Fixed-decimal rendering, e.g. `144.46` for USD/JPY, `1.1423` for EUR/USD.
    pub fn format_price(&self, value: f64) -> String {
        format!("{:.*}", self.decimals(), value)
    }
}

/// Nearest `f64` to `value` written with `decimals` places.
///
/// Rounds the exact decimal expansion of `value`, so 1.14235 (stored just
/// below the tie) gives 1.1423 and an exact tie such as 144.125 goes to even.
pub fn round_decimal(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    /// Accepts "EUR/USD", "eur/usd" and "EURUSD".
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        let (base, quote) = match s.split_once('/') {
            Some((b, q)) => (b.trim(), q.trim()),
            None if s.len() == 6 && s.is_ascii() => s.split_at(3),
            None => bail!("unrecognised currency pair: {s:?}"),
        };
        let is_code = |c: &str| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic());
        if !is_code(base) || !is_code(quote) {
            bail!("unrecognised currency pair: {s:?}");
        }
        Ok(Self::new(base, quote))
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        value.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.to_string()
    }
}

/// Directional lean produced by the three-indicator vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Trading session a report is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    Asia,
    Europe,
    #[serde(rename = "US")]
    Us,
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asia => write!(f, "Asia"),
            Self::Europe => write!(f, "Europe"),
            Self::Us => write!(f, "US"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_and_compact_forms() {
        let a: CurrencyPair = "EUR/USD".parse().unwrap();
        let b: CurrencyPair = "eurusd".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "EUR/USD");
    }

    #[test]
    fn rejects_garbage_pairs() {
        assert!("EURO/USD".parse::<CurrencyPair>().is_err());
        assert!("EUR".parse::<CurrencyPair>().is_err());
        assert!("12/USD".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn jpy_pairs_quote_two_decimals() {
        let usdjpy = CurrencyPair::new("USD", "JPY");
        assert_eq!(usdjpy.decimals(), 2);
        assert_eq!(usdjpy.format_price(144.4567), "144.46");
        assert!((usdjpy.round_price(144.4567) - 144.46).abs() < 1e-9);
    }

    #[test]
    fn other_pairs_quote_four_decimals() {
        let eurusd = CurrencyPair::new("EUR", "USD");
        assert_eq!(eurusd.decimals(), 4);
        assert_eq!(eurusd.format_price(1.142345), "1.1423");
        assert!((eurusd.round_price(1.142345) - 1.1423).abs() < 1e-12);
    }

    #[test]
    fn formatting_a_rounded_value_is_idempotent() {
        let eurusd = CurrencyPair::new("EUR", "USD");
        let usdjpy = CurrencyPair::new("USD", "JPY");
        for &(pair, raw) in &[(&eurusd, 1.142345), (&eurusd, 1.08765), (&usdjpy, 144.4567), (&usdjpy, 151.005)] {
            let once = pair.round_price(raw);
            assert_eq!(pair.round_price(once), once);
            let text = pair.format_price(once);
            let reparsed: f64 = text.parse().unwrap();
            assert_eq!(pair.format_price(reparsed), text);
        }
    }

    #[test]
    fn rounding_agrees_with_formatting_on_quotes_ending_in_five() {
        let eurusd = CurrencyPair::new("EUR", "USD");
        let gbpusd = CurrencyPair::new("GBP", "USD");
        let usdjpy = CurrencyPair::new("USD", "JPY");
        let cases = [
            (&eurusd, 1.14235, 1.1423),
            (&gbpusd, 1.26345, 1.2634),
            (&usdjpy, 144.125, 144.12),
            (&usdjpy, 151.005, 151.00),
        ];
        for (pair, raw, want) in cases {
            assert_eq!(pair.format_price(pair.round_price(raw)), pair.format_price(raw), "{raw}");
            assert_eq!(pair.round_price(raw), want, "{raw}");
        }
    }

    #[test]
    fn round_decimal_keeps_non_finite_values() {
        assert!(round_decimal(f64::NAN, 4).is_nan());
        assert_eq!(round_decimal(f64::INFINITY, 2), f64::INFINITY);
        assert_eq!(round_decimal(-0.0000004, 6), -0.0);
    }

    #[test]
    fn pair_serialises_as_display_string() {
        let pair = CurrencyPair::new("GBP", "USD");
        assert_eq!(serde_json::to_string(&pair).unwrap(), "\"GBP/USD\"");
        let back: CurrencyPair = serde_json::from_str("\"GBP/USD\"").unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn bias_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Bias::Neutral).unwrap(), "\"neutral\"");
        assert_eq!(Bias::Bullish.to_string(), "bullish");
    }
}
