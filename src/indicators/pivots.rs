// =============================================================================
// Classic Floor-Trader Pivots
// =============================================================================
//
// From the previous completed period's high / low / close:
//   P  = (H + L + C) / 3
//   R1 = 2P - L        S1 = 2P - H
//   R2 = P + (H - L)   S2 = P - (H - L)
//   R3 = H + 2(P - L)  S3 = L - 2(H - P)
// =============================================================================

use serde::{Deserialize, Serialize};

/// Pivot levels for one completed period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotSet {
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "R1")]
    pub r1: f64,
    #[serde(rename = "S1")]
    pub s1: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
    #[serde(rename = "S2")]
    pub s2: f64,
    #[serde(rename = "R3")]
    pub r3: f64,
    #[serde(rename = "S3")]
    pub s3: f64,
}

impl PivotSet {
    pub fn classic(high: f64, low: f64, close: f64) -> Self {
        let p = (high + low + close) / 3.0;
        let range = high - low;
        Self {
            p,
            r1: 2.0 * p - low,
            s1: 2.0 * p - high,
            r2: p + range,
            s2: p - range,
            r3: high + 2.0 * (p - low),
            s3: low - 2.0 * (high - p),
        }
    }

    /// Apply `f` to every level, e.g. to round for presentation.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            p: f(self.p),
            r1: f(self.r1),
            s1: f(self.s1),
            r2: f(self.r2),
            s2: f(self.s2),
            r3: f(self.r3),
            s3: f(self.s3),
        }
    }
}
