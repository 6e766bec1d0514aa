// =============================================================================
// Setup Synthesizer: bias vote and trade plan for one pair
// =============================================================================
//
// Works on a `TechSnapshot` value only; how the snapshot was built is not its
// concern.
//
// Pipeline:
//   1. Three binary votes: close vs EMA50, RSI14 vs 50, MACD histogram vs 0
//   2. Majority: +3 => bullish, -3 => bearish, +/-1 => neutral
//   3. Directional plan from pivots, stop padded by a quarter ATR
//      - bullish: buy S1, stop S2 - ATR/4, targets R1 / R2
//      - bearish: sell R1, stop R2 + ATR/4, targets S1 / S2
//   4. Neutral: two conditional breakout plans around the pivot
//   5. Round every emitted price to the pair's precision (last step only)
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::indicators::PivotSet;
use crate::snapshot::TechSnapshot;
use crate::types::{round_decimal, Bias, CurrencyPair};

/// Fraction of ATR14 used to pad stops and breakout triggers.
const ATR_BUFFER: f64 = 0.25;

// =============================================================================
// Setup
// =============================================================================

/// One conditional order idea: enter beyond `entry_level`, stop beyond
/// `stop_level`, take profit at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConditionalPlan {
    pub entry_level: f64,
    pub stop_level: f64,
    pub target: f64,
}

/// The actionable part of a setup. A neutral bias never carries a single
/// entry, and a directional bias never carries breakout alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TradePlan {
    Directional {
        entry: f64,
        stop: f64,
        tp1: f64,
        tp2: f64,
    },
    Neutral {
        /// Buy if price breaks above `entry_level`.
        alt_buy_breakout: ConditionalPlan,
        /// Sell if price breaks below `entry_level`.
        alt_sell_breakdown: ConditionalPlan,
    },
}

/// Trade setup for one pair, with the snapshot readings echoed for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setup {
    pub bias: Bias,
    #[serde(flatten)]
    pub plan: TradePlan,
    pub spot: f64,
    pub pivots: PivotSet,
    pub rsi14: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub macd_hist: f64,
    pub atr14: f64,
}

// =============================================================================
// Bias vote
// =============================================================================

fn vote(snap: &TechSnapshot) -> i32 {
    let ballot = |bullish: bool| if bullish { 1 } else { -1 };
    ballot(snap.close > snap.ema50) + ballot(snap.rsi14 > 50.0) + ballot(snap.macd_hist > 0.0)
}

/// Simple majority over the three fixed votes.
pub fn bias_from_snapshot(snap: &TechSnapshot) -> Bias {
    match vote(snap) {
        v if v >= 2 => Bias::Bullish,
        v if v <= -2 => Bias::Bearish,
        _ => Bias::Neutral,
    }
}

// =============================================================================
// Setup construction
// =============================================================================

/// Turn a snapshot into a setup quoted in `pair`'s precision.
pub fn build_setup(pair: &CurrencyPair, snap: &TechSnapshot) -> Setup {
    let bias = bias_from_snapshot(snap);
    let p = &snap.pivots;
    let pad = ATR_BUFFER * snap.atr14;

    let plan = match bias {
        Bias::Bullish => TradePlan::Directional {
            entry: p.s1,
            stop: p.s2 - pad,
            tp1: p.r1,
            tp2: p.r2,
        },
        Bias::Bearish => TradePlan::Directional {
            entry: p.r1,
            stop: p.r2 + pad,
            tp1: p.s1,
            tp2: p.s2,
        },
        Bias::Neutral => TradePlan::Neutral {
            alt_buy_breakout: ConditionalPlan {
                entry_level: p.r1 + pad,
                stop_level: p.p - pad,
                target: p.r2,
            },
            alt_sell_breakdown: ConditionalPlan {
                entry_level: p.s1 - pad,
                stop_level: p.p + pad,
                target: p.s2,
            },
        },
    };

    debug!(pair = %pair, %bias, votes = vote(snap), "setup synthesised");

    let px = |v: f64| pair.round_price(v);
    Setup {
        bias,
        plan: round_plan(&plan, px),
        spot: px(snap.close),
        pivots: p.map(px),
        rsi14: round_decimal(snap.rsi14, 2),
        ema20: px(snap.ema20),
        ema50: px(snap.ema50),
        macd_hist: round_decimal(snap.macd_hist, 6),
        atr14: px(snap.atr14),
    }
}

fn round_plan(plan: &TradePlan, px: impl Fn(f64) -> f64) -> TradePlan {
    let conditional = |c: &ConditionalPlan| ConditionalPlan {
        entry_level: px(c.entry_level),
        stop_level: px(c.stop_level),
        target: px(c.target),
    };
    match plan {
        TradePlan::Directional {
            entry,
            stop,
            tp1,
            tp2,
        } => TradePlan::Directional {
            entry: px(*entry),
            stop: px(*stop),
            tp1: px(*tp1),
            tp2: px(*tp2),
        },
        TradePlan::Neutral {
            alt_buy_breakout,
            alt_sell_breakdown,
        } => TradePlan::Neutral {
            alt_buy_breakout: conditional(alt_buy_breakout),
            alt_sell_breakdown: conditional(alt_sell_breakdown),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn eurusd() -> CurrencyPair {
        CurrencyPair::new("EUR", "USD")
    }

    fn snapshot(close: f64, ema50: f64, rsi14: f64, macd_hist: f64) -> TechSnapshot {
        TechSnapshot {
            close,
            ema20: close,
            ema50,
            rsi14,
            macd_hist,
            atr14: 0.0080,
            pivots: PivotSet::classic(1.1000, 1.0900, 1.0950),
        }
    }

    #[test]
    fn unanimous_up_votes_are_bullish() {
        let snap = snapshot(1.0960, 1.0950, 60.0, 0.0001);
        assert_eq!(vote(&snap), 3);
        assert_eq!(bias_from_snapshot(&snap), Bias::Bullish);
    }

    #[test]
    fn unanimous_down_votes_are_bearish() {
        let snap = snapshot(1.0940, 1.0950, 40.0, -0.0001);
        assert_eq!(vote(&snap), -3);
        assert_eq!(bias_from_snapshot(&snap), Bias::Bearish);
    }

    #[test]
    fn split_votes_are_neutral() {
        let snap = snapshot(1.0940, 1.0950, 40.0, 0.0001);
        assert_eq!(vote(&snap), -1);
        assert_eq!(bias_from_snapshot(&snap), Bias::Neutral);

        let snap = snapshot(1.0960, 1.0950, 60.0, -0.0001);
        assert_eq!(vote(&snap), 1);
        assert_eq!(bias_from_snapshot(&snap), Bias::Neutral);
    }

    #[test]
    fn ties_at_threshold_vote_down() {
        // close == ema50, rsi == 50, hist == 0 are all "not above".
        let snap = snapshot(1.0950, 1.0950, 50.0, 0.0);
        assert_eq!(bias_from_snapshot(&snap), Bias::Bearish);
    }

    #[test]
    fn bullish_setup_buys_s1() {
        let setup = build_setup(&eurusd(), &snapshot(1.0960, 1.0950, 60.0, 0.0001));
        assert_eq!(setup.bias, Bias::Bullish);
        // S2 1.0850 - 0.002 = 1.0830
        assert_eq!(
            setup.plan,
            TradePlan::Directional {
                entry: 1.09,
                stop: 1.083,
                tp1: 1.1,
                tp2: 1.105,
            }
        );
    }

    #[test]
    fn bearish_setup_sells_r1() {
        let setup = build_setup(&eurusd(), &snapshot(1.0940, 1.0950, 40.0, -0.0001));
        assert_eq!(setup.bias, Bias::Bearish);
        assert_eq!(
            setup.plan,
            TradePlan::Directional {
                entry: 1.1,
                stop: 1.107,
                tp1: 1.09,
                tp2: 1.085,
            }
        );
    }

    #[test]
    fn neutral_setup_offers_both_breakouts() {
        let setup = build_setup(&eurusd(), &snapshot(1.0940, 1.0950, 40.0, 0.0001));
        assert_eq!(setup.bias, Bias::Neutral);
        assert_eq!(
            setup.plan,
            TradePlan::Neutral {
                alt_buy_breakout: ConditionalPlan {
                    entry_level: 1.102,
                    stop_level: 1.093,
                    target: 1.105,
                },
                alt_sell_breakdown: ConditionalPlan {
                    entry_level: 1.088,
                    stop_level: 1.097,
                    target: 1.085,
                },
            }
        );
    }

    #[test]
    fn neutral_setup_serialises_without_entry_keys() {
        let setup = build_setup(&eurusd(), &snapshot(1.0940, 1.0950, 40.0, 0.0001));
        let json = serde_json::to_value(&setup).unwrap();
        assert_eq!(json["bias"], "neutral");
        assert!(json.get("alt_buy_breakout").is_some());
        assert!(json.get("alt_sell_breakdown").is_some());
        for key in ["entry", "stop", "tp1", "tp2"] {
            assert!(json.get(key).is_none(), "unexpected key {key}");
        }
    }

    #[test]
    fn directional_setup_serialises_flat_entry_keys() {
        let setup = build_setup(&eurusd(), &snapshot(1.0960, 1.0950, 60.0, 0.0001));
        let json = serde_json::to_value(&setup).unwrap();
        for key in ["entry", "stop", "tp1", "tp2", "spot", "pivots", "atr14"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert!(json.get("alt_buy_breakout").is_none());
    }

    #[test]
    fn prices_are_rounded_to_pair_precision_last() {
        let mut snap = snapshot(144.4567, 144.0, 60.0, 0.01234567);
        snap.ema20 = 144.4012;
        snap.atr14 = 1.23456;
        snap.pivots = PivotSet::classic(145.123, 143.987, 144.555);
        let usdjpy = CurrencyPair::new("USD", "JPY");
        let setup = build_setup(&usdjpy, &snap);

        assert_eq!(setup.spot, 144.46);
        assert_eq!(setup.ema20, 144.4);
        assert_eq!(setup.atr14, 1.23);
        assert_eq!(setup.macd_hist, 0.012346);
        assert_eq!(setup.pivots.p, usdjpy.round_price(snap.pivots.p));

        // The stop is computed from unrounded S2 and ATR, then rounded once.
        let raw_stop = snap.pivots.s2 - 0.25 * snap.atr14;
        match setup.plan {
            TradePlan::Directional { stop, .. } => assert_eq!(stop, usdjpy.round_price(raw_stop)),
            other => panic!("expected directional plan, got {other:?}"),
        }
    }

    #[test]
    fn rounded_setup_is_a_fixed_point_of_rounding() {
        let pair = eurusd();
        let setup = build_setup(&pair, &snapshot(1.094123, 1.0950, 40.0, 0.0001));
        for v in [setup.spot, setup.ema20, setup.ema50, setup.atr14, setup.pivots.r3] {
            assert_eq!(pair.round_price(v), v);
        }
    }

    #[test]
    fn five_decimal_quote_rounds_like_its_display() {
        let pair = eurusd();
        let setup = build_setup(&pair, &snapshot(1.14235, 1.0950, 60.0, 0.0001));
        assert_eq!(setup.spot, 1.1423);
        assert_eq!(pair.format_price(setup.spot), "1.1423");
    }
}
