// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators behind the session
// snapshot.  Series functions return one value per input bar and never fail:
// bars without a full look-back window carry a defined degenerate value (0 or
// the lightly-smoothed input).  Deciding whether a series is long enough is
// the snapshot builder's job, using each module's `min_bars`.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod pivots;
pub mod rsi;

pub use pivots::PivotSet;
