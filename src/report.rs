// =============================================================================
// Session Report: headlines plus one setup per pair
// =============================================================================
//
// Pipeline per pair (pairs run concurrently, order preserved):
//   fetch intraday + daily -> TechSnapshot -> Setup
//
// A failing pair fails the whole report.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, instrument};

use crate::headlines::Headline;
use crate::market_data::MarketDataSource;
use crate::runtime_config::FeedConfig;
use crate::session::session_label;
use crate::snapshot::TechSnapshot;
use crate::strategy::{build_setup, Setup, TradePlan};
use crate::types::{CurrencyPair, Session};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSetup {
    pub pair: CurrencyPair,
    #[serde(flatten)]
    pub setup: Setup,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at_utc: DateTime<Utc>,
    pub session: Session,
    pub macro_headlines: Vec<Headline>,
    pub setups: Vec<PairSetup>,
}

/// Fetch both series for `pair` and synthesise its setup.
#[instrument(skip(source, pair), fields(pair = %pair))]
pub async fn analyse_pair<S>(source: &S, pair: &CurrencyPair, interval: &str) -> Result<Setup>
where
    S: MarketDataSource + ?Sized,
{
    let (intraday, daily) =
        futures_util::try_join!(source.intraday(pair, interval), source.daily(pair))?;
    let snapshot = TechSnapshot::build(&intraday, &daily)
        .with_context(|| format!("cannot build technical snapshot for {pair}"))?;
    Ok(build_setup(pair, &snapshot))
}

/// Assemble the report for `now` from `source` and already-collected headlines.
pub async fn build_report<S>(
    source: &S,
    config: &FeedConfig,
    macro_headlines: Vec<Headline>,
    now: DateTime<Utc>,
) -> Result<Report>
where
    S: MarketDataSource + ?Sized,
{
    let session = session_label(now);

    let results = join_all(
        config
            .pairs
            .iter()
            .map(|pair| analyse_pair(source, pair, &config.intraday_interval)),
    )
    .await;

    let mut setups = Vec::with_capacity(results.len());
    for (pair, result) in config.pairs.iter().zip(results) {
        let setup = result?;
        info!(pair = %pair, bias = %setup.bias, spot = setup.spot, "pair analysed");
        setups.push(PairSetup {
            pair: pair.clone(),
            setup,
        });
    }

    Ok(Report {
        generated_at_utc: now,
        session,
        macro_headlines,
        setups,
    })
}

// -------------------------------------------------------------------------
// HTML rendering
// -------------------------------------------------------------------------

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Shortest round-trip rendering of an already-rounded reading: always has a
/// decimal point ("45.0"), and magnitudes below 1e-4 use a two-digit
/// exponent ("5e-05").
fn short_float(v: f64) -> String {
    if v.is_finite() && v != 0.0 && v.abs() < 1e-4 {
        let sci = format!("{v:e}");
        if let Some((mantissa, exp)) = sci.split_once('e') {
            let exp: i32 = exp.parse().unwrap_or_default();
            let sign = if exp < 0 { '-' } else { '+' };
            return format!("{mantissa}e{sign}{:02}", exp.abs());
        }
    }
    let plain = format!("{v}");
    if !v.is_finite() || plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

/// Render the report as the HTML body of a feed item.
pub fn render_html(report: &Report) -> String {
    let mut pieces = vec![format!(
        "<p><strong>Session:</strong> {} | <strong>Generated (UTC):</strong> {}</p>",
        report.session,
        escape_html(&report.generated_at_utc.to_rfc3339())
    )];

    if !report.macro_headlines.is_empty() {
        pieces.push("<h3>Macro Headlines</h3><ul>".to_string());
        for h in &report.macro_headlines {
            pieces.push(format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&h.link),
                escape_html(&h.title)
            ));
        }
        pieces.push("</ul>".to_string());
    }

    pieces.push("<h3>Trade Setups</h3>".to_string());
    for PairSetup { pair, setup } in &report.setups {
        let px = |v: f64| pair.format_price(v);
        pieces.push(format!("<h4>{pair}</h4>"));
        pieces.push("<ul>".to_string());
        pieces.push(format!("<li>Spot: {} | Bias: {}</li>", px(setup.spot), setup.bias));
        match &setup.plan {
            TradePlan::Directional {
                entry,
                stop,
                tp1,
                tp2,
            } => pieces.push(format!(
                "<li>Entry: {} | SL: {} | TP1: {} | TP2: {}</li>",
                px(*entry),
                px(*stop),
                px(*tp1),
                px(*tp2)
            )),
            TradePlan::Neutral {
                alt_buy_breakout: buy,
                alt_sell_breakdown: sell,
            } => {
                pieces.push("<li>Neutral Play:</li>".to_string());
                pieces.push(format!(
                    "<li>Buy Breakout: entry &gt; {}, SL &lt; {}, TP {}</li>",
                    px(buy.entry_level),
                    px(buy.stop_level),
                    px(buy.target)
                ));
                pieces.push(format!(
                    "<li>Sell Breakdown: entry &lt; {}, SL &gt; {}, TP {}</li>",
                    px(sell.entry_level),
                    px(sell.stop_level),
                    px(sell.target)
                ));
            }
        }
        let piv = &setup.pivots;
        pieces.push(format!(
            "<li>Pivots: P {} | R1 {} | S1 {} | R2 {} | S2 {}</li>",
            px(piv.p),
            px(piv.r1),
            px(piv.s1),
            px(piv.r2),
            px(piv.s2)
        ));
        pieces.push(format!(
            "<li>RSI14: {} | EMA20: {} | EMA50: {} | MACD Hist: {} | ATR14: {}</li>",
            short_float(setup.rsi14),
            px(setup.ema20),
            px(setup.ema50),
            short_float(setup.macd_hist),
            px(setup.atr14)
        ));
        pieces.push("</ul>".to_string());
    }

    pieces.join("\n")
}
