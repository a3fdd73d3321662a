//! Candlestick pattern flags.
//!
//! Each flag is a deterministic 0/1 rule over candle body and shadow sizes.
//! Multi-bar patterns look back one or two bars; the star patterns also
//! require the first candle's body to exceed the average body of the 10 bars
//! ending at it. Flags are defined for every row: a rule that cannot be
//! checked yet (not enough lookback) is simply 0.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::rolling_mean;

const BODY_AVG_LOOKBACK: usize = 10;

pub struct CandlestickColumns {
    pub doji: Vec<f64>,
    pub hammer: Vec<f64>,
    pub shooting_star: Vec<f64>,
    pub bullish_engulfing: Vec<f64>,
    pub bearish_engulfing: Vec<f64>,
    pub morning_star: Vec<f64>,
    pub evening_star: Vec<f64>,
}

pub fn detect_patterns(bars: &[PriceBar]) -> CandlestickColumns {
    let n = bars.len();
    let bodies: Vec<f64> = bars.iter().map(|b| b.body()).collect();
    let avg_body = rolling_mean(&bodies, BODY_AVG_LOOKBACK);

    let mut cols = CandlestickColumns {
        doji: Vec::with_capacity(n),
        hammer: Vec::with_capacity(n),
        shooting_star: Vec::with_capacity(n),
        bullish_engulfing: Vec::with_capacity(n),
        bearish_engulfing: Vec::with_capacity(n),
        morning_star: Vec::with_capacity(n),
        evening_star: Vec::with_capacity(n),
    };

    for (i, bar) in bars.iter().enumerate() {
        let body = bodies[i];
        let upper = bar.upper_shadow();
        let lower = bar.lower_shadow();
        let range = bar.high - bar.low;
        let bullish = bar.close > bar.open;
        let bearish = bar.close < bar.open;

        cols.doji.push(flag(body / (range + 0.001) < 0.1));
        cols.hammer
            .push(flag(lower > body * 2.0 && upper < body * 0.5 && bullish));
        cols.shooting_star
            .push(flag(upper > body * 2.0 && lower < body * 0.5 && bearish));

        let (bull_engulf, bear_engulf) = if i >= 1 {
            let prev = &bars[i - 1];
            let prev_bearish = prev.close < prev.open;
            let prev_bullish = prev.close > prev.open;
            (
                prev_bearish && bullish && bar.open < prev.close && bar.close > prev.open,
                prev_bullish && bearish && bar.open > prev.close && bar.close < prev.open,
            )
        } else {
            (false, false)
        };
        cols.bullish_engulfing.push(flag(bull_engulf));
        cols.bearish_engulfing.push(flag(bear_engulf));

        let (morning, evening) = if i >= 2 {
            let first = &bars[i - 2];
            let first_body = bodies[i - 2];
            // large first candle: body above the 10-bar average ending at it
            let first_large = avg_body[i - 2].is_finite() && first_body > avg_body[i - 2];
            let second_small = bodies[i - 1] < first_body * 0.5;
            let midpoint = (first.open + first.close) / 2.0;
            (
                first.close < first.open
                    && first_large
                    && second_small
                    && bullish
                    && bar.close > midpoint,
                first.close > first.open
                    && first_large
                    && second_small
                    && bearish
                    && bar.close < midpoint,
            )
        } else {
            (false, false)
        };
        cols.morning_star.push(flag(morning));
        cols.evening_star.push(flag(evening));
    }

    cols
}

fn flag(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}
