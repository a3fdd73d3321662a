//! ATR (Average True Range).
//!
//! TR = max(high - low, |high - prev_close|, |low - prev_close|); the first
//! bar has no previous close so its TR is high - low. ATR is a trailing mean
//! of TR over n bars, defined from row n - 1.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::rolling_mean;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<f64> {
    let tr = true_ranges(bars);
    rolling_mean(&tr, period)
}

/// TR per bar; position 0 falls back to high - low.
pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}
