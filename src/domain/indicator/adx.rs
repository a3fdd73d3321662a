//! ADX (Average Directional Index).
//!
//! +DM = positive part of diff(high), -DM = negative part of diff(low)
//! (absolute value taken at the DI step). +DI/-DI are the trailing means of
//! the directional movements over n bars, normalized by ATR(n).
//! DX = 100 * |+DI - -DI| / (+DI + -DI), with a zero denominator guarded to
//! DX = 0. ADX is the trailing mean of DX over n bars.
//!
//! Warm-up compounds: DI from row n, ADX from row 2n - 1.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::atr::true_ranges;
use crate::domain::indicator::{diff, rolling_mean};

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_adx(bars: &[PriceBar], period: usize) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let plus_dm: Vec<f64> = diff(&highs)
        .into_iter()
        .map(|d| if d < 0.0 { 0.0 } else { d })
        .collect();
    let minus_dm: Vec<f64> = diff(&lows)
        .into_iter()
        .map(|d| if d > 0.0 { 0.0 } else { d })
        .collect();
    let minus_dm_abs: Vec<f64> = minus_dm.iter().map(|d| d.abs()).collect();

    let atr = rolling_mean(&true_ranges(bars), period);
    let avg_plus = rolling_mean(&plus_dm, period);
    let avg_minus = rolling_mean(&minus_dm_abs, period);

    let dx: Vec<f64> = (0..bars.len())
        .map(|i| {
            if avg_plus[i].is_nan() || avg_minus[i].is_nan() || atr[i].is_nan() || atr[i] == 0.0 {
                return f64::NAN;
            }
            let plus_di = 100.0 * avg_plus[i] / atr[i];
            let minus_di = 100.0 * avg_minus[i] / atr[i];
            let denom = plus_di + minus_di;
            if denom == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / denom
            }
        })
        .collect();

    rolling_mean(&dx, period)
}
