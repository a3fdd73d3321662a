//! Support/resistance levels from rolling extremes.
//!
//! support = min(low) and resistance = max(high) over the trailing window.
//! Distances are percentages of support (for support) and of close (for
//! resistance); sr_position normalizes close into [0, 1] between the two
//! levels with a small epsilon in the denominator. Near flags fire inside 2%.

use crate::domain::indicator::{rolling_max, rolling_min};

pub const DEFAULT_WINDOW: usize = 20;
pub const NEAR_THRESHOLD_PCT: f64 = 2.0;

const POSITION_EPS: f64 = 0.001;

pub struct SupportResistanceColumns {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
    pub dist_from_support: Vec<f64>,
    pub dist_from_resistance: Vec<f64>,
    pub sr_position: Vec<f64>,
    pub near_support: Vec<f64>,
    pub near_resistance: Vec<f64>,
}

pub fn calculate_support_resistance(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    window: usize,
) -> SupportResistanceColumns {
    let support = rolling_min(lows, window);
    let resistance = rolling_max(highs, window);

    let n = closes.len();
    let mut dist_from_support = Vec::with_capacity(n);
    let mut dist_from_resistance = Vec::with_capacity(n);
    let mut sr_position = Vec::with_capacity(n);
    let mut near_support = Vec::with_capacity(n);
    let mut near_resistance = Vec::with_capacity(n);

    for i in 0..n {
        let ds = (closes[i] - support[i]) / support[i] * 100.0;
        let dr = (resistance[i] - closes[i]) / closes[i] * 100.0;
        dist_from_support.push(ds);
        dist_from_resistance.push(dr);
        sr_position.push((closes[i] - support[i]) / (resistance[i] - support[i] + POSITION_EPS));
        near_support.push(if ds < NEAR_THRESHOLD_PCT { 1.0 } else { 0.0 });
        near_resistance.push(if dr < NEAR_THRESHOLD_PCT { 1.0 } else { 0.0 });
    }

    SupportResistanceColumns {
        support,
        resistance,
        dist_from_support,
        dist_from_resistance,
        sr_position,
        near_support,
        near_resistance,
    }
}
