//! Bollinger Bands.
//!
//! middle = SMA(n), upper/lower = middle +/- mult * stddev(n) (sample stddev),
//! width = (upper - lower) / middle. Defined from row n - 1.

use crate::domain::indicator::{rolling_mean, rolling_stddev};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT: f64 = 2.0;

pub struct BollingerColumns {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub width: Vec<f64>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerColumns {
    let middle = rolling_mean(closes, period);
    let stddev = rolling_stddev(closes, period);

    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());
    let mut width = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let u = middle[i] + stddev[i] * mult;
        let l = middle[i] - stddev[i] * mult;
        upper.push(u);
        lower.push(l);
        width.push((u - l) / middle[i]);
    }

    BollingerColumns {
        middle,
        upper,
        lower,
        width,
    }
}
