//! OBV (On-Balance Volume).
//!
//! Cumulative sum of sign(close change) * volume. The first bar has no
//! previous close and contributes nothing, so OBV starts at 0 and every row
//! is defined.

use crate::domain::indicator::ewm_mean;

pub const DEFAULT_EMA_SPAN: usize = 20;

pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    let mut obv = 0.0;

    for i in 0..closes.len() {
        if i > 0 {
            if closes[i] > closes[i - 1] {
                obv += volumes[i];
            } else if closes[i] < closes[i - 1] {
                obv -= volumes[i];
            }
        }
        out.push(obv);
    }

    out
}

/// Smoothed OBV, EMA over the configured span.
pub fn calculate_obv_ema(obv: &[f64], span: usize) -> Vec<f64> {
    ewm_mean(obv, span)
}
