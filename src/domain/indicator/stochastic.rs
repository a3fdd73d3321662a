//! Stochastic oscillator.
//!
//! %K(n) = 100 * (close - min(low, n)) / (max(high, n) - min(low, n))
//! %D = trailing mean of %K over d bars.
//!
//! A degenerate window (max high == min low) leaves %K undefined; the row is
//! then handled by the frame's undefined-row policy rather than a made-up
//! neutral value.

use crate::domain::indicator::{rolling_max, rolling_mean, rolling_min};

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

pub struct StochasticColumns {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> StochasticColumns {
    let lowest = rolling_min(lows, k_period);
    let highest = rolling_max(highs, k_period);

    let k: Vec<f64> = (0..closes.len())
        .map(|i| {
            let range = highest[i] - lowest[i];
            if range == 0.0 {
                f64::NAN
            } else {
                100.0 * (closes[i] - lowest[i]) / range
            }
        })
        .collect();

    let d = rolling_mean(&k, d_period);

    StochasticColumns { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stochastic_warmup() {
        let highs: Vec<f64> = (0..20).map(|i| 105.0 + i as f64).collect();
        let lows: Vec<f64> = (0..20).map(|i| 95.0 + i as f64).collect();
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();

        let cols = calculate_stochastic(&highs, &lows, &closes, 14, 3);
        for i in 0..13 {
            assert!(cols.k[i].is_nan());
        }
        assert!(cols.k[13].is_finite());
        assert!(cols.d[14].is_nan());
        assert!(cols.d[15].is_finite());
    }

    #[test]
    fn k_is_100_at_window_high() {
        let highs = vec![110.0; 15];
        let lows = vec![90.0; 15];
        let mut closes = vec![100.0; 15];
        closes[14] = 110.0;

        let cols = calculate_stochastic(&highs, &lows, &closes, 14, 3);
        assert!((cols.k[14] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn k_is_0_at_window_low() {
        let highs = vec![110.0; 15];
        let lows = vec![90.0; 15];
        let mut closes = vec![100.0; 15];
        closes[14] = 90.0;

        let cols = calculate_stochastic(&highs, &lows, &closes, 14, 3);
        assert!((cols.k[14] - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_range_is_undefined() {
        let flat = vec![100.0; 15];
        let cols = calculate_stochastic(&flat, &flat, &flat, 14, 3);
        assert!(cols.k[14].is_nan());
    }
}
