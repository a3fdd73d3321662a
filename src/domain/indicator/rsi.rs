//! RSI (Relative Strength Index).
//!
//! RSI = 100 - 100/(1 + RS), RS = rolling-mean(gains, n) / rolling-mean(losses, n).
//! Gains/losses come from close-to-close changes; the missing first change
//! counts as zero gain and zero loss, so the series is defined from row n - 1.
//! A zero mean loss yields RSI = 100 by convention (this also covers the
//! all-flat window where both means are zero).

use crate::domain::indicator::rolling_mean;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i == 0 {
            gains.push(0.0);
            losses.push(0.0);
        } else {
            let change = closes[i] - closes[i - 1];
            gains.push(if change > 0.0 { change } else { 0.0 });
            losses.push(if change < 0.0 { -change } else { 0.0 });
        }
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(&gain, &loss)| {
            if gain.is_nan() || loss.is_nan() {
                f64::NAN
            } else if loss == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 5) as f64 * 2.0).collect();
        let rsi = calculate_rsi(&closes, 14);

        assert_eq!(rsi.len(), 20);
        for (i, v) in rsi.iter().enumerate().take(13) {
            assert!(v.is_nan(), "row {} should be undefined", i);
        }
        assert!(rsi[13].is_finite());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi[14] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi[14] - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_window_is_100() {
        // zero mean loss convention, even with zero mean gain
        let closes = vec![100.0; 20];
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi[15] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_balanced_moves() {
        // alternating +1/-1: mean gain == mean loss -> RS = 1 -> RSI = 50
        let mut closes = vec![100.0];
        for i in 0..20 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi[16] - 50.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn rsi_always_in_0_100(closes in proptest::collection::vec(1.0f64..1000.0, 20..60)) {
            let rsi = calculate_rsi(&closes, 14);
            for v in rsi.iter().filter(|v| v.is_finite()) {
                prop_assert!((0.0..=100.0).contains(v), "RSI {} out of range", v);
            }
        }
    }
}
