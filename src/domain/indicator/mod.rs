//! Technical indicator implementations.
//!
//! Columns are computed as `Vec<f64>` aligned with the input bars, using
//! `f64::NAN` for warm-up positions. Trailing-window helpers follow the
//! reference numeric library's semantics: a window of size `w` needs `w`
//! observations, and any undefined observation inside the window makes the
//! result undefined. Exponentially weighted means are recursive from the
//! first defined value and carry no warm-up of their own.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod candlestick;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod stochastic;
pub mod support_resistance;

/// Trailing simple moving average. First `window - 1` positions are NaN.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing minimum over `window` values.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Trailing maximum over `window` values.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Trailing sample standard deviation (ddof = 1, the reference library's
/// default). Windows of size 1 are 0.
pub fn rolling_stddev(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        if w.len() < 2 {
            return 0.0;
        }
        let variance = w.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    })
}

/// Exponentially weighted mean with smoothing k = 2/(span + 1), seeded at the
/// first defined input value. Positions before the seed are NaN.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = f64::NAN;

    for &v in values {
        if ema.is_nan() {
            ema = v;
        } else if v.is_finite() {
            ema = v * k + ema * (1.0 - k);
        }
        out.push(ema);
    }

    out
}

/// First differences; position 0 is NaN.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 {
            out.push(f64::NAN);
        } else {
            out.push(values[i] - values[i - 1]);
        }
    }
    out
}

/// Percentage change over `periods` observations; leading positions are NaN.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i < periods {
            out.push(f64::NAN);
        } else {
            out.push(values[i] / values[i - periods] - 1.0);
        }
    }
    out
}

fn rolling_apply<F>(values: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = Vec::with_capacity(values.len());
    if window == 0 {
        out.resize(values.len(), f64::NAN);
        return out;
    }

    for i in 0..values.len() {
        if i + 1 < window {
            out.push(f64::NAN);
            continue;
        }
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            out.push(f64::NAN);
        } else {
            out.push(f(slice));
        }
    }

    out
}
