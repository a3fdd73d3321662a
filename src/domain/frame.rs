//! Enriched indicator frame and the model feature vector.
//!
//! [`compute_indicators`] turns an ordered single-symbol bar sequence into one
//! row per bar with every derived column. Warm-up positions are NaN; a row is
//! "complete" once every numeric column is defined (the largest window,
//! SMA(50), dominates, so completeness starts at row 49). Callers must drop
//! or skip incomplete rows before handing features to a predictor.
//!
//! Input must be sorted ascending by date for one symbol; behavior for mixed
//! symbols or unsorted input is unspecified.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{
    adx, atr, bollinger, candlestick, ewm_mean, macd, obv, pct_change, rolling_mean, rsi,
    stochastic, support_resistance,
};
use chrono::NaiveDate;

/// Feature names, in the exact order the classifier was trained with.
pub const FEATURE_NAMES: [&str; 16] = [
    "rsi",
    "macd",
    "macd_signal",
    "macd_diff",
    "sma_20",
    "sma_50",
    "ema_12",
    "bb_width",
    "atr",
    "volume_ratio",
    "price_change",
    "price_change_5d",
    "stoch_k",
    "stoch_d",
    "adx",
    "obv_ema",
];

/// The fixed-order numeric vector consumed by a [`PredictorPort`].
///
/// [`PredictorPort`]: crate::ports::predictor_port::PredictorPort
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_diff: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub bb_width: f64,
    pub atr: f64,
    pub volume_ratio: f64,
    pub price_change: f64,
    pub price_change_5d: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub adx: f64,
    pub obv_ema: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order, for consumers that want a flat slice.
    pub fn to_array(&self) -> [f64; 16] {
        [
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_diff,
            self.sma_20,
            self.sma_50,
            self.ema_12,
            self.bb_width,
            self.atr,
            self.volume_ratio,
            self.price_change,
            self.price_change_5d,
            self.stoch_k,
            self.stoch_d,
            self.adx,
            self.obv_ema,
        ]
    }
}

/// One enriched row: the source bar plus every derived column.
#[derive(Debug, Clone)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,

    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_diff: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub bb_middle: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub bb_width: f64,
    pub atr: f64,
    pub volume_ratio: f64,
    pub price_change: f64,
    pub price_change_5d: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub adx: f64,
    pub obv: f64,
    pub obv_ema: f64,

    pub doji: f64,
    pub hammer: f64,
    pub shooting_star: f64,
    pub bullish_engulfing: f64,
    pub bearish_engulfing: f64,
    pub morning_star: f64,
    pub evening_star: f64,

    pub support: f64,
    pub resistance: f64,
    pub dist_from_support: f64,
    pub dist_from_resistance: f64,
    pub sr_position: f64,
    pub near_support: f64,
    pub near_resistance: f64,
}

impl IndicatorRow {
    /// True when every derived column is defined.
    pub fn is_complete(&self) -> bool {
        self.numeric_columns().iter().all(|v| v.is_finite())
    }

    /// The model features, or None when any of them is still undefined.
    pub fn features(&self) -> Option<FeatureVector> {
        let fv = FeatureVector {
            rsi: self.rsi,
            macd: self.macd,
            macd_signal: self.macd_signal,
            macd_diff: self.macd_diff,
            sma_20: self.sma_20,
            sma_50: self.sma_50,
            ema_12: self.ema_12,
            bb_width: self.bb_width,
            atr: self.atr,
            volume_ratio: self.volume_ratio,
            price_change: self.price_change,
            price_change_5d: self.price_change_5d,
            stoch_k: self.stoch_k,
            stoch_d: self.stoch_d,
            adx: self.adx,
            obv_ema: self.obv_ema,
        };
        if fv.to_array().iter().all(|v| v.is_finite()) {
            Some(fv)
        } else {
            None
        }
    }

    fn numeric_columns(&self) -> [f64; 27] {
        [
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_diff,
            self.sma_20,
            self.sma_50,
            self.ema_12,
            self.bb_middle,
            self.bb_upper,
            self.bb_lower,
            self.bb_width,
            self.atr,
            self.volume_ratio,
            self.price_change,
            self.price_change_5d,
            self.stoch_k,
            self.stoch_d,
            self.adx,
            self.obv,
            self.obv_ema,
            self.support,
            self.resistance,
            self.dist_from_support,
            self.dist_from_resistance,
            self.sr_position,
            self.near_support,
            self.near_resistance,
        ]
    }
}

/// Ordered sequence of enriched rows for a single symbol.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Rows with every column defined, in date order.
    pub fn complete_rows(&self) -> Vec<&IndicatorRow> {
        self.rows.iter().filter(|r| r.is_complete()).collect()
    }

    /// Latest row with every column defined.
    pub fn latest_complete(&self) -> Option<&IndicatorRow> {
        self.rows.iter().rev().find(|r| r.is_complete())
    }
}

/// Compute every indicator column for an ordered single-symbol bar sequence.
pub fn compute_indicators(bars: &[PriceBar]) -> IndicatorFrame {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

    let rsi = rsi::calculate_rsi(&closes, rsi::DEFAULT_PERIOD);
    let macd_cols = macd::calculate_macd_default(&closes);
    let sma_20 = rolling_mean(&closes, 20);
    let sma_50 = rolling_mean(&closes, 50);
    let ema_12 = ewm_mean(&closes, 12);
    let bb = bollinger::calculate_bollinger(&closes, bollinger::DEFAULT_PERIOD, bollinger::DEFAULT_MULT);
    let atr = atr::calculate_atr(bars, atr::DEFAULT_PERIOD);
    let volume_sma = rolling_mean(&volumes, 20);
    let price_change = pct_change(&closes, 1);
    let price_change_5d = pct_change(&closes, 5);
    let stoch = stochastic::calculate_stochastic(
        &highs,
        &lows,
        &closes,
        stochastic::DEFAULT_K_PERIOD,
        stochastic::DEFAULT_D_PERIOD,
    );
    let adx = adx::calculate_adx(bars, adx::DEFAULT_PERIOD);
    let obv = obv::calculate_obv(&closes, &volumes);
    let obv_ema = obv::calculate_obv_ema(&obv, obv::DEFAULT_EMA_SPAN);
    let patterns = candlestick::detect_patterns(bars);
    let sr = support_resistance::calculate_support_resistance(
        &highs,
        &lows,
        &closes,
        support_resistance::DEFAULT_WINDOW,
    );

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            rsi: rsi[i],
            macd: macd_cols.macd[i],
            macd_signal: macd_cols.signal[i],
            macd_diff: macd_cols.histogram[i],
            sma_20: sma_20[i],
            sma_50: sma_50[i],
            ema_12: ema_12[i],
            bb_middle: bb.middle[i],
            bb_upper: bb.upper[i],
            bb_lower: bb.lower[i],
            bb_width: bb.width[i],
            atr: atr[i],
            volume_ratio: volumes[i] / volume_sma[i],
            price_change: price_change[i],
            price_change_5d: price_change_5d[i],
            stoch_k: stoch.k[i],
            stoch_d: stoch.d[i],
            adx: adx[i],
            obv: obv[i],
            obv_ema: obv_ema[i],
            doji: patterns.doji[i],
            hammer: patterns.hammer[i],
            shooting_star: patterns.shooting_star[i],
            bullish_engulfing: patterns.bullish_engulfing[i],
            bearish_engulfing: patterns.bearish_engulfing[i],
            morning_star: patterns.morning_star[i],
            evening_star: patterns.evening_star[i],
            support: sr.support[i],
            resistance: sr.resistance[i],
            dist_from_support: sr.dist_from_support[i],
            dist_from_resistance: sr.dist_from_resistance[i],
            sr_position: sr.sr_position[i],
            near_support: sr.near_support[i],
            near_resistance: sr.near_resistance[i],
        })
        .collect();

    IndicatorFrame { rows }
}
