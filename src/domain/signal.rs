//! Signal generation from an enriched frame row and an injected predictor.

use crate::domain::bar::PriceBar;
use crate::domain::error::PilotError;
use crate::domain::frame::{compute_indicators, IndicatorRow};
use crate::ports::predictor_port::PredictorPort;
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use std::fmt;

/// Fewest bars worth even attempting signal generation on (SMA(50) must be
/// defined in at least one row).
pub const MIN_SIGNAL_BARS: usize = 50;

/// Bars fetched per symbol when generating for a universe.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Cap on per-item error messages carried in a batch report.
pub const MAX_REPORTED_ERRORS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Hold => "hold",
        }
    }

    pub fn parse(s: &str) -> Option<Action> {
        match s {
            "buy" => Some(Action::Buy),
            "sell" => Some(Action::Sell),
            "hold" => Some(Action::Hold),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry/target/stop offsets relative to the current close.
///
/// Two numerically distinct profiles exist; they are not interchangeable and
/// callers must pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetProfile {
    /// 1% entry discount, 4% target, 2% stop.
    Standard,
    /// 2% entry discount, 5% target, 3% stop.
    Wide,
}

impl OffsetProfile {
    pub fn parse(s: &str) -> Option<OffsetProfile> {
        match s {
            "standard" => Some(OffsetProfile::Standard),
            "wide" => Some(OffsetProfile::Wide),
            _ => None,
        }
    }

    fn offsets(&self) -> (f64, f64, f64) {
        match self {
            OffsetProfile::Standard => (0.01, 0.04, 0.02),
            OffsetProfile::Wide => (0.02, 0.05, 0.03),
        }
    }

    /// (entry, target, stop) for `action` at close `c`, rounded to 2 dp.
    pub fn levels(&self, action: Action, c: f64) -> PriceLevels {
        let (entry_off, target_off, stop_off) = self.offsets();
        let (entry, target, stop) = match action {
            Action::Buy => (
                c * (1.0 - entry_off),
                c * (1.0 + target_off),
                c * (1.0 - stop_off),
            ),
            Action::Sell => (
                c * (1.0 + entry_off),
                c * (1.0 - target_off),
                c * (1.0 + stop_off),
            ),
            Action::Hold => (c, c, c * (1.0 - stop_off)),
        };
        PriceLevels {
            entry: round2(entry),
            target: round2(target),
            stop_loss: round2(stop),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevels {
    pub entry: f64,
    pub target: f64,
    pub stop_loss: f64,
}

#[derive(Debug, Clone)]
pub struct SignalConfig {
    pub profile: OffsetProfile,
    pub history_limit: usize,
    pub min_history: usize,
}

impl SignalConfig {
    pub fn new(profile: OffsetProfile) -> Self {
        Self {
            profile,
            history_limit: DEFAULT_HISTORY_LIMIT,
            min_history: MIN_SIGNAL_BARS,
        }
    }
}

/// A directional recommendation. Immutable once created; the store owns its
/// lifecycle from insertion until evaluation.
#[derive(Debug, Clone)]
pub struct Signal {
    pub symbol: String,
    pub action: Action,
    /// Percent in [0, 100].
    pub confidence: f64,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub issued_at: NaiveDate,
    pub analysis: String,
}

/// Derive a signal from the latest complete frame row.
///
/// Declines with [`PilotError::PredictorUnavailable`] when no predictor is
/// injected and [`PilotError::UndefinedFeature`] when the row still has
/// undefined columns; callers surface the two conditions separately.
pub fn generate_signal(
    symbol: &str,
    row: &IndicatorRow,
    predictor: Option<&dyn PredictorPort>,
    config: &SignalConfig,
) -> Result<Signal, PilotError> {
    let predictor = predictor.ok_or(PilotError::PredictorUnavailable)?;

    let features = row.features().ok_or_else(|| PilotError::UndefinedFeature {
        symbol: symbol.to_string(),
    })?;

    let action = predictor.predict(&features)?;
    let probabilities = predictor.predict_probabilities(&features)?;
    let confidence = round2(probabilities.confidence());

    let levels = config.profile.levels(action, row.close);

    Ok(Signal {
        symbol: symbol.to_string(),
        action,
        confidence,
        entry_price: levels.entry,
        target_price: levels.target,
        stop_loss: levels.stop_loss,
        issued_at: row.date,
        analysis: format!("RSI: {:.1}, MACD: {:.2}", row.rsi, row.macd),
    })
}

/// Outcome of a batch generation run. `errors` is capped at
/// [`MAX_REPORTED_ERRORS`] entries.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generated: usize,
    pub total_symbols: usize,
    pub errors: Vec<String>,
}

/// Generate and persist a signal for every symbol in the universe.
///
/// One symbol's failure never aborts the batch: per-item errors are collected
/// as strings. Symbols with fewer than `min_history` bars, or no complete
/// row yet, are skipped quietly. A missing predictor aborts the whole run
/// up front — that is an operator condition, not a data condition.
pub fn generate_for_universe<S: StorePort + ?Sized>(
    store: &S,
    predictor: Option<&dyn PredictorPort>,
    symbols: &[String],
    config: &SignalConfig,
) -> Result<GenerationReport, PilotError> {
    let predictor = predictor.ok_or(PilotError::PredictorUnavailable)?;

    let mut generated = 0usize;
    let mut errors = Vec::new();

    for symbol in symbols {
        match generate_one(store, predictor, symbol, config) {
            Ok(true) => generated += 1,
            Ok(false) => {}
            Err(e) => {
                if errors.len() < MAX_REPORTED_ERRORS {
                    errors.push(format!("{}: {}", symbol, e));
                }
            }
        }
    }

    Ok(GenerationReport {
        generated,
        total_symbols: symbols.len(),
        errors,
    })
}

/// Generate a signal for one symbol straight from the store.
///
/// Unlike the batch driver, data shortfalls surface as typed errors here:
/// `InsufficientHistory` below `min_history` bars, `UndefinedFeature` when
/// no row is complete yet.
pub fn generate_for_symbol<S: StorePort + ?Sized>(
    store: &S,
    predictor: &dyn PredictorPort,
    symbol: &str,
    config: &SignalConfig,
) -> Result<Signal, PilotError> {
    let bars: Vec<PriceBar> = store.get_historical_prices(symbol, config.history_limit)?;
    if bars.len() < config.min_history {
        return Err(PilotError::InsufficientHistory {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: config.min_history,
        });
    }

    let frame = compute_indicators(&bars);
    let row = frame
        .latest_complete()
        .ok_or_else(|| PilotError::UndefinedFeature {
            symbol: symbol.to_string(),
        })?;

    generate_signal(symbol, row, Some(predictor), config)
}

fn generate_one<S: StorePort + ?Sized>(
    store: &S,
    predictor: &dyn PredictorPort,
    symbol: &str,
    config: &SignalConfig,
) -> Result<bool, PilotError> {
    match generate_for_symbol(store, predictor, symbol, config) {
        Ok(signal) => {
            store.insert_recommendation(&signal)?;
            Ok(true)
        }
        // data shortfalls are expected mid-universe; skip without noise
        Err(PilotError::InsufficientHistory { .. }) | Err(PilotError::UndefinedFeature { .. }) => {
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
