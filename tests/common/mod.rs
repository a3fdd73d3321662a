//! Shared test fixtures: an in-memory store and a canned predictor.

use chrono::{Days, NaiveDate};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use stockpilot::domain::bar::PriceBar;
use stockpilot::domain::error::PilotError;
use stockpilot::domain::signal::{Action, Signal};
use stockpilot::domain::trade::{Trade, TradePerformanceRecord, TradeStatus};
use stockpilot::ports::predictor_port::{ClassProbabilities, PredictorPort};
use stockpilot::ports::store_port::StorePort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, d: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        date: d,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
    }
}

/// A gently rising daily series starting at `start_price`.
pub fn generate_bars(symbol: &str, n: usize, start_price: f64) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    (0..n)
        .map(|i| {
            let d = start.checked_add_days(Days::new(i as u64)).unwrap();
            let close = start_price + 0.5 * i as f64;
            PriceBar {
                symbol: symbol.to_string(),
                date: d,
                open: close - 0.2,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000 + (i as i64 % 5) * 100,
            }
        })
        .collect()
}

#[derive(Default)]
pub struct MockStore {
    pub bars: RefCell<HashMap<String, Vec<PriceBar>>>,
    pub signals: RefCell<Vec<Signal>>,
    pub records: RefCell<Vec<TradePerformanceRecord>>,
    pub evaluated: RefCell<Vec<i64>>,
    pub fail_saves: Cell<bool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(symbol: &str, bars: Vec<PriceBar>) -> Self {
        let store = Self::new();
        store.bars.borrow_mut().insert(symbol.to_string(), bars);
        store
    }

    pub fn add_bars(&self, symbol: &str, bars: Vec<PriceBar>) {
        self.bars
            .borrow_mut()
            .entry(symbol.to_string())
            .or_default()
            .extend(bars);
    }
}

impl StorePort for MockStore {
    fn get_historical_prices(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<PriceBar>, PilotError> {
        let bars = self.bars.borrow();
        let all = bars.get(symbol).cloned().unwrap_or_default();
        let skip = all.len().saturating_sub(limit);
        Ok(all[skip..].to_vec())
    }

    fn get_open_trades(&self, before: NaiveDate) -> Result<Vec<Trade>, PilotError> {
        let evaluated = self.evaluated.borrow();
        Ok(self
            .signals
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, s)| Trade {
                id: i as i64 + 1,
                symbol: s.symbol.clone(),
                action: s.action,
                entry_price: s.entry_price,
                target_price: s.target_price,
                stop_loss: s.stop_loss,
                confidence: s.confidence,
                issued_at: s.issued_at,
                status: TradeStatus::Active,
                is_evaluated: false,
            })
            .filter(|t| t.issued_at < before && !evaluated.contains(&t.id))
            .collect())
    }

    fn insert_recommendation(&self, signal: &Signal) -> Result<i64, PilotError> {
        let mut signals = self.signals.borrow_mut();
        signals.push(signal.clone());
        Ok(signals.len() as i64)
    }

    fn save_performance_record(&self, record: &TradePerformanceRecord) -> Result<(), PilotError> {
        if self.fail_saves.get() {
            return Err(PilotError::StoreQuery {
                reason: "save rejected".into(),
            });
        }
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }

    fn mark_evaluated(&self, trade_id: i64) -> Result<(), PilotError> {
        self.evaluated.borrow_mut().push(trade_id);
        Ok(())
    }

    fn high_low_since(
        &self,
        symbol: &str,
        from: NaiveDate,
    ) -> Result<Option<(f64, f64)>, PilotError> {
        let bars = self.bars.borrow();
        let window: Vec<&PriceBar> = bars
            .get(symbol)
            .map(|b| b.iter().filter(|bar| bar.date >= from).collect())
            .unwrap_or_default();
        if window.is_empty() {
            return Ok(None);
        }
        let high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        Ok(Some((high, low)))
    }

    fn current_price(&self, symbol: &str) -> Result<Option<f64>, PilotError> {
        Ok(self
            .bars
            .borrow()
            .get(symbol)
            .and_then(|b| b.last())
            .map(|b| b.close))
    }

    fn insert_bars(&self, bars: &[PriceBar]) -> Result<(), PilotError> {
        for bar in bars {
            self.add_bars(&bar.symbol, vec![bar.clone()]);
        }
        Ok(())
    }
}

/// Predictor that always answers the same action and distribution.
pub struct StubPredictor {
    pub action: Action,
    pub probabilities: ClassProbabilities,
}

impl StubPredictor {
    pub fn buy(confidence: f64) -> Self {
        let p = confidence / 100.0;
        Self {
            action: Action::Buy,
            probabilities: ClassProbabilities {
                buy: p,
                hold: (1.0 - p) / 2.0,
                sell: (1.0 - p) / 2.0,
            },
        }
    }

    pub fn hold() -> Self {
        Self {
            action: Action::Hold,
            probabilities: ClassProbabilities {
                buy: 0.2,
                hold: 0.6,
                sell: 0.2,
            },
        }
    }
}

impl PredictorPort for StubPredictor {
    fn predict(
        &self,
        _features: &stockpilot::domain::frame::FeatureVector,
    ) -> Result<Action, PilotError> {
        Ok(self.action)
    }

    fn predict_probabilities(
        &self,
        _features: &stockpilot::domain::frame::FeatureVector,
    ) -> Result<ClassProbabilities, PilotError> {
        Ok(self.probabilities)
    }
}
