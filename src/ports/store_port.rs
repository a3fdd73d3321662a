//! Persistent store port trait.
//!
//! Every operation is fallible and atomic at the record level only; the core
//! never assumes multi-record transactions and never retries — retry policy
//! belongs to the adapter.

use crate::domain::bar::PriceBar;
use crate::domain::error::PilotError;
use crate::domain::signal::Signal;
use crate::domain::trade::{Trade, TradePerformanceRecord};
use chrono::NaiveDate;

pub trait StorePort {
    /// Most recent `limit` bars for `symbol`, ascending by date.
    fn get_historical_prices(&self, symbol: &str, limit: usize)
    -> Result<Vec<PriceBar>, PilotError>;

    /// Active, not-yet-evaluated trades issued strictly before `before`.
    fn get_open_trades(&self, before: NaiveDate) -> Result<Vec<Trade>, PilotError>;

    /// Persist a freshly generated signal; returns the new trade id.
    fn insert_recommendation(&self, signal: &Signal) -> Result<i64, PilotError>;

    fn save_performance_record(&self, record: &TradePerformanceRecord) -> Result<(), PilotError>;

    /// Flip a trade from active to evaluated. One-way.
    fn mark_evaluated(&self, trade_id: i64) -> Result<(), PilotError>;

    /// (max high, min low) over bars from `from` through today, if any.
    fn high_low_since(
        &self,
        symbol: &str,
        from: NaiveDate,
    ) -> Result<Option<(f64, f64)>, PilotError>;

    /// Latest known close for `symbol`.
    fn current_price(&self, symbol: &str) -> Result<Option<f64>, PilotError>;

    fn insert_bars(&self, bars: &[PriceBar]) -> Result<(), PilotError>;
}
