//! Trade lifecycle evaluation.
//!
//! A trade is judged against the price extremes realized since it was issued.
//! Target is checked before stop: with only daily extremes there is no way to
//! order intraday crossings, so a window that touched both resolves in the
//! trade's favor. That optimism is deliberate and shared with the backtest.

use crate::domain::error::PilotError;
use crate::domain::signal::round2;
use crate::domain::trade::{Trade, TradeOutcome, TradePerformanceRecord};
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;

/// Cap on per-trade error messages carried in a batch summary.
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Judge one trade against its realized window. Pure; no store access.
///
/// Precedence: target first, then stop, else closed neutral at the current
/// price. Profit arithmetic is long-only (`exit − entry`) regardless of the
/// trade's action.
pub fn evaluate(
    trade: &Trade,
    realized_high: f64,
    realized_low: f64,
    current_price: f64,
    exit_date: NaiveDate,
) -> TradePerformanceRecord {
    let (outcome, exit_price) = if realized_high >= trade.target_price {
        (TradeOutcome::TargetHit, trade.target_price)
    } else if realized_low <= trade.stop_loss {
        (TradeOutcome::StopLossHit, trade.stop_loss)
    } else {
        (TradeOutcome::ClosedNeutral, current_price)
    };

    let profit_loss = exit_price - trade.entry_price;
    let profit_loss_percent = round2(100.0 * profit_loss / trade.entry_price);

    TradePerformanceRecord {
        trade_id: trade.id,
        symbol: trade.symbol.clone(),
        entry_price: trade.entry_price,
        target_price: trade.target_price,
        stop_loss: trade.stop_loss,
        exit_price,
        entry_date: trade.issued_at,
        exit_date,
        outcome,
        profit_loss,
        profit_loss_percent,
        high_during_window: realized_high,
        low_during_window: realized_low,
    }
}

/// Outcome of one batch evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    pub total: usize,
    pub target_hit: usize,
    pub stop_loss_hit: usize,
    pub closed_neutral: usize,
    /// 100 * target_hit / total; 0.0 when nothing was evaluated.
    pub success_rate: f64,
    pub records: Vec<TradePerformanceRecord>,
    pub errors: Vec<String>,
}

/// Drives [`evaluate`] over every open trade in the store.
pub struct TradeEvaluator<'a, S: StorePort + ?Sized> {
    store: &'a S,
}

impl<'a, S: StorePort + ?Sized> TradeEvaluator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Evaluate every active trade issued strictly before `today`.
    ///
    /// Per-trade failures are collected as strings and never abort the batch;
    /// a trade is marked evaluated only after its record is saved, so a
    /// failed trade is retried on the next run.
    pub fn evaluate_open_trades(&self, today: NaiveDate) -> Result<EvaluationSummary, PilotError> {
        let trades = self.store.get_open_trades(today)?;

        let mut records = Vec::new();
        let mut errors = Vec::new();
        let mut target_hit = 0usize;
        let mut stop_loss_hit = 0usize;
        let mut closed_neutral = 0usize;

        for trade in &trades {
            match self.evaluate_one(trade, today) {
                Ok(record) => {
                    match record.outcome {
                        TradeOutcome::TargetHit => target_hit += 1,
                        TradeOutcome::StopLossHit => stop_loss_hit += 1,
                        TradeOutcome::ClosedNeutral => closed_neutral += 1,
                    }
                    records.push(record);
                }
                Err(e) => {
                    if errors.len() < MAX_REPORTED_ERRORS {
                        errors.push(format!("{} (trade {}): {}", trade.symbol, trade.id, e));
                    }
                }
            }
        }

        let total = records.len();
        let success_rate = if total > 0 {
            round2(100.0 * target_hit as f64 / total as f64)
        } else {
            0.0
        };

        Ok(EvaluationSummary {
            total,
            target_hit,
            stop_loss_hit,
            closed_neutral,
            success_rate,
            records,
            errors,
        })
    }

    fn evaluate_one(
        &self,
        trade: &Trade,
        today: NaiveDate,
    ) -> Result<TradePerformanceRecord, PilotError> {
        let current_price = self
            .store
            .current_price(&trade.symbol)?
            .ok_or_else(|| PilotError::StoreQuery {
                reason: format!("no current price for {}", trade.symbol),
            })?;

        // Without any bars since issue, the trade can only close neutral.
        let (high, low) = self
            .store
            .high_low_since(&trade.symbol, trade.issued_at)?
            .unwrap_or((current_price, current_price));

        let record = evaluate(trade, high, low, current_price, today);
        self.store.save_performance_record(&record)?;
        self.store.mark_evaluated(trade.id)?;
        Ok(record)
    }
}

/// Aggregate view over a set of performance records.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub successful: usize,
    pub failed: usize,
    pub neutral: usize,
    pub success_rate: f64,
    pub avg_return_percent: f64,
    pub total_profit_loss: f64,
    pub best_trade_percent: f64,
    pub worst_trade_percent: f64,
}

impl PerformanceSummary {
    pub fn from_records(records: &[TradePerformanceRecord]) -> Self {
        let total_trades = records.len();
        let successful = records
            .iter()
            .filter(|r| r.outcome == TradeOutcome::TargetHit)
            .count();
        let failed = records
            .iter()
            .filter(|r| r.outcome == TradeOutcome::StopLossHit)
            .count();
        let neutral = total_trades - successful - failed;

        let (mut avg, mut total_pl, mut best, mut worst) = (0.0, 0.0, 0.0, 0.0);
        if total_trades > 0 {
            let pcts: Vec<f64> = records.iter().map(|r| r.profit_loss_percent).collect();
            avg = round2(pcts.iter().sum::<f64>() / total_trades as f64);
            total_pl = records.iter().map(|r| r.profit_loss).sum();
            best = pcts.iter().cloned().fold(f64::MIN, f64::max);
            worst = pcts.iter().cloned().fold(f64::MAX, f64::min);
        }

        let success_rate = if total_trades > 0 {
            round2(100.0 * successful as f64 / total_trades as f64)
        } else {
            0.0
        };

        Self {
            total_trades,
            successful,
            failed,
            neutral,
            success_rate,
            avg_return_percent: avg,
            total_profit_loss: total_pl,
            best_trade_percent: best,
            worst_trade_percent: worst,
        }
    }
}
