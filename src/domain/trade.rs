//! Persisted trade projection of a signal, and its performance record.

use crate::domain::signal::Action;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Active,
    Evaluated,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Active => "active",
            TradeStatus::Evaluated => "evaluated",
        }
    }

    pub fn parse(s: &str) -> Option<TradeStatus> {
        match s {
            "active" => Some(TradeStatus::Active),
            "evaluated" => Some(TradeStatus::Evaluated),
            _ => None,
        }
    }
}

/// Lifecycle-bearing projection of a persisted signal.
///
/// Exactly one transition is permitted: active -> evaluated. The store is the
/// guard — an evaluated trade must never be returned by `get_open_trades`
/// again.
#[derive(Debug, Clone)]
pub struct Trade {
    pub id: i64,
    pub symbol: String,
    pub action: Action,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub confidence: f64,
    pub issued_at: NaiveDate,
    pub status: TradeStatus,
    pub is_evaluated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    TargetHit,
    StopLossHit,
    ClosedNeutral,
}

impl TradeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeOutcome::TargetHit => "target_hit",
            TradeOutcome::StopLossHit => "stop_loss_hit",
            TradeOutcome::ClosedNeutral => "closed_neutral",
        }
    }

    pub fn parse(s: &str) -> Option<TradeOutcome> {
        match s {
            "target_hit" => Some(TradeOutcome::TargetHit),
            "stop_loss_hit" => Some(TradeOutcome::StopLossHit),
            "closed_neutral" => Some(TradeOutcome::ClosedNeutral),
            _ => None,
        }
    }
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Written exactly once per trade, at evaluation time. Immutable afterward.
#[derive(Debug, Clone)]
pub struct TradePerformanceRecord {
    pub trade_id: i64,
    pub symbol: String,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub outcome: TradeOutcome,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    pub high_during_window: f64,
    pub low_during_window: f64,
}
