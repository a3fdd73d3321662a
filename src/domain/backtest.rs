//! Historical simulation of the signal pipeline.
//!
//! Walks each symbol's enriched frame bar by bar, asks the predictor for an
//! action at every qualifying row, and resolves each simulated trade against
//! the next `horizon` bars using the same target-first precedence as the
//! live evaluator.

use crate::domain::bar::PriceBar;
use crate::domain::error::PilotError;
use crate::domain::frame::{compute_indicators, IndicatorRow};
use crate::domain::signal::{round2, Action, OffsetProfile};
use crate::domain::trade::TradeOutcome;
use crate::ports::predictor_port::PredictorPort;
use chrono::NaiveDate;

/// Fewest raw bars worth simulating a symbol on.
pub const MIN_BACKTEST_BARS: usize = 100;

/// Cap on per-symbol skip notes carried in a report.
pub const MAX_REPORTED_SKIPS: usize = 10;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub profile: OffsetProfile,
    /// Signals below this confidence (percent) are not traded.
    pub min_confidence: f64,
    /// Bars a simulated trade is given to resolve.
    pub horizon: usize,
    /// Complete rows skipped at the start of each symbol's frame.
    pub warmup: usize,
}

impl BacktestConfig {
    pub fn new(profile: OffsetProfile) -> Self {
        Self {
            profile,
            min_confidence: 40.0,
            horizon: 5,
            warmup: 50,
        }
    }
}

/// One resolved simulated trade.
#[derive(Debug, Clone)]
pub struct BacktestTrade {
    pub symbol: String,
    pub action: Action,
    pub entry_price: f64,
    pub exit_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub confidence: f64,
    pub outcome: TradeOutcome,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub trades: Vec<BacktestTrade>,
    pub total_trades: usize,
    pub target_hit: usize,
    pub stop_loss_hit: usize,
    pub closed_neutral: usize,
    /// 100 * target_hit / total; 0.0 when nothing traded.
    pub success_rate: f64,
    pub total_profit_loss: f64,
    pub avg_profit_loss_percent: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub skipped: Vec<String>,
}

/// Run the simulation over pre-fetched per-symbol histories.
///
/// Symbols with too little history are skipped with a note, never an error;
/// a predictor failure aborts the run since every later prediction would
/// fail the same way.
pub fn simulate(
    histories: &[(String, Vec<PriceBar>)],
    predictor: &dyn PredictorPort,
    config: &BacktestConfig,
) -> Result<BacktestReport, PilotError> {
    let mut trades = Vec::new();
    let mut skipped = Vec::new();

    if config.horizon == 0 {
        return Ok(summarize(trades, skipped));
    }

    for (symbol, bars) in histories {
        if bars.len() < MIN_BACKTEST_BARS {
            note_skip(&mut skipped, symbol, bars.len(), MIN_BACKTEST_BARS);
            continue;
        }

        let frame = compute_indicators(bars);
        let complete = frame.complete_rows();
        if complete.len() <= config.warmup + config.horizon {
            note_skip(&mut skipped, symbol, complete.len(), config.warmup + config.horizon + 1);
            continue;
        }

        simulate_symbol(symbol, &complete, predictor, config, &mut trades)?;
    }

    Ok(summarize(trades, skipped))
}

fn note_skip(skipped: &mut Vec<String>, symbol: &str, have: usize, need: usize) {
    if skipped.len() < MAX_REPORTED_SKIPS {
        skipped.push(format!("{}: {} usable bars, need {}", symbol, have, need));
    }
}

fn simulate_symbol(
    symbol: &str,
    complete: &[&IndicatorRow],
    predictor: &dyn PredictorPort,
    config: &BacktestConfig,
    trades: &mut Vec<BacktestTrade>,
) -> Result<(), PilotError> {
    let last_entry = complete.len() - config.horizon;
    for i in config.warmup..last_entry {
        let row = complete[i];
        let Some(features) = row.features() else {
            continue;
        };

        let action = predictor.predict(&features)?;
        if action == Action::Hold {
            continue;
        }
        let confidence = round2(predictor.predict_probabilities(&features)?.confidence());
        if confidence < config.min_confidence {
            continue;
        }

        // Simulated fills happen at the signal bar's close; the profile only
        // supplies target and stop.
        let entry = row.close;
        let levels = config.profile.levels(action, entry);
        let window = &complete[i + 1..=i + config.horizon];
        trades.push(resolve_trade(
            symbol, action, entry, confidence, levels.target, levels.stop_loss, row.date, window,
        ));
    }
    Ok(())
}

fn resolve_trade(
    symbol: &str,
    action: Action,
    entry: f64,
    confidence: f64,
    target: f64,
    stop: f64,
    entry_date: NaiveDate,
    window: &[&IndicatorRow],
) -> BacktestTrade {
    let mut outcome = TradeOutcome::ClosedNeutral;
    let mut exit_price = window[window.len() - 1].close;
    let mut exit_date = window[window.len() - 1].date;

    for future in window {
        let (target_touched, stop_touched) = match action {
            Action::Buy => (future.high >= target, future.low <= stop),
            Action::Sell => (future.low <= target, future.high >= stop),
            Action::Hold => (false, false),
        };
        if target_touched {
            outcome = TradeOutcome::TargetHit;
            exit_price = target;
            exit_date = future.date;
            break;
        }
        if stop_touched {
            outcome = TradeOutcome::StopLossHit;
            exit_price = stop;
            exit_date = future.date;
            break;
        }
    }

    let profit_loss = match action {
        Action::Sell => entry - exit_price,
        _ => exit_price - entry,
    };

    BacktestTrade {
        symbol: symbol.to_string(),
        action,
        entry_price: entry,
        exit_price,
        target_price: target,
        stop_loss: stop,
        confidence,
        outcome,
        profit_loss,
        profit_loss_percent: round2(100.0 * profit_loss / entry),
        entry_date,
        exit_date,
    }
}

fn summarize(trades: Vec<BacktestTrade>, skipped: Vec<String>) -> BacktestReport {
    let total_trades = trades.len();
    let target_hit = trades
        .iter()
        .filter(|t| t.outcome == TradeOutcome::TargetHit)
        .count();
    let stop_loss_hit = trades
        .iter()
        .filter(|t| t.outcome == TradeOutcome::StopLossHit)
        .count();
    let closed_neutral = total_trades - target_hit - stop_loss_hit;

    let success_rate = if total_trades > 0 {
        round2(100.0 * target_hit as f64 / total_trades as f64)
    } else {
        0.0
    };

    let returns: Vec<f64> = trades.iter().map(|t| t.profit_loss_percent / 100.0).collect();
    let total_profit_loss = trades.iter().map(|t| t.profit_loss).sum();
    let avg_profit_loss_percent = if total_trades > 0 {
        round2(trades.iter().map(|t| t.profit_loss_percent).sum::<f64>() / total_trades as f64)
    } else {
        0.0
    };

    BacktestReport {
        sharpe_ratio: sharpe_ratio(&returns),
        max_drawdown: max_drawdown(&returns),
        trades,
        total_trades,
        target_hit,
        stop_loss_hit,
        closed_neutral,
        success_rate,
        total_profit_loss,
        avg_profit_loss_percent,
        skipped,
    }
}

/// Annualized mean-over-stddev of per-trade returns. Population stddev;
/// 0.0 when the returns are empty or constant.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std > 0.0 {
        mean / std * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// Deepest drop of the cumulative return curve below its running peak.
/// Non-positive; 0.0 for an empty or monotonically rising curve.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = f64::MIN;
    let mut worst = 0.0f64;
    for r in returns {
        cumulative += r;
        peak = peak.max(cumulative);
        worst = worst.min(cumulative - peak);
    }
    worst
}
