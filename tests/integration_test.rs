//! End-to-end tests across the signal, evaluation and backtest flows.

mod common;

use common::{date, generate_bars, make_bar, MockStore, StubPredictor};
use stockpilot::domain::backtest::{simulate, BacktestConfig};
use stockpilot::domain::error::PilotError;
use stockpilot::domain::evaluator::TradeEvaluator;
use stockpilot::domain::signal::{
    generate_for_symbol, generate_for_universe, Action, OffsetProfile, Signal, SignalConfig,
};
use stockpilot::domain::trade::TradeOutcome;

fn buy_signal(symbol: &str, entry: f64, target: f64, stop: f64, issued: chrono::NaiveDate) -> Signal {
    Signal {
        symbol: symbol.to_string(),
        action: Action::Buy,
        confidence: 62.0,
        entry_price: entry,
        target_price: target,
        stop_loss: stop,
        issued_at: issued,
        analysis: "RSI: 28.0, MACD: 0.40".into(),
    }
}

#[test]
fn generate_persists_signal_with_profile_levels() {
    let store = MockStore::with_bars("ACME", generate_bars("ACME", 60, 100.0));
    let predictor = StubPredictor::buy(62.0);
    let config = SignalConfig::new(OffsetProfile::Standard);

    let report =
        generate_for_universe(&store, Some(&predictor), &["ACME".to_string()], &config).unwrap();

    assert_eq!(report.generated, 1);
    assert_eq!(report.total_symbols, 1);
    assert!(report.errors.is_empty());

    let signals = store.signals.borrow();
    assert_eq!(signals.len(), 1);
    let signal = &signals[0];
    assert_eq!(signal.action, Action::Buy);
    assert!((signal.confidence - 62.0).abs() < 1e-9);

    // last close of the series is 100 + 0.5 * 59
    let close = 129.5;
    assert!((signal.entry_price - 0.99 * close).abs() < 0.01);
    assert!((signal.target_price - 1.04 * close).abs() < 0.01);
    assert!((signal.stop_loss - 0.98 * close).abs() < 0.01);
    assert_eq!(signal.issued_at, date(2024, 2, 29));
    assert!(signal.analysis.starts_with("RSI: "));
}

#[test]
fn short_history_is_skipped_quietly() {
    let store = MockStore::with_bars("ACME", generate_bars("ACME", 30, 100.0));
    let predictor = StubPredictor::buy(62.0);
    let config = SignalConfig::new(OffsetProfile::Standard);

    let report =
        generate_for_universe(&store, Some(&predictor), &["ACME".to_string()], &config).unwrap();

    assert_eq!(report.generated, 0);
    assert!(report.errors.is_empty());
    assert!(store.signals.borrow().is_empty());
}

#[test]
fn single_symbol_generation_declines_with_typed_errors() {
    let store = MockStore::with_bars("ACME", generate_bars("ACME", 30, 100.0));
    let predictor = StubPredictor::buy(62.0);
    let config = SignalConfig::new(OffsetProfile::Standard);

    match generate_for_symbol(&store, &predictor, "ACME", &config) {
        Err(PilotError::InsufficientHistory {
            symbol,
            bars,
            minimum,
        }) => {
            assert_eq!(symbol, "ACME");
            assert_eq!(bars, 30);
            assert_eq!(minimum, 50);
        }
        other => panic!("expected InsufficientHistory, got: {other:?}"),
    }

    // enough bars but none complete yet (every close identical makes the
    // stochastic range degenerate, so rows never fully define)
    let flat: Vec<_> = (0..55)
        .map(|i| {
            let mut bar = make_bar("FLAT", date(2024, 1, 1) + chrono::Days::new(i), 100.0);
            bar.high = 100.0;
            bar.low = 100.0;
            bar
        })
        .collect();
    let store = MockStore::with_bars("FLAT", flat);
    match generate_for_symbol(&store, &predictor, "FLAT", &config) {
        Err(PilotError::UndefinedFeature { symbol }) => assert_eq!(symbol, "FLAT"),
        other => panic!("expected UndefinedFeature, got: {other:?}"),
    }
}

#[test]
fn generation_without_predictor_is_an_operator_error() {
    let store = MockStore::with_bars("ACME", generate_bars("ACME", 60, 100.0));
    let config = SignalConfig::new(OffsetProfile::Standard);

    let result = generate_for_universe(&store, None, &["ACME".to_string()], &config);
    assert!(matches!(result, Err(PilotError::PredictorUnavailable)));
}

#[test]
fn one_bad_symbol_does_not_abort_the_batch() {
    let store = MockStore::with_bars("ACME", generate_bars("ACME", 60, 100.0));
    store.add_bars("GLOBEX", generate_bars("GLOBEX", 60, 50.0));
    let predictor = StubPredictor::buy(62.0);
    let config = SignalConfig::new(OffsetProfile::Standard);

    // MISSING has no history at all; it is skipped, the others proceed
    let universe = vec![
        "ACME".to_string(),
        "MISSING".to_string(),
        "GLOBEX".to_string(),
    ];
    let report = generate_for_universe(&store, Some(&predictor), &universe, &config).unwrap();

    assert_eq!(report.generated, 2);
    assert_eq!(report.total_symbols, 3);
    assert_eq!(store.signals.borrow().len(), 2);
}

#[test]
fn evaluation_round_trip_and_idempotence() {
    let store = MockStore::new();
    store
        .signals
        .borrow_mut()
        .push(buy_signal("ACME", 100.0, 104.0, 98.0, date(2024, 3, 1)));

    // the pre-issue spike must not count toward the realized window
    store.add_bars("ACME", vec![make_bar("ACME", date(2024, 2, 28), 300.0)]);
    store.add_bars("ACME", vec![make_bar("ACME", date(2024, 3, 4), 104.5)]);

    let summary = TradeEvaluator::new(&store)
        .evaluate_open_trades(date(2024, 3, 8))
        .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.target_hit, 1);
    assert!((summary.success_rate - 100.0).abs() < 1e-9);

    let record = &summary.records[0];
    assert_eq!(record.outcome, TradeOutcome::TargetHit);
    assert!((record.exit_price - 104.0).abs() < f64::EPSILON);
    assert!((record.profit_loss - 4.0).abs() < 1e-12);
    assert!((record.profit_loss_percent - 4.0).abs() < 1e-12);
    assert_eq!(record.entry_date, date(2024, 3, 1));
    assert_eq!(record.exit_date, date(2024, 3, 8));
    assert_eq!(store.records.borrow().len(), 1);

    // a second run finds nothing left to judge
    let summary = TradeEvaluator::new(&store)
        .evaluate_open_trades(date(2024, 3, 8))
        .unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.success_rate, 0.0);
    assert_eq!(store.records.borrow().len(), 1);
}

#[test]
fn same_day_trades_are_not_evaluated() {
    let store = MockStore::new();
    store
        .signals
        .borrow_mut()
        .push(buy_signal("ACME", 100.0, 104.0, 98.0, date(2024, 3, 1)));
    store.add_bars("ACME", vec![make_bar("ACME", date(2024, 3, 1), 110.0)]);

    let summary = TradeEvaluator::new(&store)
        .evaluate_open_trades(date(2024, 3, 1))
        .unwrap();
    assert_eq!(summary.total, 0);
    assert!(store.evaluated.borrow().is_empty());
}

#[test]
fn mixed_batch_counts_each_outcome() {
    let store = MockStore::new();
    {
        let mut signals = store.signals.borrow_mut();
        signals.push(buy_signal("WIN", 100.0, 104.0, 98.0, date(2024, 3, 1)));
        signals.push(buy_signal("LOSE", 100.0, 104.0, 98.0, date(2024, 3, 1)));
        signals.push(buy_signal("FLAT", 100.0, 104.0, 98.0, date(2024, 3, 1)));
    }
    store.add_bars("WIN", vec![make_bar("WIN", date(2024, 3, 4), 104.5)]);
    store.add_bars("LOSE", vec![make_bar("LOSE", date(2024, 3, 4), 98.0)]);
    store.add_bars("FLAT", vec![make_bar("FLAT", date(2024, 3, 4), 101.5)]);

    let summary = TradeEvaluator::new(&store)
        .evaluate_open_trades(date(2024, 3, 8))
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.target_hit, 1);
    assert_eq!(summary.stop_loss_hit, 1);
    assert_eq!(summary.closed_neutral, 1);
    assert!((summary.success_rate - 33.33).abs() < 1e-9);

    let neutral = summary
        .records
        .iter()
        .find(|r| r.outcome == TradeOutcome::ClosedNeutral)
        .unwrap();
    assert!((neutral.exit_price - 101.5).abs() < f64::EPSILON);
}

#[test]
fn failed_save_leaves_trade_open_for_retry() {
    let store = MockStore::new();
    store
        .signals
        .borrow_mut()
        .push(buy_signal("ACME", 100.0, 104.0, 98.0, date(2024, 3, 1)));
    store.add_bars("ACME", vec![make_bar("ACME", date(2024, 3, 4), 104.5)]);

    store.fail_saves.set(true);
    let summary = TradeEvaluator::new(&store)
        .evaluate_open_trades(date(2024, 3, 8))
        .unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(store.evaluated.borrow().is_empty());

    store.fail_saves.set(false);
    let summary = TradeEvaluator::new(&store)
        .evaluate_open_trades(date(2024, 3, 8))
        .unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.target_hit, 1);
}

#[test]
fn backtest_rising_series_closes_neutral_with_gains() {
    let histories = vec![("ACME".to_string(), generate_bars("ACME", 120, 100.0))];
    let predictor = StubPredictor::buy(62.0);
    let config = BacktestConfig::new(OffsetProfile::Standard);

    let report = simulate(&histories, &predictor, &config).unwrap();

    // 120 bars -> 71 complete rows; warmup 50 and horizon 5 leave 16 entries
    assert_eq!(report.total_trades, 16);
    assert_eq!(report.closed_neutral, 16);
    assert_eq!(report.target_hit, 0);
    assert_eq!(report.stop_loss_hit, 0);
    assert_eq!(report.success_rate, 0.0);
    assert!(report.skipped.is_empty());

    // +0.5/day for 5 bars from the entry close
    for trade in &report.trades {
        assert_eq!(trade.outcome, TradeOutcome::ClosedNeutral);
        assert!((trade.profit_loss - 2.5).abs() < 1e-9);
        assert!(trade.profit_loss_percent > 0.0);
    }
    assert!(report.sharpe_ratio > 0.0);
    assert_eq!(report.max_drawdown, 0.0);
}

#[test]
fn backtest_skips_thin_history_with_a_note() {
    let histories = vec![("ACME".to_string(), generate_bars("ACME", 50, 100.0))];
    let predictor = StubPredictor::buy(62.0);
    let config = BacktestConfig::new(OffsetProfile::Standard);

    let report = simulate(&histories, &predictor, &config).unwrap();
    assert_eq!(report.total_trades, 0);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].starts_with("ACME"));
}

#[test]
fn backtest_hold_predictor_trades_nothing() {
    let histories = vec![("ACME".to_string(), generate_bars("ACME", 120, 100.0))];
    let predictor = StubPredictor::hold();
    let config = BacktestConfig::new(OffsetProfile::Standard);

    let report = simulate(&histories, &predictor, &config).unwrap();
    assert_eq!(report.total_trades, 0);
    assert_eq!(report.sharpe_ratio, 0.0);
}

#[test]
fn backtest_low_confidence_signals_are_not_traded() {
    let histories = vec![("ACME".to_string(), generate_bars("ACME", 120, 100.0))];
    let predictor = StubPredictor::buy(35.0);
    let config = BacktestConfig::new(OffsetProfile::Standard);

    let report = simulate(&histories, &predictor, &config).unwrap();
    assert_eq!(report.total_trades, 0);
}

#[cfg(feature = "sqlite")]
mod sqlite_flow {
    use super::*;
    use stockpilot::adapters::sqlite_store::SqliteStore;
    use stockpilot::ports::store_port::StorePort;

    #[test]
    fn generate_then_evaluate_through_sqlite() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize_schema().unwrap();
        store
            .insert_bars(&generate_bars("ACME", 60, 100.0))
            .unwrap();

        let predictor = StubPredictor::buy(62.0);
        let config = SignalConfig::new(OffsetProfile::Standard);
        let report =
            generate_for_universe(&store, Some(&predictor), &["ACME".to_string()], &config)
                .unwrap();
        assert_eq!(report.generated, 1);

        // price runs through the target after issue
        store
            .insert_bars(&[make_bar("ACME", date(2024, 3, 5), 136.0)])
            .unwrap();

        let summary = TradeEvaluator::new(&store)
            .evaluate_open_trades(date(2024, 3, 10))
            .unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.target_hit, 1);

        let records = store.performance_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, TradeOutcome::TargetHit);

        // lifecycle flag is persisted; nothing left on a second pass
        let summary = TradeEvaluator::new(&store)
            .evaluate_open_trades(date(2024, 3, 10))
            .unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(store.performance_records().unwrap().len(), 1);
    }
}
