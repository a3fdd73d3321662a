//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_loader::CsvLoader;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::heuristic_predictor::HeuristicPredictor;
use crate::domain::backtest::{self, BacktestConfig};
use crate::domain::error::PilotError;
use crate::domain::signal::{OffsetProfile, SignalConfig};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "stockpilot", about = "Technical-indicator stock advisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate recommendations for every symbol in the store
    Generate {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbol override
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Evaluate open trades against realized prices
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluation date; trades issued strictly before it are judged
        #[arg(long)]
        as_of: NaiveDate,
    },
    /// Simulate the signal pipeline over stored history
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Read price history from a CSV directory instead of the store
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Load CSV price files into the store
    LoadCsv {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Summarize evaluated trade performance
    Performance {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Generate { config, symbols } => run_generate(&config, symbols.as_deref()),
        Command::Evaluate { config, as_of } => run_evaluate(&config, as_of),
        Command::Backtest {
            config,
            data_dir,
            symbols,
        } => run_backtest(&config, data_dir.as_ref(), symbols.as_deref()),
        Command::LoadCsv {
            config,
            dir,
            symbols,
        } => run_load_csv(&config, &dir, symbols.as_deref()),
        Command::Performance { config } => run_performance(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PilotError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: &PilotError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn build_signal_config(adapter: &dyn ConfigPort) -> Result<SignalConfig, PilotError> {
    let profile = required_profile(adapter)?;
    let mut config = SignalConfig::new(profile);
    config.history_limit =
        adapter.get_int("signals", "history_limit", config.history_limit as i64) as usize;
    config.min_history =
        adapter.get_int("signals", "min_history", config.min_history as i64) as usize;
    Ok(config)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, PilotError> {
    let profile = required_profile(adapter)?;
    let mut config = BacktestConfig::new(profile);
    config.min_confidence =
        adapter.get_double("backtest", "min_confidence", config.min_confidence);
    config.horizon = adapter.get_int("backtest", "horizon", config.horizon as i64) as usize;
    config.warmup = adapter.get_int("backtest", "warmup", config.warmup as i64) as usize;
    Ok(config)
}

/// `[signals] profile` has no default: the two profiles give different
/// levels and picking one silently would bury the choice.
fn required_profile(adapter: &dyn ConfigPort) -> Result<OffsetProfile, PilotError> {
    let raw = adapter
        .get_string("signals", "profile")
        .ok_or_else(|| PilotError::ConfigMissing {
            section: "signals".into(),
            key: "profile".into(),
        })?;
    OffsetProfile::parse(&raw).ok_or_else(|| PilotError::ConfigInvalid {
        section: "signals".into(),
        key: "profile".into(),
        reason: format!("{:?} is not one of: standard, wide", raw),
    })
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn run_generate(config_path: &PathBuf, symbols: Option<&str>) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_store::SqliteStore;
        use crate::domain::signal::generate_for_universe;

        eprintln!("Loading config from {}", config_path.display());
        let adapter = match load_config(config_path) {
            Ok(a) => a,
            Err(code) => return code,
        };

        let signal_config = match build_signal_config(&adapter) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        };

        let store = match SqliteStore::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        if let Err(e) = store.initialize_schema() {
            return fail(&e);
        }

        let universe = match symbols {
            Some(raw) => parse_symbols(raw),
            None => match store.list_symbols() {
                Ok(s) => s,
                Err(e) => return fail(&e),
            },
        };
        eprintln!("Generating signals for {} symbols", universe.len());

        let predictor = HeuristicPredictor::new();
        let report = match generate_for_universe(&store, Some(&predictor), &universe, &signal_config)
        {
            Ok(r) => r,
            Err(e) => return fail(&e),
        };

        println!(
            "Generated {} signals from {} symbols",
            report.generated, report.total_symbols
        );
        for err in &report.errors {
            eprintln!("warning: {err}");
        }
        ExitCode::SUCCESS
    }
    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config_path, symbols);
        eprintln!("error: built without sqlite support");
        ExitCode::from(3)
    }
}

fn run_evaluate(config_path: &PathBuf, as_of: NaiveDate) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_store::SqliteStore;
        use crate::domain::evaluator::TradeEvaluator;

        eprintln!("Loading config from {}", config_path.display());
        let adapter = match load_config(config_path) {
            Ok(a) => a,
            Err(code) => return code,
        };

        let store = match SqliteStore::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        if let Err(e) = store.initialize_schema() {
            return fail(&e);
        }

        eprintln!("Evaluating trades open before {as_of}");
        let summary = match TradeEvaluator::new(&store).evaluate_open_trades(as_of) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };

        println!(
            "Evaluated {} trades: {} target hit, {} stopped out, {} closed neutral ({:.2}% success)",
            summary.total,
            summary.target_hit,
            summary.stop_loss_hit,
            summary.closed_neutral,
            summary.success_rate
        );
        for err in &summary.errors {
            eprintln!("warning: {err}");
        }
        ExitCode::SUCCESS
    }
    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config_path, as_of);
        eprintln!("error: built without sqlite support");
        ExitCode::from(3)
    }
}

fn run_backtest(
    config_path: &PathBuf,
    data_dir: Option<&PathBuf>,
    symbols: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let histories = match load_histories(&adapter, data_dir, symbols) {
        Ok(h) => h,
        Err(e) => return fail(&e),
    };
    eprintln!("Backtesting {} symbols", histories.len());

    let predictor = HeuristicPredictor::new();
    let report = match backtest::simulate(&histories, &predictor, &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    println!("Trades: {}", report.total_trades);
    println!(
        "Outcomes: {} target hit, {} stopped out, {} closed neutral",
        report.target_hit, report.stop_loss_hit, report.closed_neutral
    );
    println!("Success rate: {:.2}%", report.success_rate);
    println!("Total P&L: {:.2}", report.total_profit_loss);
    println!("Avg P&L per trade: {:.2}%", report.avg_profit_loss_percent);
    println!("Sharpe ratio: {:.4}", report.sharpe_ratio);
    println!("Max drawdown: {:.4}", report.max_drawdown);
    for note in &report.skipped {
        eprintln!("skipped {note}");
    }
    ExitCode::SUCCESS
}

fn load_histories(
    adapter: &FileConfigAdapter,
    data_dir: Option<&PathBuf>,
    symbols: Option<&str>,
) -> Result<Vec<(String, Vec<crate::domain::bar::PriceBar>)>, PilotError> {
    if let Some(dir) = data_dir {
        let loader = CsvLoader::new(dir.clone());
        let universe = match symbols {
            Some(raw) => parse_symbols(raw),
            None => loader.list_symbols()?,
        };
        let mut histories = Vec::new();
        for symbol in universe {
            let bars = loader.load_symbol(&symbol)?;
            histories.push((symbol, bars));
        }
        return Ok(histories);
    }

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_store::SqliteStore;
        use crate::ports::store_port::StorePort;

        let store = SqliteStore::from_config(adapter)?;
        store.initialize_schema()?;
        let universe = match symbols {
            Some(raw) => parse_symbols(raw),
            None => store.list_symbols()?,
        };
        let mut histories = Vec::new();
        for symbol in universe {
            let bars = store.get_historical_prices(&symbol, usize::MAX)?;
            histories.push((symbol, bars));
        }
        Ok(histories)
    }
    #[cfg(not(feature = "sqlite"))]
    {
        let _ = adapter;
        Err(PilotError::Store {
            reason: "built without sqlite support; pass --data-dir".into(),
        })
    }
}

fn run_load_csv(config_path: &PathBuf, dir: &PathBuf, symbols: Option<&str>) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_store::SqliteStore;
        use crate::ports::store_port::StorePort;

        eprintln!("Loading config from {}", config_path.display());
        let adapter = match load_config(config_path) {
            Ok(a) => a,
            Err(code) => return code,
        };

        let store = match SqliteStore::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        if let Err(e) = store.initialize_schema() {
            return fail(&e);
        }

        let loader = CsvLoader::new(dir.clone());
        let universe = match symbols {
            Some(raw) => parse_symbols(raw),
            None => match loader.list_symbols() {
                Ok(s) => s,
                Err(e) => return fail(&e),
            },
        };

        let mut loaded = 0usize;
        for symbol in &universe {
            let bars = match loader.load_symbol(symbol) {
                Ok(b) => b,
                Err(e) => return fail(&e),
            };
            if let Err(e) = store.insert_bars(&bars) {
                return fail(&e);
            }
            loaded += bars.len();
            eprintln!("Loaded {} bars for {}", bars.len(), symbol);
        }
        println!("Loaded {} bars across {} symbols", loaded, universe.len());
        ExitCode::SUCCESS
    }
    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config_path, dir, symbols);
        eprintln!("error: built without sqlite support");
        ExitCode::from(3)
    }
}

fn run_performance(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_store::SqliteStore;
        use crate::domain::evaluator::PerformanceSummary;

        eprintln!("Loading config from {}", config_path.display());
        let adapter = match load_config(config_path) {
            Ok(a) => a,
            Err(code) => return code,
        };

        let store = match SqliteStore::from_config(&adapter) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        if let Err(e) = store.initialize_schema() {
            return fail(&e);
        }

        let records = match store.performance_records() {
            Ok(r) => r,
            Err(e) => return fail(&e),
        };
        let summary = PerformanceSummary::from_records(&records);

        println!("Trades evaluated: {}", summary.total_trades);
        println!(
            "Outcomes: {} target hit, {} stopped out, {} closed neutral",
            summary.successful, summary.failed, summary.neutral
        );
        println!("Success rate: {:.2}%", summary.success_rate);
        println!("Avg return: {:.2}%", summary.avg_return_percent);
        println!("Total P&L: {:.2}", summary.total_profit_loss);
        if summary.total_trades > 0 {
            println!("Best trade: {:.2}%", summary.best_trade_percent);
            println!("Worst trade: {:.2}%", summary.worst_trade_percent);
        }
        ExitCode::SUCCESS
    }
    #[cfg(not(feature = "sqlite"))]
    {
        let _ = config_path;
        eprintln!("error: built without sqlite support");
        ExitCode::from(3)
    }
}
