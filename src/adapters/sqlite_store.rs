//! SQLite store adapter.
//!
//! Three tables: `prices` (raw bars), `recommendations` (signals with their
//! lifecycle flag), `trade_performance` (one row per evaluated trade).

use crate::domain::bar::PriceBar;
use crate::domain::error::PilotError;
use crate::domain::signal::{Action, Signal};
use crate::domain::trade::{Trade, TradeOutcome, TradePerformanceRecord, TradeStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> PilotError {
    PilotError::Store {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> PilotError {
    PilotError::StoreQuery {
        reason: e.to_string(),
    }
}

fn column_err(idx: usize, reason: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::other(reason)),
    )
}

fn parse_date_column(idx: usize, s: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| column_err(idx, format!("invalid date {:?}: {}", s, e)))
}

fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PilotError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| PilotError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, PilotError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS prices (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                PRIMARY KEY (symbol, date)
            );
            CREATE INDEX IF NOT EXISTS idx_prices_symbol ON prices(symbol);
            CREATE INDEX IF NOT EXISTS idx_prices_date ON prices(date);
            CREATE TABLE IF NOT EXISTS recommendations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL,
                action TEXT NOT NULL,
                confidence REAL NOT NULL,
                entry_price REAL NOT NULL,
                target_price REAL NOT NULL,
                stop_loss REAL NOT NULL,
                analysis TEXT NOT NULL,
                issued_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                is_evaluated INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_recommendations_open
                ON recommendations(is_evaluated, issued_at);
            CREATE TABLE IF NOT EXISTS trade_performance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trade_id INTEGER NOT NULL,
                symbol TEXT NOT NULL,
                entry_price REAL NOT NULL,
                target_price REAL NOT NULL,
                stop_loss REAL NOT NULL,
                exit_price REAL NOT NULL,
                entry_date TEXT NOT NULL,
                exit_date TEXT NOT NULL,
                outcome TEXT NOT NULL,
                profit_loss REAL NOT NULL,
                profit_loss_percent REAL NOT NULL,
                high_during_window REAL NOT NULL,
                low_during_window REAL NOT NULL
            );",
        )
        .map_err(query_err)?;

        Ok(())
    }

    /// Distinct symbols with price history, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_err)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_err)?);
        }
        Ok(symbols)
    }

    /// Every saved performance record, oldest exit first.
    pub fn performance_records(&self) -> Result<Vec<TradePerformanceRecord>, PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        let mut stmt = conn
            .prepare(
                "SELECT trade_id, symbol, entry_price, target_price, stop_loss, exit_price,
                        entry_date, exit_date, outcome, profit_loss, profit_loss_percent,
                        high_during_window, low_during_window
                 FROM trade_performance
                 ORDER BY exit_date ASC, id ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                let entry_date_str: String = row.get(6)?;
                let exit_date_str: String = row.get(7)?;
                let outcome_str: String = row.get(8)?;
                let outcome = TradeOutcome::parse(&outcome_str)
                    .ok_or_else(|| column_err(8, format!("unknown outcome {:?}", outcome_str)))?;
                Ok(TradePerformanceRecord {
                    trade_id: row.get(0)?,
                    symbol: row.get(1)?,
                    entry_price: row.get(2)?,
                    target_price: row.get(3)?,
                    stop_loss: row.get(4)?,
                    exit_price: row.get(5)?,
                    entry_date: parse_date_column(6, &entry_date_str)?,
                    exit_date: parse_date_column(7, &exit_date_str)?,
                    outcome,
                    profit_loss: row.get(9)?,
                    profit_loss_percent: row.get(10)?,
                    high_during_window: row.get(11)?,
                    low_during_window: row.get(12)?,
                })
            })
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_err)?);
        }
        Ok(records)
    }
}

impl StorePort for SqliteStore {
    fn get_historical_prices(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<PriceBar>, PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        // Newest `limit` rows, then flipped back to ascending.
        let mut stmt = conn
            .prepare(
                "SELECT symbol, date, open, high, low, close, volume
                 FROM prices WHERE symbol = ?1
                 ORDER BY date DESC LIMIT ?2",
            )
            .map_err(query_err)?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![symbol, limit], |row| {
                let date_s: String = row.get(1)?;
                Ok(PriceBar {
                    symbol: row.get(0)?,
                    date: parse_date_column(1, &date_s)?,
                    open: row.get(2)?,
                    high: row.get(3)?,
                    low: row.get(4)?,
                    close: row.get(5)?,
                    volume: row.get(6)?,
                })
            })
            .map_err(query_err)?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row.map_err(query_err)?);
        }
        bars.reverse();
        Ok(bars)
    }

    fn get_open_trades(&self, before: NaiveDate) -> Result<Vec<Trade>, PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        let mut stmt = conn
            .prepare(
                "SELECT id, symbol, action, entry_price, target_price, stop_loss,
                        confidence, issued_at, status, is_evaluated
                 FROM recommendations
                 WHERE is_evaluated = 0 AND status = 'active' AND issued_at < ?1
                 ORDER BY id ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![date_str(before)], |row| {
                let action_str: String = row.get(2)?;
                let action = Action::parse(&action_str)
                    .ok_or_else(|| column_err(2, format!("unknown action {:?}", action_str)))?;
                let issued_str: String = row.get(7)?;
                let status_str: String = row.get(8)?;
                let status = TradeStatus::parse(&status_str)
                    .ok_or_else(|| column_err(8, format!("unknown status {:?}", status_str)))?;
                Ok(Trade {
                    id: row.get(0)?,
                    symbol: row.get(1)?,
                    action,
                    entry_price: row.get(3)?,
                    target_price: row.get(4)?,
                    stop_loss: row.get(5)?,
                    confidence: row.get(6)?,
                    issued_at: parse_date_column(7, &issued_str)?,
                    status,
                    is_evaluated: row.get::<_, i64>(9)? != 0,
                })
            })
            .map_err(query_err)?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(row.map_err(query_err)?);
        }
        Ok(trades)
    }

    fn insert_recommendation(&self, signal: &Signal) -> Result<i64, PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute(
            "INSERT INTO recommendations
                (symbol, action, confidence, entry_price, target_price, stop_loss,
                 analysis, issued_at, status, is_evaluated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'active', 0)",
            params![
                signal.symbol,
                signal.action.as_str(),
                signal.confidence,
                signal.entry_price,
                signal.target_price,
                signal.stop_loss,
                signal.analysis,
                date_str(signal.issued_at),
            ],
        )
        .map_err(query_err)?;

        Ok(conn.last_insert_rowid())
    }

    fn save_performance_record(&self, record: &TradePerformanceRecord) -> Result<(), PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute(
            "INSERT INTO trade_performance
                (trade_id, symbol, entry_price, target_price, stop_loss, exit_price,
                 entry_date, exit_date, outcome, profit_loss, profit_loss_percent,
                 high_during_window, low_during_window)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.trade_id,
                record.symbol,
                record.entry_price,
                record.target_price,
                record.stop_loss,
                record.exit_price,
                date_str(record.entry_date),
                date_str(record.exit_date),
                record.outcome.as_str(),
                record.profit_loss,
                record.profit_loss_percent,
                record.high_during_window,
                record.low_during_window,
            ],
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn mark_evaluated(&self, trade_id: i64) -> Result<(), PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute(
            "UPDATE recommendations
             SET is_evaluated = 1, status = 'evaluated'
             WHERE id = ?1",
            params![trade_id],
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn high_low_since(
        &self,
        symbol: &str,
        from: NaiveDate,
    ) -> Result<Option<(f64, f64)>, PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        let result: (Option<f64>, Option<f64>) = conn
            .query_row(
                "SELECT MAX(high), MIN(low) FROM prices WHERE symbol = ?1 AND date >= ?2",
                params![symbol, date_str(from)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(high), Some(low)) => Ok(Some((high, low))),
            _ => Ok(None),
        }
    }

    fn current_price(&self, symbol: &str) -> Result<Option<f64>, PilotError> {
        let conn = self.pool.get().map_err(pool_err)?;

        let mut stmt = conn
            .prepare("SELECT close FROM prices WHERE symbol = ?1 ORDER BY date DESC LIMIT 1")
            .map_err(query_err)?;

        let mut rows = stmt.query_map(params![symbol], |row| row.get(0)).map_err(query_err)?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(query_err)?)),
            None => Ok(None),
        }
    }

    fn insert_bars(&self, bars: &[PriceBar]) -> Result<(), PilotError> {
        let mut conn = self.pool.get().map_err(pool_err)?;

        let tx = conn.transaction().map_err(query_err)?;
        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bar.symbol,
                    date_str(bar.date),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(query_err)?;
        }
        tx.commit().map_err(query_err)?;

        Ok(())
    }
}
