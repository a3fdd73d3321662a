//! CSV price-history loader.
//!
//! One file per symbol, `{SYMBOL}.csv`, with a `date,open,high,low,close,volume`
//! header and ISO dates. Used to seed the store and to feed the backtester
//! directly.

use crate::domain::bar::PriceBar;
use crate::domain::error::PilotError;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvLoader {
    base_path: PathBuf,
}

impl CsvLoader {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Load every bar for `symbol`, sorted ascending by date.
    pub fn load_symbol(&self, symbol: &str) -> Result<Vec<PriceBar>, PilotError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| PilotError::Store {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PilotError::Store {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let field = |idx: usize, name: &str| -> Result<&str, PilotError> {
                record.get(idx).ok_or_else(|| PilotError::Store {
                    reason: format!("missing {} column in {}", name, path.display()),
                })
            };

            let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
                PilotError::Store {
                    reason: format!("invalid date in {}: {}", path.display(), e),
                }
            })?;

            let number = |idx: usize, name: &str| -> Result<f64, PilotError> {
                field(idx, name)?.parse().map_err(|e| PilotError::Store {
                    reason: format!("invalid {} value in {}: {}", name, path.display(), e),
                })
            };

            let volume: i64 = field(5, "volume")?.parse().map_err(|e| PilotError::Store {
                reason: format!("invalid volume value in {}: {}", path.display(), e),
            })?;

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                open: number(1, "open")?,
                high: number(2, "high")?,
                low: number(3, "low")?,
                close: number(4, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Symbols with a CSV file in the base directory, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, PilotError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PilotError::Store {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PilotError::Store {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
