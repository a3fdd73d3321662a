//! Concrete implementations of the ports.

pub mod csv_loader;
pub mod file_config_adapter;
pub mod heuristic_predictor;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
