//! Core domain types and logic.

pub mod backtest;
pub mod bar;
pub mod error;
pub mod evaluator;
pub mod frame;
pub mod indicator;
pub mod signal;
pub mod trade;
