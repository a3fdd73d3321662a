//! stockpilot — ML-assisted stock recommendation engine.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. The trained classifier is an
//! external collaborator injected through [`ports::predictor_port::PredictorPort`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
