//! Domain error types.

/// Top-level error type for stockpilot.
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("store query error: {reason}")]
    StoreQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient history for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("undefined feature in latest row for {symbol}")]
    UndefinedFeature { symbol: String },

    #[error("no trained predictor available")]
    PredictorUnavailable,

    #[error("predictor error: {reason}")]
    Predictor { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PilotError> for std::process::ExitCode {
    fn from(err: &PilotError) -> Self {
        let code: u8 = match err {
            PilotError::Io(_) => 1,
            PilotError::ConfigParse { .. }
            | PilotError::ConfigMissing { .. }
            | PilotError::ConfigInvalid { .. } => 2,
            PilotError::Store { .. } | PilotError::StoreQuery { .. } => 3,
            PilotError::PredictorUnavailable | PilotError::Predictor { .. } => 4,
            PilotError::InsufficientHistory { .. } | PilotError::UndefinedFeature { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
