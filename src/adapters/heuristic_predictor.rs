//! Rule-of-thumb predictor.
//!
//! Stands in for a trained classifier wherever none is deployed: scores the
//! feature vector with classic overbought/oversold and trend-alignment
//! checks and votes. Deterministic, so backtests against it are repeatable.

use crate::domain::error::PilotError;
use crate::domain::frame::FeatureVector;
use crate::domain::signal::Action;
use crate::ports::predictor_port::{ClassProbabilities, PredictorPort};

fn sign_vote(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

pub struct HeuristicPredictor;

impl HeuristicPredictor {
    pub fn new() -> Self {
        Self
    }

    /// Net bullish votes in [-6, 6].
    fn score(features: &FeatureVector) -> i32 {
        let mut score = 0;

        if features.rsi < 30.0 {
            score += 2;
        } else if features.rsi > 70.0 {
            score -= 2;
        }

        score += sign_vote(features.macd_diff);
        score += sign_vote(features.sma_20 - features.sma_50);

        if features.stoch_k < 20.0 {
            score += 1;
        } else if features.stoch_k > 80.0 {
            score -= 1;
        }

        score += sign_vote(features.price_change_5d);

        score
    }
}

impl Default for HeuristicPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorPort for HeuristicPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<Action, PilotError> {
        let score = Self::score(features);
        Ok(if score >= 2 {
            Action::Buy
        } else if score <= -2 {
            Action::Sell
        } else {
            Action::Hold
        })
    }

    fn predict_probabilities(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, PilotError> {
        let score = Self::score(features);
        let lead = (0.5 + 0.08 * score.unsigned_abs() as f64).min(0.9);
        let rest = (1.0 - lead) / 2.0;

        Ok(if score >= 2 {
            ClassProbabilities {
                buy: lead,
                hold: rest,
                sell: rest,
            }
        } else if score <= -2 {
            ClassProbabilities {
                buy: rest,
                hold: rest,
                sell: lead,
            }
        } else {
            ClassProbabilities {
                buy: rest,
                hold: lead,
                sell: rest,
            }
        })
    }
}
