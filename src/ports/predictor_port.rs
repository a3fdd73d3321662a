//! Predictor port trait.
//!
//! The trained classifier is an external collaborator; the core only needs
//! the two capabilities below over the fixed-order feature vector from
//! [`crate::domain::frame`]. A feature-set mismatch between the vector and
//! whatever the model was trained on is the caller's responsibility.

use crate::domain::error::PilotError;
use crate::domain::frame::FeatureVector;
use crate::domain::signal::Action;

/// Probability distribution over the three actions. Expected to sum to ~1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub buy: f64,
    pub hold: f64,
    pub sell: f64,
}

impl ClassProbabilities {
    /// The action with the highest probability.
    pub fn argmax(&self) -> Action {
        if self.buy >= self.hold && self.buy >= self.sell {
            Action::Buy
        } else if self.sell >= self.hold {
            Action::Sell
        } else {
            Action::Hold
        }
    }

    /// 100 * max probability.
    pub fn confidence(&self) -> f64 {
        100.0 * self.buy.max(self.hold).max(self.sell)
    }
}

pub trait PredictorPort {
    fn predict(&self, features: &FeatureVector) -> Result<Action, PilotError>;

    fn predict_probabilities(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, PilotError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_largest_class() {
        let p = ClassProbabilities {
            buy: 0.6,
            hold: 0.3,
            sell: 0.1,
        };
        assert_eq!(p.argmax(), Action::Buy);

        let p = ClassProbabilities {
            buy: 0.1,
            hold: 0.3,
            sell: 0.6,
        };
        assert_eq!(p.argmax(), Action::Sell);

        let p = ClassProbabilities {
            buy: 0.2,
            hold: 0.7,
            sell: 0.1,
        };
        assert_eq!(p.argmax(), Action::Hold);
    }

    #[test]
    fn confidence_is_scaled_max() {
        let p = ClassProbabilities {
            buy: 0.55,
            hold: 0.25,
            sell: 0.20,
        };
        assert!((p.confidence() - 55.0).abs() < 1e-12);
    }
}
