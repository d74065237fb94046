use super::{SimilarityEvaluator, Strategy};
use crate::error::EvaluatorError;
use crate::model::ElementRef;

/// 1.0 iff both elements carry the same id, else 0.0.
#[derive(Clone, Debug)]
pub struct IdentityEvaluator {
    weight: f32,
}

impl IdentityEvaluator {
    pub fn new(weight: f32) -> Self {
        Self { weight }
    }
}

impl Default for IdentityEvaluator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SimilarityEvaluator for IdentityEvaluator {
    fn strategy(&self) -> Strategy {
        Strategy::Identity
    }

    fn initial_weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, from: ElementRef<'_>, to: ElementRef<'_>) -> Result<f32, EvaluatorError> {
        Ok(match (from.id(), to.id()) {
            (Some(a), Some(b)) if a.as_str() == b.as_str() => 1.0,
            _ => 0.0,
        })
    }
}
