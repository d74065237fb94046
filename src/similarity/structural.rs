use super::{Scorer, SimilarityEvaluator, Strategy, clamp_score};
use crate::error::EvaluatorError;
use crate::model::{ElementRef, Feature};

/// Scores elements by how many of their plain attribute slots agree.
///
/// Names, containment and cross-references are left to the other
/// strategies. The scorer can be replaced with [`with_scorer`](Self::with_scorer).
pub struct StructuralEvaluator {
    weight: f32,
    scorer: Scorer,
}

impl StructuralEvaluator {
    pub fn new(weight: f32) -> Self {
        Self {
            weight,
            scorer: Box::new(slot_agreement),
        }
    }

    pub fn with_scorer(
        mut self,
        scorer: impl Fn(ElementRef<'_>, ElementRef<'_>) -> f32 + 'static,
    ) -> Self {
        self.scorer = Box::new(scorer);
        self
    }
}

impl Default for StructuralEvaluator {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl SimilarityEvaluator for StructuralEvaluator {
    fn strategy(&self) -> Strategy {
        Strategy::Structural
    }

    fn initial_weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, from: ElementRef<'_>, to: ElementRef<'_>) -> Result<f32, EvaluatorError> {
        Ok(clamp_score((self.scorer)(from, to)))
    }
}

fn slot_agreement(from: ElementRef<'_>, to: ElementRef<'_>) -> f32 {
    let mut total = 0usize;
    let mut agreeing = 0usize;
    for feature in from.kind().compared_slots() {
        if feature == Feature::Name || feature.is_containment() || feature.is_cross_reference() {
            continue;
        }
        total += 1;
        if from.get(feature) == to.get(feature) {
            agreeing += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        agreeing as f32 / total as f32
    }
}
