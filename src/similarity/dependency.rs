use super::{Scorer, SimilarityEvaluator, Strategy, clamp_score, dice};
use crate::error::EvaluatorError;
use crate::model::ElementRef;

/// Scores elements by what they depend on: the names of their declared
/// type, supertypes and opposite reference.
pub struct DependencyEvaluator {
    weight: f32,
    scorer: Scorer,
}

impl DependencyEvaluator {
    pub fn new(weight: f32) -> Self {
        Self {
            weight,
            scorer: Box::new(dependency_overlap),
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

impl Default for DependencyEvaluator {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl SimilarityEvaluator for DependencyEvaluator {
    fn strategy(&self) -> Strategy {
        Strategy::Dependency
    }

    fn initial_weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, from: ElementRef<'_>, to: ElementRef<'_>) -> Result<f32, EvaluatorError> {
        Ok(clamp_score((self.scorer)(from, to)))
    }
}

/// Names of referenced targets; ids stand in for targets outside the model.
fn dependency_names(element: ElementRef<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for (feature, value) in element.slots() {
        if !feature.is_cross_reference() || element.kind().is_diff_ignored(feature) {
            continue;
        }
        for id in value.referenced_ids() {
            let name = element
                .resolve(id)
                .and_then(|target| target.name())
                .unwrap_or(id.as_str());
            names.push(name.to_string());
        }
    }
    names
}

fn dependency_overlap(from: ElementRef<'_>, to: ElementRef<'_>) -> f32 {
    dice(&dependency_names(from), &dependency_names(to))
}
