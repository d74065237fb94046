use super::{Scorer, SimilarityEvaluator, Strategy, clamp_score, dice};
use crate::changes::{ChangeKind, ChangeLog};
use crate::error::EvaluatorError;
use crate::model::ElementRef;

/// Scores elements by how alike their recorded change histories are.
///
/// By default each element's history is the multiset of change kinds the
/// log holds for its id, and two histories are compared with the Dice
/// coefficient. Elements without history score 0.0. The scorer can be
/// replaced with [`with_scorer`](Self::with_scorer).
pub struct HistoricalEvaluator {
    weight: f32,
    scorer: Scorer,
}

impl HistoricalEvaluator {
    pub fn new(log: ChangeLog, weight: f32) -> Self {
        Self {
            weight,
            scorer: Box::new(move |from, to| dice(&history(&log, from), &history(&log, to))),
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

fn history(log: &ChangeLog, element: ElementRef<'_>) -> Vec<ChangeKind> {
    match element.id() {
        Some(id) => log.records_for(id).map(|r| r.kind).collect(),
        None => Vec::new(),
    }
}

impl SimilarityEvaluator for HistoricalEvaluator {
    fn strategy(&self) -> Strategy {
        Strategy::Historical
    }

    fn initial_weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, from: ElementRef<'_>, to: ElementRef<'_>) -> Result<f32, EvaluatorError> {
        Ok(clamp_score((self.scorer)(from, to)))
    }
}
