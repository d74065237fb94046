//! Script-driven similarity.
//!
//! A [`ComparisonScript`] runs once per model pair (out of band, in
//! [`SimilarityEvaluator::prepare`]) and leaves a [`ScriptTrace`] of the
//! pairs it matched. Per-pair evaluation is then a table lookup.

use rustc_hash::FxHashMap;

use super::{SimilarityEvaluator, Strategy, clamp_score};
use crate::error::EvaluatorError;
use crate::model::{ElementId, ElementRef, Model};

/// Pairwise scores recorded by a script run.
#[derive(Clone, Debug, Default)]
pub struct ScriptTrace {
    scores: FxHashMap<(ElementId, ElementId), f32>,
}

impl ScriptTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, from: impl Into<ElementId>, to: impl Into<ElementId>, score: f32) {
        self.scores
            .insert((from.into(), to.into()), clamp_score(score));
    }

    pub fn score(&self, from: &ElementId, to: &ElementId) -> Option<f32> {
        self.scores.get(&(from.clone(), to.clone())).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// An externally compiled comparison script.
pub trait ComparisonScript {
    fn execute(&self, from: &Model, to: &Model) -> Result<ScriptTrace, EvaluatorError>;
}

impl<F> ComparisonScript for F
where
    F: Fn(&Model, &Model) -> Result<ScriptTrace, EvaluatorError>,
{
    fn execute(&self, from: &Model, to: &Model) -> Result<ScriptTrace, EvaluatorError> {
        self(from, to)
    }
}

enum ScriptState {
    Pending,
    Ready(ScriptTrace),
    Failed(EvaluatorError),
}

/// Looks up scores from a prepared script trace; unmatched pairs score 0.0.
pub struct ScriptEvaluator {
    weight: f32,
    script: Box<dyn ComparisonScript>,
    state: ScriptState,
}

impl ScriptEvaluator {
    pub fn new(script: impl ComparisonScript + 'static, weight: f32) -> Self {
        Self {
            weight,
            script: Box::new(script),
            state: ScriptState::Pending,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ScriptState::Ready(_))
    }
}

impl SimilarityEvaluator for ScriptEvaluator {
    fn strategy(&self) -> Strategy {
        Strategy::Script
    }

    fn initial_weight(&self) -> f32 {
        self.weight
    }

    fn prepare(&mut self, from: &Model, to: &Model) -> Result<(), EvaluatorError> {
        match self.script.execute(from, to) {
            Ok(trace) => {
                tracing::debug!(pairs = trace.len(), "comparison script executed");
                self.state = ScriptState::Ready(trace);
                Ok(())
            }
            Err(err) => {
                self.state = ScriptState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn evaluate(&self, from: ElementRef<'_>, to: ElementRef<'_>) -> Result<f32, EvaluatorError> {
        match &self.state {
            ScriptState::Pending => Err(EvaluatorError::NotPrepared(Strategy::Script)),
            ScriptState::Failed(err) => Err(err.clone()),
            ScriptState::Ready(trace) => Ok(match (from.id(), to.id()) {
                (Some(a), Some(b)) => trace.score(a, b).unwrap_or(0.0),
                _ => 0.0,
            }),
        }
    }
}
