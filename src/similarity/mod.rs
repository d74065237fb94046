//! Similarity evaluators.
//!
//! Each evaluator scores an ordered pair of same-kind elements in `[0, 1]`.
//! Scores are not required to be symmetric. Evaluators are pluggable: the
//! matcher only sees the [`SimilarityEvaluator`] trait.
//!
//! | Strategy     | Evidence                                        |
//! |--------------|-------------------------------------------------|
//! | Identity     | textual id equality                             |
//! | Lexical      | bigram overlap of camel-hump name tokens        |
//! | Structural   | agreement of attribute slots                    |
//! | Dependency   | overlap of cross-referenced target names        |
//! | Historical   | overlap of recorded change kinds                |
//! | Script       | scores precomputed by an external script        |

mod dependency;
mod historical;
mod identity;
mod lexical;
mod script;
mod structural;

pub use dependency::DependencyEvaluator;
pub use historical::HistoricalEvaluator;
pub use identity::IdentityEvaluator;
pub use lexical::{LexicalEvaluator, bigrams, humps, name_similarity};
pub use script::{ComparisonScript, ScriptEvaluator, ScriptTrace};
pub use structural::StructuralEvaluator;

use crate::error::EvaluatorError;
use crate::model::{ElementRef, Model};

/// Identifies an evaluator family; configuration keys weights by strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Strategy {
    Identity,
    Lexical,
    Structural,
    Dependency,
    Historical,
    Script,
}

/// Pluggable scoring function used by structural/dependency/historical
/// evaluators. Must be deterministic and free of I/O.
pub type Scorer = Box<dyn Fn(ElementRef<'_>, ElementRef<'_>) -> f32>;

/// A similarity strategy.
pub trait SimilarityEvaluator {
    /// The strategy this evaluator implements.
    fn strategy(&self) -> Strategy;

    /// Weight used when configuration does not override the strategy's weight.
    fn initial_weight(&self) -> f32;

    /// Score `from` against `to` in `[0, 1]`.
    fn evaluate(&self, from: ElementRef<'_>, to: ElementRef<'_>) -> Result<f32, EvaluatorError>;

    /// One-time setup per model pair, run before any `evaluate` call.
    fn prepare(&mut self, _from: &Model, _to: &Model) -> Result<(), EvaluatorError> {
        Ok(())
    }
}

/// Dice coefficient of two multisets: each `to` item is consumed at most once.
pub(crate) fn dice<T: PartialEq>(from: &[T], to: &[T]) -> f32 {
    let total = from.len() + to.len();
    if total == 0 {
        return 0.0;
    }
    let mut remaining: Vec<&T> = to.iter().collect();
    let mut matched = 0usize;
    for item in from {
        if let Some(pos) = remaining.iter().position(|r| *r == item) {
            remaining.swap_remove(pos);
            matched += 1;
        }
    }
    (2 * matched) as f32 / total as f32
}

pub(crate) fn clamp_score(score: f32) -> f32 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}
