//! Error types for matching and differencing.

use thiserror::Error;

use crate::model::{ElementId, ElementKind, Feature, NodeId};
use crate::similarity::Strategy;

/// Errors raised while building or editing a [`Model`](crate::model::Model).
#[derive(Debug, Error)]
pub enum ModelError {
    /// Two elements of one snapshot claim the same id.
    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),

    /// A handle that does not belong to the model.
    #[error("Unknown node handle: {0:?}")]
    UnknownNode(NodeId),

    /// A containment edge through a slot the owner cannot hold children in.
    #[error("Invalid containment: {kind} has no containment slot {feature:?}")]
    InvalidContainment { kind: ElementKind, feature: Feature },
}

/// Structural inconsistencies. Fatal to the current comparison.
#[derive(Debug, Error)]
pub enum DiffError {
    /// An id registered twice in the diff graph index.
    #[error("Id collision in diff graph: {key} ({kind})")]
    IdCollision { key: String, kind: ElementKind },

    /// A container that has an id but no counterpart in the diff graph.
    #[error("Unresolved container {container} of {id} ({kind})")]
    UnresolvedContainer {
        id: ElementId,
        container: ElementId,
        kind: ElementKind,
    },
}

/// A strategy could not score a pair. Recoverable: the pair is scored
/// without that strategy.
#[derive(Debug, Clone, Error)]
pub enum EvaluatorError {
    /// The comparison script failed to compile or execute.
    #[error("Script compilation failed: {0}")]
    ScriptCompile(String),

    /// The strategy needs a setup call that has not run.
    #[error("{0:?} evaluator used before prepare()")]
    NotPrepared(Strategy),

    /// Any other scoring failure.
    #[error("{strategy:?} evaluator failed: {message}")]
    Failed { strategy: Strategy, message: String },
}

/// Failure signals of the downstream decision layer.
///
/// Rule tables live outside this crate; these variants are the contract
/// both sides agree on when a decision cannot be made.
#[derive(Debug, Clone, Error)]
pub enum DecisionError {
    /// A rule table fired no rule for an entry.
    #[error("No applicable rule in table '{table}' for {element} ({kind})")]
    NoApplicableRule {
        table: String,
        element: ElementId,
        kind: ElementKind,
    },

    /// A rule deliberately aborted the merge.
    #[error("Rule {rule_index} of table '{table}' ({file}) threw in action '{action}': {message}")]
    Thrown {
        table: String,
        action: String,
        file: String,
        rule_index: usize,
        message: String,
    },
}

/// Invalid configuration values or unreadable configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Weight for {strategy:?} out of range [0, 1]: {value}")]
    WeightOutOfRange { strategy: Strategy, value: f32 },

    #[error("Threshold out of range [0, 1]: {0}")]
    ThresholdOutOfRange(f32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
