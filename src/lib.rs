//! # syster-compare
//!
//! Model comparison core: element matching for snapshots without shared
//! identity, and structural differencing for snapshots with it.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! diff        → Differencer, DiffGraph, ThreeWayDiff
//!   ↓
//! matching    → MeasureMatrix, ranking, greedy correspondences
//!   ↓
//! compare     → Cycle-safe structural equals / differs / update
//!   ↓
//! similarity  → Pluggable similarity evaluators
//!   ↓
//! changes     → Typed change records from the change log
//!   ↓
//! model       → Element arena, kinds, feature slots
//! ```

// ============================================================================
// MODULES (dependency order: model → changes → similarity → compare → matching → diff)
// ============================================================================

/// Model graph: elements, kinds, feature slots, id index
pub mod model;

/// Change records consumed by the historical evaluator
pub mod changes;

/// Similarity evaluators and the strategy registry
pub mod similarity;

/// Structural comparator with pair memoization
pub mod compare;

/// Measure matrix, ranking and correspondence matching
pub mod matching;

/// Structural differencer and diff graph
pub mod diff;

/// Engine configuration (weights, threshold, trace)
pub mod config;

/// Error types for every engine
pub mod error;

/// Per-engine debug output
pub mod trace;

// Re-export commonly needed items
pub use compare::{Scope, StructuralComparator};
pub use config::{DiffConfig, MatchConfig};
pub use diff::{DiffEntry, DiffGraph, Differencer, Marker, ThreeWayDiff};
pub use error::{ConfigError, DecisionError, DiffError, Error, EvaluatorError, ModelError, Result};
pub use matching::{Correspondences, ElementMatcher, MeasureMatrix};
pub use model::{Element, ElementId, ElementKind, Feature, FeatureValue, MergeSide, Model, NodeId};
pub use similarity::{SimilarityEvaluator, Strategy};
pub use trace::Trace;
