//! Matching engine tests
//!
//! - Similarity evaluator bounds and identity short-circuit
//! - Greedy threshold matching, exclusivity and pinned correspondences
//! - Recoverable evaluator failures

pub mod tests_matcher;
pub mod tests_similarity;
