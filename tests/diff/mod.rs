//! Structural differencer tests
//!
//! - Classification of added, deleted, altered and unchanged ids
//! - Diff graph placement of copies and change markers
//! - Cross-reference finalization
//! - Three-way provenance

pub mod tests_differencer;
pub mod tests_three_way;
