//! Element matching for models without shared identity.
//!
//! Evaluators fill a [`MeasureMatrix`], the matrix is ranked, and the
//! [`ElementMatcher`] greedily assigns one-to-one [`Correspondences`] above
//! a threshold while leaving pinned correspondences alone.

mod correspondence;
mod matcher;
mod matrix;

pub use correspondence::{Correspondence, Correspondences};
pub use matcher::ElementMatcher;
pub use matrix::{AGGREGATE, Cell, IDENTITY_SLOT, MeasureMatrix, RankedRow, Ranking};
