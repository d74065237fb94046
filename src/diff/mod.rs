//! Structural differencing of two snapshots that share element ids.
//!
//! The [`Differencer`] classifies every identified element as added,
//! deleted, altered or unchanged and builds a [`DiffGraph`] that mirrors the
//! replica's containment, with deleted subtrees grafted back in and
//! cross-references resolved against the graph itself.
//!
//! Altered elements appear twice: an updated copy at their structural
//! position (index key `id`) and a change marker (index key `id_`) nested
//! under the nearest enclosing marker.

mod differencer;
mod graph;
mod three_way;

pub use differencer::Differencer;
pub use graph::{DiffEntry, DiffGraph, DiffNode, DiffNodeId, Marker, ResolvedRef, marker_key};
pub use three_way::ThreeWayDiff;
