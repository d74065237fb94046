use indexmap::IndexSet;

use super::differencer::Differencer;
use super::graph::DiffGraph;
use crate::error::DiffError;
use crate::model::{ElementId, MergeSide, Model};

/// Base→left and base→right diffs of one three-way comparison.
#[derive(Clone, Debug)]
pub struct ThreeWayDiff {
    pub left: DiffGraph,
    pub right: DiffGraph,
}

impl ThreeWayDiff {
    pub fn compute(
        differencer: &Differencer,
        base: &Model,
        left: &Model,
        right: &Model,
    ) -> Result<Self, DiffError> {
        Ok(Self {
            left: differencer.diff(base, left)?,
            right: differencer.diff(base, right)?,
        })
    }

    /// Which side changed `id`: Left, Right, Both, or None.
    pub fn side_of(&self, id: &ElementId) -> MergeSide {
        let mut side = MergeSide::None;
        if changes(&self.left, id) {
            side = side.combine(MergeSide::Left);
        }
        if changes(&self.right, id) {
            side = side.combine(MergeSide::Right);
        }
        side
    }

    /// Every id changed on at least one side, left first.
    pub fn changed_ids(&self) -> IndexSet<&ElementId> {
        [&self.left, &self.right]
            .into_iter()
            .flat_map(|g| g.added_ids().iter().chain(g.deleted_ids()).chain(g.altered_ids()))
            .collect()
    }

    /// Ids changed on both sides: candidates for conflict rules.
    pub fn conflicting(&self) -> Vec<&ElementId> {
        self.changed_ids()
            .into_iter()
            .filter(|id| self.side_of(id) == MergeSide::Both)
            .collect()
    }
}

fn changes(graph: &DiffGraph, id: &ElementId) -> bool {
    graph.added_ids().contains(id)
        || graph.deleted_ids().contains(id)
        || graph.altered_ids().contains(id)
}
