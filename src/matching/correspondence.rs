use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::model::{ElementId, Model, NodeId};

/// A symmetric pairing between an element of the "from" model and one of
/// the "to" model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Correspondence {
    pub from: NodeId,
    pub to: NodeId,
    /// Pinned correspondences survive re-matching passes untouched.
    pub pinned: bool,
}

/// The correspondence set between two models.
///
/// Each "from" element has at most one partner and each "to" element is
/// claimed by at most one "from" element.
#[derive(Clone, Debug, Default)]
pub struct Correspondences {
    forward: IndexMap<NodeId, Correspondence>,
    backward: FxHashMap<NodeId, NodeId>,
}

impl Correspondences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `from` with `to`, dropping any previous partner of either.
    pub fn insert(&mut self, from: NodeId, to: NodeId) {
        self.link(from, to, false);
    }

    /// Pair `from` with `to` and pin the correspondence.
    pub fn pin(&mut self, from: NodeId, to: NodeId) {
        self.link(from, to, true);
    }

    fn link(&mut self, from: NodeId, to: NodeId, pinned: bool) {
        self.remove(from);
        if let Some(previous) = self.backward.get(&to).copied() {
            self.remove(previous);
        }
        self.forward.insert(from, Correspondence { from, to, pinned });
        self.backward.insert(to, from);
    }

    /// Drop the correspondence of `from`, pinned or not.
    pub fn remove(&mut self, from: NodeId) -> Option<Correspondence> {
        let removed = self.forward.shift_remove(&from)?;
        self.backward.remove(&removed.to);
        Some(removed)
    }

    pub fn for_from(&self, from: NodeId) -> Option<&Correspondence> {
        self.forward.get(&from)
    }

    pub fn for_to(&self, to: NodeId) -> Option<&Correspondence> {
        self.backward.get(&to).and_then(|from| self.forward.get(from))
    }

    pub fn is_pinned(&self, from: NodeId) -> bool {
        self.forward.get(&from).is_some_and(|c| c.pinned)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Correspondence> {
        self.forward.values()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Correspondences between identified elements, as id pairs.
    pub fn id_pairs(&self, from_model: &Model, to_model: &Model) -> Vec<(ElementId, ElementId)> {
        self.iter()
            .filter_map(|c| {
                let from = from_model.get(c.from)?.id.clone()?;
                let to = to_model.get(c.to)?.id.clone()?;
                Some((from, to))
            })
            .collect()
    }
}
