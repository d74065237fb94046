//! The diff graph: typed output of the differencer.
//!
//! ```text
//! DiffGraph
//! ├── nodes: Vec<DiffNode>                (arena, addressed by DiffNodeId)
//! ├── roots: Vec<DiffNodeId>
//! └── index: IndexMap<String, DiffNodeId> ("id" → structural copy,
//!                                          "id_" → changed marker)
//! ```

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

use crate::error::DiffError;
use crate::model::{Element, ElementId, ElementKind, Feature, FeatureValue, MergeSide};

/// Arena handle of a node inside one [`DiffGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiffNodeId(u32);

impl DiffNodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a diff node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Present only in the replica.
    Added,
    /// Present only in the original.
    Deleted,
    /// Post-change copy of an altered element, at its structural position.
    Updated,
    /// Change marker of an altered element, pointing at its updated copy.
    Changed { updated: DiffNodeId },
    /// Pass-through copy of an element without changes of its own.
    Unchanged,
}

/// A cross-reference after finalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRef {
    /// The id the source element referred to.
    pub target: ElementId,
    /// The diff node it resolved to, if the target is in the graph.
    pub node: Option<DiffNodeId>,
}

/// One node of the diff graph.
#[derive(Clone, Debug)]
pub struct DiffNode {
    pub id: Option<ElementId>,
    pub kind: ElementKind,
    pub name: Option<Arc<str>>,
    pub marker: Marker,
    pub parent: Option<DiffNodeId>,
    pub children: Vec<DiffNodeId>,
    /// Non-containment slot values copied from the source element.
    pub slots: IndexMap<Feature, FeatureValue>,
    /// Cross-references resolved against the graph, filled by finalization.
    pub references: IndexMap<Feature, Vec<ResolvedRef>>,
}

impl DiffNode {
    /// Copy of `element`'s own slots, without children.
    pub(crate) fn copy_of(element: &Element, marker: Marker) -> Self {
        Self {
            id: element.id.clone(),
            kind: element.kind,
            name: element.name().map(Arc::from),
            marker,
            parent: None,
            children: Vec::new(),
            slots: element
                .slots()
                .filter(|(f, _)| !f.is_containment())
                .map(|(f, v)| (f, v.clone()))
                .collect(),
            references: IndexMap::new(),
        }
    }

    /// Change marker for `element`: name and a pointer, nothing else.
    pub(crate) fn marker_of(element: &Element, updated: DiffNodeId) -> Self {
        Self {
            id: element.id.clone(),
            kind: element.kind,
            name: element.name().map(Arc::from),
            marker: Marker::Changed { updated },
            parent: None,
            children: Vec::new(),
            slots: IndexMap::new(),
            references: IndexMap::new(),
        }
    }

    pub fn is_change_marker(&self) -> bool {
        matches!(self.marker, Marker::Changed { .. })
    }

    /// Resolved targets of `feature`, in declaration order.
    pub fn resolved(&self, feature: Feature) -> &[ResolvedRef] {
        self.references
            .get(&feature)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Classification of one element id.
#[derive(Clone, Copy, Debug)]
pub enum DiffEntry<'a> {
    Added(&'a DiffNode),
    Deleted(&'a DiffNode),
    Altered {
        updated: &'a DiffNode,
        marker: &'a DiffNode,
    },
    Unchanged(&'a DiffNode),
}

/// Key of an id's change marker in the graph index.
pub fn marker_key(id: &ElementId) -> String {
    format!("{}_", id.as_str())
}

/// Typed diff of two snapshots.
#[derive(Clone, Debug, Default)]
pub struct DiffGraph {
    nodes: Vec<DiffNode>,
    roots: Vec<DiffNodeId>,
    index: IndexMap<String, DiffNodeId>,
    pub(crate) added: IndexSet<ElementId>,
    pub(crate) deleted: IndexSet<ElementId>,
    pub(crate) altered: IndexSet<ElementId>,
    /// Provenance of the replica side.
    pub side: MergeSide,
}

impl DiffGraph {
    /// An empty graph for a replica of the given provenance.
    pub(crate) fn for_side(side: MergeSide) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, mut node: DiffNode, parent: Option<DiffNodeId>) -> DiffNodeId {
        let handle = DiffNodeId(self.nodes.len() as u32);
        node.parent = parent;
        self.nodes.push(node);
        match parent {
            Some(p) => self.nodes[p.index()].children.push(handle),
            None => self.roots.push(handle),
        }
        handle
    }

    pub(crate) fn register(&mut self, key: String, node: DiffNodeId) -> Result<(), DiffError> {
        if self.index.contains_key(&key) {
            return Err(DiffError::IdCollision {
                key,
                kind: self.nodes[node.index()].kind,
            });
        }
        self.index.insert(key, node);
        Ok(())
    }

    pub(crate) fn node_mut(&mut self, node: DiffNodeId) -> &mut DiffNode {
        &mut self.nodes[node.index()]
    }

    pub fn node(&self, node: DiffNodeId) -> Option<&DiffNode> {
        self.nodes.get(node.index())
    }

    pub fn roots(&self) -> &[DiffNodeId] {
        &self.roots
    }

    /// Look up an index key (`"id"` or `"id_"`).
    pub fn lookup(&self, key: &str) -> Option<DiffNodeId> {
        self.index.get(key).copied()
    }

    /// Preferred node for a reference to `id`: the change marker if there is
    /// one, else the structural copy.
    pub fn resolve(&self, id: &ElementId) -> Option<DiffNodeId> {
        self.lookup(&marker_key(id))
            .or_else(|| self.lookup(id.as_str()))
    }

    /// Classification of `id`, if the graph knows it.
    ///
    /// `Unchanged` is a pass-through copy kept so changed descendants have a
    /// structural parent; it is not a change. Only Added, Deleted and
    /// Altered ids appear in the id sets and count for [`has_changes`].
    ///
    /// [`has_changes`]: Self::has_changes
    pub fn entry(&self, id: &ElementId) -> Option<DiffEntry<'_>> {
        let node = self.node(self.lookup(id.as_str())?)?;
        Some(match node.marker {
            Marker::Added => DiffEntry::Added(node),
            Marker::Deleted => DiffEntry::Deleted(node),
            Marker::Unchanged => DiffEntry::Unchanged(node),
            Marker::Updated | Marker::Changed { .. } => DiffEntry::Altered {
                updated: node,
                marker: self.node(self.lookup(&marker_key(id))?)?,
            },
        })
    }

    pub fn added_ids(&self) -> &IndexSet<ElementId> {
        &self.added
    }

    pub fn deleted_ids(&self) -> &IndexSet<ElementId> {
        &self.deleted
    }

    pub fn altered_ids(&self) -> &IndexSet<ElementId> {
        &self.altered
    }

    /// Whether the two snapshots differ at all.
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.deleted.is_empty() && self.altered.is_empty())
    }

    /// All nodes in depth-first pre-order, roots first.
    pub fn preorder(&self) -> Vec<DiffNodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<DiffNodeId> = self.roots.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.index()].children.iter().rev());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
