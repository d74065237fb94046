use indexmap::IndexSet;

use super::graph::{DiffGraph, DiffNode, DiffNodeId, Marker, ResolvedRef, marker_key};
use crate::compare::StructuralComparator;
use crate::config::DiffConfig;
use crate::error::DiffError;
use crate::model::{ElementId, ElementKind, Feature, Model, NodeId};
use crate::trace::Trace;

/// Cross-references rebuilt against the diff graph during finalization.
const RESOLVED_FEATURES: [Feature; 3] = [Feature::Type, Feature::Supertypes, Feature::Opposite];

/// Id classification of one snapshot pair.
#[derive(Debug, Default)]
struct Categories {
    added: IndexSet<ElementId>,
    deleted: IndexSet<ElementId>,
    /// Candidates in replica discovery order, pruned by verification.
    altered: IndexSet<ElementId>,
}

/// Builds a typed [`DiffGraph`] from two snapshots sharing element ids.
///
/// ```text
/// categorize ─▶ verify (bottom-up) ─▶ build replica branch (top-down)
///                                      ─▶ graft deleted subtrees
///                                      ─▶ finalize cross-references
/// ```
#[derive(Clone, Debug, Default)]
pub struct Differencer {
    config: DiffConfig,
    trace: Trace,
}

impl Differencer {
    pub fn new(config: DiffConfig) -> Self {
        let trace = config.trace();
        Self { config, trace }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Diff `original` (before) against `replica` (after).
    ///
    /// Structural inconsistencies abort the comparison; no partial graph is
    /// returned.
    pub fn diff(&self, original: &Model, replica: &Model) -> Result<DiffGraph, DiffError> {
        let mut categories = categorize(original, replica);
        self.verify(original, replica, &mut categories);
        self.trace.debug(
            "differencer",
            format_args!(
                "{} added, {} deleted, {} altered",
                categories.added.len(),
                categories.deleted.len(),
                categories.altered.len()
            ),
        );

        let mut builder = Builder {
            original,
            replica,
            categories: &categories,
            graph: DiffGraph::for_side(replica.side),
            trace: &self.trace,
        };
        for &root in replica.roots() {
            builder.visit(root)?;
        }
        builder.graft_deleted()?;
        builder.finalize();

        let mut graph = builder.graph;
        graph.added = categories.added;
        graph.deleted = categories.deleted;
        graph.altered = categories.altered;
        Ok(graph)
    }

    /// Demote candidates that are shallow-equal and stayed in place.
    ///
    /// Runs in reverse discovery order so descendants are settled before
    /// their ancestors. A deleted descendant does not keep its ancestor
    /// altered.
    fn verify(&self, original: &Model, replica: &Model, categories: &mut Categories) {
        let mut comparator = StructuralComparator::shallow();
        let mut demoted = Vec::new();
        for id in categories.altered.iter().rev() {
            let (Some(a), Some(b)) = (original.lookup(id), replica.lookup(id)) else {
                continue;
            };
            let moved = original.container_id(a) != replica.container_id(b);
            if !moved && comparator.equals(original, a, replica, b) {
                demoted.push(id.clone());
            } else {
                self.trace.trace(
                    "differencer",
                    format_args!("{id} altered{}", if moved { " (moved)" } else { "" }),
                );
            }
        }
        for id in &demoted {
            categories.altered.shift_remove(id);
        }
    }
}

/// One pass over each snapshot; id-less elements never take part.
fn categorize(original: &Model, replica: &Model) -> Categories {
    let mut categories = Categories::default();
    for (id, _) in replica.iter_identified() {
        if original.contains_id(id) {
            categories.altered.insert(id.clone());
        } else {
            categories.added.insert(id.clone());
        }
    }
    for (id, _) in original.iter_identified() {
        if !replica.contains_id(id) {
            categories.deleted.insert(id.clone());
        }
    }
    categories
}

/// Id of the nearest ancestor of `node` that has one.
fn identified_container(model: &Model, node: NodeId) -> Option<(&ElementId, NodeId)> {
    let mut current = model.container(node);
    while let Some(c) = current {
        if let Some(id) = model.get(c).and_then(|e| e.id.as_ref()) {
            return Some((id, c));
        }
        current = model.container(c);
    }
    None
}

struct Builder<'a> {
    original: &'a Model,
    replica: &'a Model,
    categories: &'a Categories,
    graph: DiffGraph,
    trace: &'a Trace,
}

impl Builder<'_> {
    /// Structural counterpart of `node`'s container, or `None` for the root.
    fn placement(&self, model: &Model, node: NodeId) -> Option<DiffNodeId> {
        identified_container(model, node).and_then(|(id, _)| self.graph.lookup(id.as_str()))
    }

    /// Nearest enclosing change marker or added copy above `node`.
    fn marker_placement(&self, node: NodeId) -> Option<DiffNodeId> {
        let mut current = identified_container(self.replica, node);
        while let Some((id, container)) = current {
            if let Some(marker) = self.graph.lookup(&marker_key(id)) {
                return Some(marker);
            }
            if self.categories.added.contains(id) {
                return self.graph.lookup(id.as_str());
            }
            current = identified_container(self.replica, container);
        }
        None
    }

    /// Top-down visit of the replica branch.
    fn visit(&mut self, node: NodeId) -> Result<(), DiffError> {
        let replica = self.replica;
        let Some(element) = replica.get(node) else {
            return Ok(());
        };
        if let Some(id) = &element.id {
            let parent = self.placement(replica, node);
            if self.categories.added.contains(id) {
                let copy = self.graph.push(DiffNode::copy_of(element, Marker::Added), parent);
                self.graph.register(id.as_str().to_owned(), copy)?;
            } else if self.categories.altered.contains(id) {
                let updated = self.graph.push(DiffNode::copy_of(element, Marker::Updated), parent);
                self.graph.register(id.as_str().to_owned(), updated)?;
                let marker_parent = self.marker_placement(node);
                let marker = self
                    .graph
                    .push(DiffNode::marker_of(element, updated), marker_parent);
                self.graph.register(marker_key(id), marker)?;
            } else {
                let copy = self.graph.push(DiffNode::copy_of(element, Marker::Unchanged), parent);
                self.graph.register(id.as_str().to_owned(), copy)?;
            }
        }
        for child in element.children() {
            self.visit(child)?;
        }
        Ok(())
    }

    /// Graft every top-level deleted subtree of the original.
    fn graft_deleted(&mut self) -> Result<(), DiffError> {
        let (original, categories) = (self.original, self.categories);
        for id in &categories.deleted {
            let Some(node) = original.lookup(id) else {
                continue;
            };
            let parent = match identified_container(original, node) {
                Some((container, _)) if categories.deleted.contains(container) => continue,
                Some((container, _)) => Some(self.graph.lookup(container.as_str()).ok_or_else(|| {
                    DiffError::UnresolvedContainer {
                        id: id.clone(),
                        container: container.clone(),
                        kind: original.get(node).map_or(ElementKind::None, |e| e.kind),
                    }
                })?),
                None => None,
            };
            self.graft(node, parent)?;
        }
        Ok(())
    }

    fn graft(&mut self, node: NodeId, parent: Option<DiffNodeId>) -> Result<(), DiffError> {
        let original = self.original;
        let Some(element) = original.get(node) else {
            return Ok(());
        };
        let here = match &element.id {
            Some(id) => {
                let copy = self.graph.push(DiffNode::copy_of(element, Marker::Deleted), parent);
                self.graph.register(id.as_str().to_owned(), copy)?;
                Some(copy)
            }
            None => parent,
        };
        for child in element.children() {
            // children moved out before their container was deleted live on
            // in the replica branch
            let moved_out = original
                .get(child)
                .and_then(|c| c.id.as_ref())
                .is_some_and(|id| !self.categories.deleted.contains(id));
            if !moved_out {
                self.graft(child, here)?;
            }
        }
        Ok(())
    }

    /// Resolve deferred cross-references against the completed index.
    fn finalize(&mut self) {
        let mut unresolved = 0usize;
        for handle in self.graph.preorder() {
            let Some(node) = self.graph.node(handle) else {
                continue;
            };
            if node.id.is_none() || node.is_change_marker() {
                continue;
            }
            let resolved: Vec<(Feature, Vec<ResolvedRef>)> = RESOLVED_FEATURES
                .iter()
                .filter_map(|feature| node.slots.get(feature).map(|value| (*feature, value)))
                .map(|(feature, value)| {
                    let refs = value
                        .referenced_ids()
                        .into_iter()
                        .map(|target| ResolvedRef {
                            target: target.clone(),
                            node: self.graph.resolve(target),
                        })
                        .collect::<Vec<_>>();
                    (feature, refs)
                })
                .filter(|(_, refs)| !refs.is_empty())
                .collect();
            unresolved += resolved
                .iter()
                .flat_map(|(_, refs)| refs)
                .filter(|r| r.node.is_none())
                .count();
            self.graph.node_mut(handle).references.extend(resolved);
        }
        if unresolved > 0 {
            self.trace.debug(
                "differencer",
                format_args!("{unresolved} cross-references point outside both snapshots"),
            );
        }
    }
}
