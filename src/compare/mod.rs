//! Structural comparison of two same-identity elements.
//!
//! Three entry points share one traversal:
//!
//! - [`StructuralComparator::equals`]: are the two elements structurally equal?
//! - [`StructuralComparator::differs`]: which slots differ?
//! - [`StructuralComparator::update`]: copy the source's slots onto the target
//!
//! Only slots that are neither derived nor diff-ignored for the element's
//! kind take part. Pairs are memoized by handle: a pair is recorded as
//! matched *before* recursing, so self-referential or shared structures
//! terminate, and the record is rolled back if the pair turns out to differ.

use rustc_hash::FxHashMap;

use crate::error::ModelError;
use crate::model::{ElementKind, Feature, FeatureValue, Model, NodeId};

/// How far the comparison reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    /// Recurse through containment slots.
    #[default]
    Deep,
    /// Skip containment slots: only the element's own slots are compared.
    Shallow,
}

/// Cycle-safe structural comparator.
///
/// The memo tables belong to one top-level call and are reset at the start
/// of each public entry point.
#[derive(Clone, Debug, Default)]
pub struct StructuralComparator {
    scope: Scope,
    forward: FxHashMap<NodeId, NodeId>,
    backward: FxHashMap<NodeId, NodeId>,
}

impl StructuralComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: Scope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Comparator that ignores containment slots.
    pub fn shallow() -> Self {
        Self::with_scope(Scope::Shallow)
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    fn reset(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    /// Structural equality of `a` (in `left`) and `b` (in `right`).
    ///
    /// Absent sides are equal only to each other.
    pub fn equals(
        &mut self,
        left: &Model,
        a: impl Into<Option<NodeId>>,
        right: &Model,
        b: impl Into<Option<NodeId>>,
    ) -> bool {
        self.reset();
        let a = a.into().filter(|n| left.get(*n).is_some());
        let b = b.into().filter(|n| right.get(*n).is_some());
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.nodes_equal(left, a, right, b),
            _ => false,
        }
    }

    /// Slots of `a` whose values differ from `b`'s.
    ///
    /// Elements of different kinds differ in every compared slot of `a`.
    pub fn differs(&mut self, left: &Model, a: NodeId, right: &Model, b: NodeId) -> Vec<Feature> {
        self.reset();
        let (Some(ea), Some(eb)) = (left.get(a), right.get(b)) else {
            return Vec::new();
        };
        if std::ptr::eq(left, right) && a == b {
            return Vec::new();
        }
        if ea.kind != eb.kind {
            return ea.kind.compared_slots().collect();
        }
        self.record(a, b);
        let diffs = self.slot_differences(left, a, right, b, false);
        if !diffs.is_empty() {
            self.unrecord(a, b);
        }
        diffs
    }

    /// Copy every compared slot of `a` (in `source`) onto `b` (in `target`).
    ///
    /// Containment slots are synchronised recursively when both sides hold
    /// the same number of same-kind children, and replaced by a copy of the
    /// source subtree otherwise. Returns false if the kinds differ.
    pub fn update(
        &mut self,
        source: &Model,
        a: NodeId,
        target: &mut Model,
        b: NodeId,
    ) -> Result<bool, ModelError> {
        self.reset();
        self.update_nodes(source, a, target, b)
    }

    fn record(&mut self, a: NodeId, b: NodeId) {
        self.forward.insert(a, b);
        self.backward.insert(b, a);
    }

    fn unrecord(&mut self, a: NodeId, b: NodeId) {
        self.forward.remove(&a);
        self.backward.remove(&b);
    }

    /// Previously recorded answer for this pair, if either side was seen.
    fn recorded(&self, a: NodeId, b: NodeId) -> Option<bool> {
        if let Some(partner) = self.forward.get(&a) {
            return Some(*partner == b);
        }
        self.backward.get(&b).map(|partner| *partner == a)
    }

    fn compares(&self, kind: ElementKind) -> impl Iterator<Item = Feature> + '_ {
        let deep = self.scope == Scope::Deep;
        kind.compared_slots()
            .filter(move |f| deep || !f.is_containment())
    }

    fn nodes_equal(&mut self, left: &Model, a: NodeId, right: &Model, b: NodeId) -> bool {
        if let Some(answer) = self.recorded(a, b) {
            return answer;
        }
        if std::ptr::eq(left, right) && a == b {
            self.record(a, b);
            return true;
        }
        let (Some(ea), Some(eb)) = (left.get(a), right.get(b)) else {
            return false;
        };
        if ea.kind != eb.kind {
            return false;
        }
        self.record(a, b);
        if self.slot_differences(left, a, right, b, true).is_empty() {
            true
        } else {
            self.unrecord(a, b);
            false
        }
    }

    fn slot_differences(
        &mut self,
        left: &Model,
        a: NodeId,
        right: &Model,
        b: NodeId,
        first_only: bool,
    ) -> Vec<Feature> {
        let (Some(ea), Some(eb)) = (left.get(a), right.get(b)) else {
            return Vec::new();
        };
        let features: Vec<Feature> = self.compares(ea.kind).collect();
        let mut diffs = Vec::new();
        for feature in features {
            if !self.values_equal(feature, left, ea.get(feature), right, eb.get(feature)) {
                diffs.push(feature);
                if first_only {
                    break;
                }
            }
        }
        diffs
    }

    fn values_equal(
        &mut self,
        feature: Feature,
        left: &Model,
        av: Option<&FeatureValue>,
        right: &Model,
        bv: Option<&FeatureValue>,
    ) -> bool {
        match (av, bv) {
            // A declared type that differs only in representation is the same type.
            (Some(FeatureValue::TypeRef(x)), Some(FeatureValue::TypeRef(y)))
                if feature == Feature::Type =>
            {
                match (x, y) {
                    (None, None) => true,
                    (Some(x), Some(y)) => x.same_target(y),
                    _ => false,
                }
            }
            (Some(FeatureValue::Children(xs)), Some(FeatureValue::Children(ys))) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(x, y)| self.nodes_equal(left, *x, right, *y))
            }
            (x, y) => x == y,
        }
    }

    fn update_nodes(
        &mut self,
        source: &Model,
        a: NodeId,
        target: &mut Model,
        b: NodeId,
    ) -> Result<bool, ModelError> {
        if let Some(answer) = self.recorded(a, b) {
            return Ok(answer);
        }
        let ea = source.get(a).ok_or(ModelError::UnknownNode(a))?;
        let kind = target.get(b).ok_or(ModelError::UnknownNode(b))?.kind;
        if ea.kind != kind {
            return Ok(false);
        }
        self.record(a, b);
        let features: Vec<Feature> = self.compares(kind).collect();
        for feature in features {
            let Some(value) = ea.get(feature) else {
                continue;
            };
            if feature.is_containment() {
                self.sync_children(source, value.children(), target, b, feature)?;
                continue;
            }
            let current = target.get(b).and_then(|e| e.get(feature)).cloned();
            if !self.values_equal(feature, source, Some(value), target, current.as_ref()) {
                target.set(b, feature, value.clone())?;
            }
        }
        Ok(true)
    }

    fn sync_children(
        &mut self,
        source: &Model,
        from: &[NodeId],
        target: &mut Model,
        parent: NodeId,
        feature: Feature,
    ) -> Result<(), ModelError> {
        let existing: Vec<NodeId> = target
            .get(parent)
            .and_then(|e| e.get(feature))
            .map(|v| v.children().to_vec())
            .unwrap_or_default();
        let aligned = from.len() == existing.len()
            && from.iter().zip(&existing).all(|(x, y)| {
                source.get(*x).map(|e| e.kind) == target.get(*y).map(|e| e.kind)
            });
        if aligned {
            for (x, y) in from.iter().zip(existing) {
                self.update_nodes(source, *x, target, y)?;
            }
            return Ok(());
        }
        for child in existing {
            target.detach(child)?;
        }
        for child in from {
            target.copy_subtree(source, *child, parent, feature)?;
        }
        Ok(())
    }
}
