//! Model graph: typed, tree-shaped snapshots shared by every engine.
//!
//! A [`Model`] is an arena of [`Element`]s. Containment is a tree: each
//! element has at most one owner and is listed in exactly one containment
//! slot of that owner. Cross-references are stored as late-bound
//! [`ElementId`]s and resolved by lookup, never by ownership.
//!
//! ```text
//! Model
//! ├── nodes: Vec<Element>                 (arena, addressed by NodeId)
//! ├── index: IndexMap<ElementId, NodeId>  (stable-id lookup)
//! └── roots: Vec<NodeId>
//! ```

mod feature;

pub use feature::{ElementKind, Feature, FeatureValue, TypeRef, TypeRepr};

use indexmap::IndexMap;
use std::sync::Arc;

use crate::error::ModelError;

// ============================================================================
// IDs
// ============================================================================

/// Stable identifier of a model element, unique within one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub Arc<str>);

impl ElementId {
    /// Create a new element ID.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&ElementId> for ElementId {
    fn from(id: &ElementId) -> Self {
        id.clone()
    }
}

/// Arena handle of an element inside one [`Model`].
///
/// Handles are stable for the lifetime of the model and meaningless across
/// models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// MERGE SIDE
// ============================================================================

/// Provenance tag for elements, records and diff entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum MergeSide {
    #[default]
    None,
    Base,
    Left,
    Right,
    Both,
}

impl MergeSide {
    /// Combine the provenance of two observations of the same element.
    pub fn combine(self, other: MergeSide) -> MergeSide {
        match (self, other) {
            (a, b) if a == b => a,
            (MergeSide::None, x) | (x, MergeSide::None) => x,
            (MergeSide::Base, x) | (x, MergeSide::Base) => x,
            _ => MergeSide::Both,
        }
    }
}

// ============================================================================
// ELEMENT
// ============================================================================

/// A node of the model graph.
#[derive(Clone, Debug)]
pub struct Element {
    /// Stable identifier; absent for synthetic nodes.
    pub id: Option<ElementId>,
    /// The metatype.
    pub kind: ElementKind,
    /// The owning element (None for roots and detached nodes).
    pub owner: Option<NodeId>,
    /// The containment slot of the owner listing this element.
    pub owning_feature: Option<Feature>,
    /// Stored slot values, in the kind's slot order.
    slots: IndexMap<Feature, FeatureValue>,
}

impl Element {
    /// Create a new element with the given ID and kind.
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self::with_identity(Some(id.into()), kind)
    }

    /// Create a synthetic element without a stable identity.
    pub fn anonymous(kind: ElementKind) -> Self {
        Self::with_identity(None, kind)
    }

    fn with_identity(id: Option<ElementId>, kind: ElementKind) -> Self {
        let slots = kind
            .slots()
            .iter()
            .filter(|f| !f.is_derived())
            .map(|f| (*f, f.default_value()))
            .collect();
        Self {
            id,
            kind,
            owner: None,
            owning_feature: None,
            slots,
        }
    }

    /// Set the name.
    pub fn with_name(self, name: impl Into<Arc<str>>) -> Self {
        self.with(Feature::Name, FeatureValue::Text(Some(name.into())))
    }

    /// Set a slot value. Slots the kind does not store are ignored;
    /// containment slots are managed by [`Model::add_child`].
    pub fn with(mut self, feature: Feature, value: impl Into<FeatureValue>) -> Self {
        if !feature.is_containment() {
            self.set(feature, value.into());
        }
        self
    }

    /// Replace a stored slot value, returning false if the slot is not stored.
    pub fn set(&mut self, feature: Feature, value: FeatureValue) -> bool {
        match self.slots.get_mut(&feature) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Value of a stored slot.
    pub fn get(&self, feature: Feature) -> Option<&FeatureValue> {
        self.slots.get(&feature)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(Feature::Name).and_then(FeatureValue::as_text)
    }

    /// Stored slots in kind order.
    pub fn slots(&self) -> impl Iterator<Item = (Feature, &FeatureValue)> {
        self.slots.iter().map(|(f, v)| (*f, v))
    }

    /// Direct structural children across every containment slot.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .filter(|(f, _)| f.is_containment())
            .flat_map(|(_, v)| v.children().iter().copied())
    }

    /// Declared type reference, if any.
    pub fn declared_type(&self) -> Option<&TypeRef> {
        match self.get(Feature::Type) {
            Some(FeatureValue::TypeRef(Some(t))) => Some(t),
            _ => None,
        }
    }

    /// Supertype ids, in declaration order.
    pub fn supertypes(&self) -> &[ElementId] {
        match self.get(Feature::Supertypes) {
            Some(FeatureValue::Refs(ids)) => ids,
            _ => &[],
        }
    }

    fn children_mut(&mut self, feature: Feature) -> Option<&mut Vec<NodeId>> {
        match self.slots.get_mut(&feature) {
            Some(FeatureValue::Children(c)) => Some(c),
            _ => None,
        }
    }
}

// ============================================================================
// MODEL
// ============================================================================

/// A complete model snapshot.
#[derive(Clone, Debug, Default)]
pub struct Model {
    nodes: Vec<Element>,
    index: IndexMap<ElementId, NodeId>,
    roots: Vec<NodeId>,
    /// Which version this snapshot represents.
    pub side: MergeSide,
    /// Optional display name of the snapshot.
    pub name: Option<String>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty model tagged with its provenance.
    pub fn for_side(side: MergeSide) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }

    /// Add a root element.
    pub fn add_root(&mut self, element: Element) -> Result<NodeId, ModelError> {
        let node = self.insert(element)?;
        self.roots.push(node);
        Ok(node)
    }

    /// Add an element under `parent` in the containment slot `feature`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        feature: Feature,
        element: Element,
    ) -> Result<NodeId, ModelError> {
        let parent_kind = self.get(parent).ok_or(ModelError::UnknownNode(parent))?.kind;
        if !feature.is_containment() || !parent_kind.has_slot(feature) {
            return Err(ModelError::InvalidContainment {
                kind: parent_kind,
                feature,
            });
        }
        let node = self.insert(element)?;
        self.attach(parent, feature, node);
        Ok(node)
    }

    fn insert(&mut self, mut element: Element) -> Result<NodeId, ModelError> {
        if let Some(id) = &element.id {
            if self.index.contains_key(id) {
                return Err(ModelError::DuplicateId(id.clone()));
            }
        }
        let node = NodeId(self.nodes.len() as u32);
        if let Some(id) = &element.id {
            self.index.insert(id.clone(), node);
        }
        element.owner = None;
        element.owning_feature = None;
        self.nodes.push(element);
        Ok(node)
    }

    fn attach(&mut self, parent: NodeId, feature: Feature, node: NodeId) {
        if let Some(children) = self.nodes[parent.index()].children_mut(feature) {
            children.push(node);
        }
        let child = &mut self.nodes[node.index()];
        child.owner = Some(parent);
        child.owning_feature = Some(feature);
    }

    /// Get an element by handle.
    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.index())
    }

    /// Get a mutable element by handle.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.index())
    }

    /// Borrow an element together with its model.
    pub fn element_ref(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.get(node).map(|element| ElementRef {
            model: self,
            node,
            element,
        })
    }

    /// Resolve a stable id to a handle.
    pub fn lookup(&self, id: &ElementId) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Resolve a stable id to an element.
    pub fn element_by_id(&self, id: &ElementId) -> Option<&Element> {
        self.lookup(id).and_then(|n| self.get(n))
    }

    pub fn contains_id(&self, id: &ElementId) -> bool {
        self.index.contains_key(id)
    }

    /// Root handles in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Direct structural children of `node`.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.get(node)
            .map(|e| e.children().collect())
            .unwrap_or_default()
    }

    /// The owning element's handle.
    pub fn container(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|e| e.owner)
    }

    /// The owning element's stable id, if it has one.
    pub fn container_id(&self, node: NodeId) -> Option<&ElementId> {
        self.container(node)
            .and_then(|c| self.get(c))
            .and_then(|c| c.id.as_ref())
    }

    /// All attached elements in depth-first pre-order, roots first.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            let children = self.children(node);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Number of attached elements.
    pub fn element_count(&self) -> usize {
        self.preorder().len()
    }

    /// Number of identified attached elements.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterate attached elements with identity, in pre-order.
    pub fn iter_identified(&self) -> impl Iterator<Item = (&ElementId, NodeId)> + '_ {
        self.preorder()
            .into_iter()
            .filter_map(move |n| self.nodes[n.index()].id.as_ref().map(|id| (id, n)))
    }

    /// Replace a stored slot value on an element.
    pub fn set(
        &mut self,
        node: NodeId,
        feature: Feature,
        value: FeatureValue,
    ) -> Result<(), ModelError> {
        let element = self.get_mut(node).ok_or(ModelError::UnknownNode(node))?;
        if feature.is_containment() || !element.set(feature, value) {
            return Err(ModelError::InvalidContainment {
                kind: element.kind,
                feature,
            });
        }
        Ok(())
    }

    /// Detach `node` from its owner and drop its subtree from the id index.
    ///
    /// The arena slots stay allocated; detached nodes are no longer reachable
    /// from the roots.
    pub fn detach(&mut self, node: NodeId) -> Result<(), ModelError> {
        let element = self.get(node).ok_or(ModelError::UnknownNode(node))?;
        let (owner, feature) = (element.owner, element.owning_feature);
        match (owner, feature) {
            (Some(owner), Some(feature)) => {
                if let Some(children) = self.nodes[owner.index()].children_mut(feature) {
                    children.retain(|c| *c != node);
                }
            }
            _ => self.roots.retain(|r| *r != node),
        }
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(id) = &self.nodes[n.index()].id {
                self.index.shift_remove(id);
            }
            stack.extend(self.nodes[n.index()].children());
        }
        let element = &mut self.nodes[node.index()];
        element.owner = None;
        element.owning_feature = None;
        Ok(())
    }

    /// Deep-copy the subtree at `source_node` of `source` under `parent`.
    ///
    /// Ids are preserved, so the copy fails if any of them already exists here.
    pub fn copy_subtree(
        &mut self,
        source: &Model,
        source_node: NodeId,
        parent: NodeId,
        feature: Feature,
    ) -> Result<NodeId, ModelError> {
        let original = source
            .get(source_node)
            .ok_or(ModelError::UnknownNode(source_node))?;
        let copy = original.shallow_copy();
        let node = self.add_child(parent, feature, copy)?;
        for (child_feature, value) in original.slots() {
            if !child_feature.is_containment() {
                continue;
            }
            for child in value.children() {
                self.copy_subtree(source, *child, node, child_feature)?;
            }
        }
        Ok(node)
    }
}

impl Element {
    /// Copy of this element with its containment slots emptied.
    pub fn shallow_copy(&self) -> Element {
        let mut copy = self.clone();
        for (feature, value) in copy.slots.iter_mut() {
            if feature.is_containment() {
                *value = FeatureValue::Children(Vec::new());
            }
        }
        copy.owner = None;
        copy.owning_feature = None;
        copy
    }
}

// ============================================================================
// ELEMENT REF
// ============================================================================

/// An element borrowed together with the model it lives in.
#[derive(Clone, Copy, Debug)]
pub struct ElementRef<'a> {
    pub model: &'a Model,
    pub node: NodeId,
    pub element: &'a Element,
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> Option<&'a ElementId> {
        self.element.id.as_ref()
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind
    }

    pub fn name(&self) -> Option<&'a str> {
        self.element.name()
    }

    /// The owning element.
    pub fn container(&self) -> Option<ElementRef<'a>> {
        self.element.owner.and_then(|o| self.model.element_ref(o))
    }

    /// Resolve an id in this element's model.
    pub fn resolve(&self, id: &ElementId) -> Option<ElementRef<'a>> {
        self.model.lookup(id).and_then(|n| self.model.element_ref(n))
    }
}

impl std::ops::Deref for ElementRef<'_> {
    type Target = Element;

    fn deref(&self) -> &Element {
        self.element
    }
}
