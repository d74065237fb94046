//! Element kinds and their feature slots.
//!
//! Every [`ElementKind`] carries a fixed, ordered list of [`Feature`] slots.
//! A slot is either stored on the element or derived (computed, never
//! compared). Independently, a kind may mark a stored slot as
//! *diff-ignored*: back-pointers and generated mirror lists that would only
//! add cycles or noise to structural comparison.

use std::sync::Arc;

use super::{ElementId, NodeId};

// ============================================================================
// ELEMENT KINDS
// ============================================================================

/// The metatype of a model element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Package,
    Class,
    DataType,
    Attribute,
    Operation,
    Parameter,
    Reference,
    /// Synthetic or derived node without a stable identity.
    None,
}

impl ElementKind {
    /// The ordered feature slots of this kind, derived slots included.
    pub fn slots(&self) -> &'static [Feature] {
        use Feature::*;
        match self {
            Self::Package => &[Name, NsUri, NsPrefix, Subpackages, Classifiers, Container],
            Self::Class => &[
                Name,
                Abstract,
                Interface,
                InstanceClassName,
                Supertypes,
                GenericSupertypes,
                StructuralFeatures,
                Operations,
                AllStructuralFeatures,
                Container,
            ],
            Self::DataType => &[Name, InstanceClassName, Serializable, Container],
            Self::Attribute => &[
                Name,
                Type,
                GenericType,
                LowerBound,
                UpperBound,
                Ordered,
                Unique,
                Changeable,
                DefaultValue,
                IsId,
                Container,
            ],
            Self::Reference => &[
                Name,
                Type,
                GenericType,
                LowerBound,
                UpperBound,
                Ordered,
                Unique,
                Changeable,
                Containment,
                Opposite,
                Container,
            ],
            Self::Operation => &[
                Name,
                Type,
                GenericType,
                LowerBound,
                UpperBound,
                Parameters,
                Container,
            ],
            Self::Parameter => &[
                Name,
                Type,
                GenericType,
                LowerBound,
                UpperBound,
                Ordered,
                Unique,
                Container,
            ],
            Self::None => &[],
        }
    }

    /// Whether this kind carries the given slot.
    pub fn has_slot(&self, feature: Feature) -> bool {
        self.slots().contains(&feature)
    }

    /// Whether `feature` is excluded from structural comparison for this kind.
    pub fn is_diff_ignored(&self, feature: Feature) -> bool {
        match feature {
            Feature::Container => true,
            Feature::GenericSupertypes => matches!(self, Self::Class),
            Feature::GenericType => matches!(
                self,
                Self::Attribute | Self::Reference | Self::Operation | Self::Parameter
            ),
            _ => false,
        }
    }

    /// Slots that take part in equality and merge.
    pub fn compared_slots(self) -> impl Iterator<Item = Feature> {
        self.slots()
            .iter()
            .copied()
            .filter(move |f| !f.is_derived() && !self.is_diff_ignored(*f))
    }

    /// Whether elements of this kind can be typed by a classifier.
    pub fn is_typed(&self) -> bool {
        matches!(
            self,
            Self::Attribute | Self::Reference | Self::Operation | Self::Parameter
        )
    }

    /// Whether this kind can be the target of a declared type reference.
    pub fn is_classifier(&self) -> bool {
        matches!(self, Self::Class | Self::DataType)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// FEATURES
// ============================================================================

/// A named attribute or relationship slot on an element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Name,
    // Package
    NsUri,
    NsPrefix,
    Subpackages,
    Classifiers,
    // Classifiers
    Abstract,
    Interface,
    InstanceClassName,
    Serializable,
    Supertypes,
    GenericSupertypes,
    StructuralFeatures,
    Operations,
    AllStructuralFeatures,
    // Typed elements
    Type,
    GenericType,
    LowerBound,
    UpperBound,
    Ordered,
    Unique,
    Changeable,
    DefaultValue,
    IsId,
    Containment,
    Opposite,
    Parameters,
    // Back-pointer to the owning element
    Container,
}

impl Feature {
    /// Derived slots are computed and never stored or compared.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Container | Self::AllStructuralFeatures)
    }

    /// Containment slots own their values as structural children.
    pub fn is_containment(&self) -> bool {
        matches!(
            self,
            Self::Subpackages
                | Self::Classifiers
                | Self::StructuralFeatures
                | Self::Operations
                | Self::Parameters
        )
    }

    /// Cross-references are non-owning links resolved by target id.
    pub fn is_cross_reference(&self) -> bool {
        matches!(
            self,
            Self::Type
                | Self::Supertypes
                | Self::GenericSupertypes
                | Self::GenericType
                | Self::Opposite
        )
    }

    /// The value a freshly created element holds for this slot.
    pub fn default_value(&self) -> FeatureValue {
        match self {
            Self::Name
            | Self::NsUri
            | Self::NsPrefix
            | Self::InstanceClassName
            | Self::DefaultValue => FeatureValue::Text(None),
            Self::Abstract | Self::Interface | Self::Ordered | Self::IsId | Self::Containment => {
                FeatureValue::Bool(false)
            }
            Self::Serializable | Self::Unique | Self::Changeable => FeatureValue::Bool(true),
            Self::LowerBound => FeatureValue::Int(0),
            Self::UpperBound => FeatureValue::Int(1),
            Self::Type | Self::GenericType => FeatureValue::TypeRef(None),
            Self::Opposite | Self::Container => FeatureValue::Ref(None),
            Self::Supertypes | Self::GenericSupertypes | Self::AllStructuralFeatures => {
                FeatureValue::Refs(Vec::new())
            }
            Self::Subpackages
            | Self::Classifiers
            | Self::StructuralFeatures
            | Self::Operations
            | Self::Parameters => FeatureValue::Children(Vec::new()),
        }
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// How a referenced type is represented at runtime.
///
/// Two references to the same type id may use different representations
/// (a resolved classifier vs. an unresolved proxy); this never makes the
/// references logically different.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeRepr {
    #[default]
    Classifier,
    DataType,
    Proxy,
}

/// A declared type reference: target id plus its runtime representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub target: ElementId,
    pub repr: TypeRepr,
}

impl TypeRef {
    pub fn new(target: impl Into<ElementId>) -> Self {
        Self {
            target: target.into(),
            repr: TypeRepr::default(),
        }
    }

    pub fn with_repr(mut self, repr: TypeRepr) -> Self {
        self.repr = repr;
        self
    }

    /// Same logical target, regardless of representation.
    pub fn same_target(&self, other: &TypeRef) -> bool {
        self.target == other.target
    }
}

/// The value held by a feature slot.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureValue {
    Bool(bool),
    Int(i64),
    Text(Option<Arc<str>>),
    /// Single late-bound cross-reference.
    Ref(Option<ElementId>),
    /// Declared type reference.
    TypeRef(Option<TypeRef>),
    /// Ordered list of late-bound cross-references.
    Refs(Vec<ElementId>),
    /// Contained children, as handles into the owning model.
    Children(Vec<NodeId>),
}

impl FeatureValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(Some(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::Children(c) => c,
            _ => &[],
        }
    }

    /// Ids this value refers to, in order. Containment values refer to none.
    pub fn referenced_ids(&self) -> Vec<&ElementId> {
        match self {
            Self::Ref(Some(id)) => vec![id],
            Self::TypeRef(Some(t)) => vec![&t.target],
            Self::Refs(ids) => ids.iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        Self::Text(Some(s.into()))
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        Self::Text(Some(s.into()))
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<TypeRef> for FeatureValue {
    fn from(t: TypeRef) -> Self {
        Self::TypeRef(Some(t))
    }
}
