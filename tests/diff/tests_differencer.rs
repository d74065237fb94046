#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use rstest::rstest;
use syster_compare::diff::{DiffEntry, DiffGraph, Differencer, Marker};
use syster_compare::error::DiffError;
use syster_compare::model::{
    Element, ElementId, ElementKind, Feature, FeatureValue, MergeSide, Model, NodeId, TypeRef,
};

use crate::helpers::{attribute, class, node, package, rename, shop};

fn diff(original: &Model, replica: &Model) -> DiffGraph {
    Differencer::default().diff(original, replica).unwrap()
}

fn ids(set: &indexmap::IndexSet<ElementId>) -> Vec<&str> {
    set.iter().map(ElementId::as_str).collect()
}

#[test]
fn test_added_class_in_same_package() {
    let mut original = Model::new();
    let pkg = original.add_root(Element::new("P", ElementKind::Package)).unwrap();
    class(&mut original, pkg, "C1", "Foo");
    let mut replica = original.clone();
    class(&mut replica, pkg, "C2", "Bar");

    let graph = diff(&original, &replica);
    assert_eq!(ids(graph.added_ids()), ["C2"]);
    assert!(graph.deleted_ids().is_empty());
    assert!(graph.altered_ids().is_empty());
    assert!(matches!(graph.entry(&"C1".into()), Some(DiffEntry::Unchanged(_))));
    assert!(graph.lookup("C1_").is_none());

    let Some(DiffEntry::Added(bar)) = graph.entry(&"C2".into()) else {
        panic!("C2 should be added");
    };
    assert_eq!(graph.node(bar.parent.unwrap()).unwrap().id, Some("P".into()));
}

#[test]
fn test_every_one_sided_id_gets_exactly_one_entry() {
    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    replica.detach(node(&replica, "C2")).unwrap();
    let c1 = node(&replica, "C1");
    attribute(&mut replica, c1, "A3", "placedAt", "D1");

    let graph = diff(&original, &replica);
    assert_eq!(ids(graph.added_ids()), ["A3"]);
    assert_eq!(ids(graph.deleted_ids()), ["C2", "A2"]);

    let entries: Vec<_> = graph
        .preorder()
        .into_iter()
        .filter_map(|n| graph.node(n))
        .filter(|n| matches!(n.marker, Marker::Added | Marker::Deleted))
        .filter_map(|n| n.id.clone())
        .collect();
    assert_eq!(entries.len(), 3);
    for id in ["A3", "C2", "A2"] {
        assert_eq!(entries.iter().filter(|e| e.as_str() == id).count(), 1, "{id}");
    }
}

#[test]
fn test_unchanged_ids_have_no_altered_entry() {
    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    rename(&mut replica, "A2", "count");

    let graph = diff(&original, &replica);
    assert_eq!(graph.side, MergeSide::Left);
    assert_eq!(ids(graph.altered_ids()), ["A2"]);
    assert!(graph.added_ids().is_empty() && graph.deleted_ids().is_empty());
    for id in ["P", "C1", "C2", "D1", "D2", "A1", "R1"] {
        assert!(
            matches!(graph.entry(&id.into()), Some(DiffEntry::Unchanged(_))),
            "{id} should be unchanged"
        );
    }
}

#[rstest]
#[case::rename("A1", Feature::Name, FeatureValue::from("grandTotal"))]
#[case::bound("R1", Feature::LowerBound, FeatureValue::Int(1))]
#[case::flag("C2", Feature::Abstract, FeatureValue::Bool(true))]
fn test_own_slot_change_is_altered(
    #[case] id: &str,
    #[case] feature: Feature,
    #[case] value: FeatureValue,
) {
    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    let n = node(&replica, id);
    replica.set(n, feature, value).unwrap();

    let graph = diff(&original, &replica);
    assert_eq!(ids(graph.altered_ids()), [id]);
    let Some(DiffEntry::Altered { updated, marker }) = graph.entry(&id.into()) else {
        panic!("{id} should be altered");
    };
    assert_eq!(updated.marker, Marker::Updated);
    assert_eq!(marker.marker, Marker::Changed { updated: graph.lookup(id).unwrap() });
    assert!(marker.children.is_empty());
}

#[test]
fn test_type_repr_change_is_not_a_difference() {
    use syster_compare::model::{TypeRef, TypeRepr};

    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    let a1 = node(&replica, "A1");
    replica
        .set(a1, Feature::Type, TypeRef::new("D1").with_repr(TypeRepr::Proxy).into())
        .unwrap();

    let graph = diff(&original, &replica);
    assert!(!graph.has_changes());
}

#[test]
fn test_deleted_descendant_does_not_alter_ancestor() {
    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    replica.detach(node(&replica, "A1")).unwrap();

    let graph = diff(&original, &replica);
    assert_eq!(ids(graph.deleted_ids()), ["A1"]);
    assert!(graph.altered_ids().is_empty());

    let Some(DiffEntry::Deleted(total)) = graph.entry(&"A1".into()) else {
        panic!("A1 should be deleted");
    };
    let owner = graph.node(total.parent.unwrap()).unwrap();
    assert_eq!(owner.id, Some("C1".into()));
    assert_eq!(owner.marker, Marker::Unchanged);
}

#[test]
fn test_nested_markers_follow_changed_containers() {
    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    rename(&mut replica, "C1", "PurchaseOrder");
    rename(&mut replica, "A1", "amount");

    let graph = diff(&original, &replica);
    let order_marker = graph.lookup("C1_").unwrap();
    let Some(DiffEntry::Altered { marker, updated }) = graph.entry(&"A1".into()) else {
        panic!("A1 should be altered");
    };
    assert_eq!(marker.parent, Some(order_marker));
    // the updated copy keeps the replica's structure
    assert_eq!(updated.parent, graph.lookup("C1"));
}

#[test]
fn test_diff_is_idempotent() {
    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    rename(&mut replica, "C2", "LineItem");
    replica.detach(node(&replica, "D2")).unwrap();
    let pkg = node(&replica, "P");
    class(&mut replica, pkg, "C3", "Customer");

    let differencer = Differencer::default();
    let first = differencer.diff(&original, &replica).unwrap();
    let second = differencer.diff(&original, &replica).unwrap();
    assert_eq!(first.added_ids(), second.added_ids());
    assert_eq!(first.deleted_ids(), second.deleted_ids());
    assert_eq!(first.altered_ids(), second.altered_ids());
    assert_eq!(first.len(), second.len());
}

#[test]
fn test_references_into_graph_resolve() {
    let original = shop(MergeSide::Base);
    let mut replica = shop(MergeSide::Left);
    rename(&mut replica, "C2", "LineItem");
    let c1 = node(&replica, "C1");
    attribute(&mut replica, c1, "A3", "discount", "D1");
    let c2 = node(&replica, "C2");
    replica
        .set(c2, Feature::Supertypes, FeatureValue::Refs(vec!["C1".into(), "Missing".into()]))
        .unwrap();

    let graph = diff(&original, &replica);
    let mut checked = 0;
    for handle in graph.preorder() {
        let n = graph.node(handle).unwrap();
        for refs in n.references.values() {
            for r in refs {
                if graph.lookup(r.target.as_str()).is_some() {
                    assert!(r.node.is_some(), "{:?} -> {}", n.id, r.target);
                    checked += 1;
                } else {
                    assert!(r.node.is_none());
                }
            }
        }
    }
    assert!(checked >= 5);

    // references into an altered target land on its change marker
    let r1 = graph.node(graph.lookup("R1").unwrap()).unwrap();
    assert_eq!(r1.resolved(Feature::Type)[0].node, graph.lookup("C2_"));

    // supertype order is preserved
    let c2 = graph.node(graph.lookup("C2").unwrap()).unwrap();
    let supers: Vec<_> = c2
        .resolved(Feature::Supertypes)
        .iter()
        .map(|r| r.target.as_str())
        .collect();
    assert_eq!(supers, ["C1", "Missing"]);
}

#[test]
fn test_marker_key_collision_is_fatal() {
    let mut original = Model::new();
    let pkg = original.add_root(Element::new("P", ElementKind::Package)).unwrap();
    class(&mut original, pkg, "X", "Foo");
    class(&mut original, pkg, "X_", "Bar");
    let mut replica = original.clone();
    rename(&mut replica, "X", "Baz");

    let err = Differencer::default().diff(&original, &replica).unwrap_err();
    assert!(matches!(err, DiffError::IdCollision { ref key, .. } if key == "X_"));
}

#[test]
fn test_child_moved_out_of_deleted_container() {
    // P { Y { X, W }, Z }  →  P { Z { X } }
    let mut original = package("P", &[("Y", "Draft"), ("Z", "Final")]);
    let y = node(&original, "Y");
    attribute(&mut original, y, "X", "title", "Z");
    attribute(&mut original, y, "W", "notes", "Z");

    let mut replica = package("P", &[("Z", "Final")]);
    let z = node(&replica, "Z");
    attribute(&mut replica, z, "X", "title", "Z");

    let graph = diff(&original, &replica);
    assert_eq!(ids(graph.deleted_ids()), ["Y", "W"]);
    assert_eq!(ids(graph.altered_ids()), ["X"]);

    let Some(DiffEntry::Altered { updated, .. }) = graph.entry(&"X".into()) else {
        panic!("X should be altered");
    };
    assert_eq!(updated.parent, graph.lookup("Z"));

    let Some(DiffEntry::Deleted(draft)) = graph.entry(&"Y".into()) else {
        panic!("Y should be deleted");
    };
    // only the child that is really gone is grafted back
    let grafted: Vec<_> = draft
        .children
        .iter()
        .filter_map(|c| graph.node(*c))
        .filter_map(|c| c.id.clone())
        .collect();
    assert_eq!(grafted, vec![ElementId::from("W")]);
    let deleted_nodes = graph
        .preorder()
        .into_iter()
        .filter_map(|n| graph.node(n))
        .filter(|n| n.marker == Marker::Deleted)
        .count();
    assert_eq!(deleted_nodes, 2);
}

fn add_opposites(model: &mut Model) {
    let item = node(model, "C2");
    model
        .add_child(
            item,
            Feature::StructuralFeatures,
            Element::new("R2", ElementKind::Reference)
                .with_name("order")
                .with(Feature::Type, TypeRef::new("C1"))
                .with(Feature::Opposite, FeatureValue::Ref(Some("R1".into()))),
        )
        .unwrap();
    let r1: NodeId = node(model, "R1");
    model
        .set(r1, Feature::Opposite, FeatureValue::Ref(Some("R2".into())))
        .unwrap();
}

#[test]
fn test_opposite_reference_prefers_change_marker() {
    let mut original = shop(MergeSide::Base);
    add_opposites(&mut original);
    let mut replica = shop(MergeSide::Left);
    add_opposites(&mut replica);
    rename(&mut replica, "R2", "owner");

    let graph = diff(&original, &replica);
    assert_eq!(ids(graph.altered_ids()), ["R2"]);

    let items = graph.node(graph.lookup("R1").unwrap()).unwrap();
    let opposite = items.resolved(Feature::Opposite);
    assert_eq!(opposite.len(), 1);
    assert_eq!(opposite[0].target.as_str(), "R2");
    assert_eq!(opposite[0].node, graph.lookup("R2_"));

    // the unchanged end resolves to its plain copy
    let owner = graph.node(graph.lookup("R2").unwrap()).unwrap();
    assert_eq!(owner.resolved(Feature::Opposite)[0].node, graph.lookup("R1"));
}
