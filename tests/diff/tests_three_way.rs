#![allow(clippy::unwrap_used)]

use syster_compare::diff::{Differencer, ThreeWayDiff};
use syster_compare::model::{ElementId, MergeSide};

use crate::helpers::{class, node, rename, shop};

#[test]
fn test_three_way_sides() {
    let base = shop(MergeSide::Base);

    let mut left = shop(MergeSide::Left);
    rename(&mut left, "A1", "amount");
    left.detach(node(&left, "D2")).unwrap();

    let mut right = shop(MergeSide::Right);
    rename(&mut right, "A1", "sum");
    let pkg = node(&right, "P");
    class(&mut right, pkg, "C9", "Invoice");

    let diff = ThreeWayDiff::compute(&Differencer::default(), &base, &left, &right).unwrap();
    assert_eq!(diff.side_of(&"A1".into()), MergeSide::Both);
    assert_eq!(diff.side_of(&"D2".into()), MergeSide::Left);
    assert_eq!(diff.side_of(&"C9".into()), MergeSide::Right);
    assert_eq!(diff.side_of(&"C1".into()), MergeSide::None);

    let changed: Vec<_> = diff.changed_ids().into_iter().map(ElementId::as_str).collect();
    assert_eq!(changed, ["D2", "A1", "C9"]);
    assert_eq!(diff.conflicting(), vec![&ElementId::from("A1")]);
}
