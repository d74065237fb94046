#![allow(clippy::unwrap_used)]

use rstest::rstest;
use syster_compare::config::MatchConfig;
use syster_compare::matching::{ElementMatcher, IDENTITY_SLOT};
use syster_compare::similarity::{
    IdentityEvaluator, LexicalEvaluator, SimilarityEvaluator, StructuralEvaluator, name_similarity,
};

use crate::helpers::{node, package};

#[rstest]
#[case("Order", "Order")]
#[case("Order", "OrderItem")]
#[case("customerName", "CustomerNAME")]
#[case("XMLParser", "xmlParser")]
#[case("a", "ab")]
#[case("", "Order")]
#[case("Order", "")]
#[case("total", "Zebra")]
fn test_name_similarity_is_bounded(#[case] from: &str, #[case] to: &str) {
    let score = name_similarity(from, to);
    assert!((0.0..=1.0).contains(&score), "{from} vs {to}: {score}");
}

#[rstest]
#[case("Order")]
#[case("x")]
#[case("shippingAddressLine2")]
#[case("HTTPServer")]
fn test_name_self_similarity(#[case] name: &str) {
    assert_eq!(name_similarity(name, name), 1.0);
}

#[rstest]
#[case("", "Order")]
#[case("Order", "")]
fn test_empty_name_scores_zero(#[case] from: &str, #[case] to: &str) {
    assert_eq!(name_similarity(from, to), 0.0);
}

#[test]
fn test_lexical_ranks_closer_names_higher() {
    let close = name_similarity("OrderItem", "OrderLine");
    let far = name_similarity("OrderItem", "Customer");
    assert!(close > far);
}

#[test]
fn test_identity_short_circuits_aggregate() {
    // same ids, entirely different names and slots
    let from = package("P", &[("C1", "Order")]);
    let mut to = package("P", &[("C1", "Zebra")]);
    let c1 = node(&to, "C1");
    to.set(c1, syster_compare::model::Feature::Abstract, true.into()).unwrap();

    let mut matcher = ElementMatcher::new(MatchConfig::default());
    matcher.add_evaluator(LexicalEvaluator::default());
    matcher.add_evaluator(StructuralEvaluator::default());
    matcher.add_evaluator(IdentityEvaluator::default());
    let matrix = matcher.measure_similarities(&from, &to);

    let cell = matrix.cell(node(&from, "C1"), node(&to, "C1")).unwrap();
    assert_eq!(cell.score(IDENTITY_SLOT), 1.0);
    assert_eq!(cell.aggregate(), 1.0);
}

#[test]
fn test_evaluators_report_their_own_weights() {
    assert_eq!(IdentityEvaluator::new(0.4).initial_weight(), 0.4);
    assert_eq!(LexicalEvaluator::default().initial_weight(), 0.8);
}
