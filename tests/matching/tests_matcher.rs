#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use syster_compare::config::MatchConfig;
use syster_compare::error::EvaluatorError;
use syster_compare::matching::{AGGREGATE, Correspondences, ElementMatcher};
use syster_compare::model::Model;
use syster_compare::similarity::{
    IdentityEvaluator, LexicalEvaluator, ScriptEvaluator, ScriptTrace, Strategy,
};

use crate::helpers::{node, package};

fn lexical_matcher(threshold: f32) -> ElementMatcher {
    let mut matcher = ElementMatcher::new(MatchConfig::default().with_threshold(threshold));
    matcher.add_evaluator(LexicalEvaluator::default());
    matcher
}

#[test]
fn test_zero_weight_lexical_does_not_match_equal_names() {
    let from = package("P1", &[("1", "X")]);
    let to = package("P2", &[("2", "X")]);
    let config = MatchConfig::default()
        .with_weight(Strategy::Identity, 1.0)
        .with_weight(Strategy::Lexical, 0.0)
        .with_threshold(0.5);
    let mut matcher = ElementMatcher::new(config);
    matcher.add_evaluator(IdentityEvaluator::default());
    matcher.add_evaluator(LexicalEvaluator::default());

    let mut correspondences = Correspondences::new();
    matcher.run(&from, &to, &mut correspondences);
    assert!(correspondences.for_from(node(&from, "1")).is_none());
}

#[test]
fn test_greedy_matching_is_exclusive() {
    let from = package("P1", &[("a", "Order"), ("b", "OrderLine"), ("c", "Orders")]);
    let to = package("P2", &[("x", "Order")]);
    let matcher = lexical_matcher(0.1);

    let matrix = matcher.measure_similarities(&from, &to);
    let ranking = matcher.rank_similarities(&matrix, AGGREGATE);
    let mut correspondences = Correspondences::new();
    matcher.match_threshold(&ranking, &mut correspondences, 0.1);

    let targets: Vec<_> = correspondences.iter().map(|c| c.to).collect();
    let unique: HashSet<_> = targets.iter().collect();
    assert_eq!(targets.len(), unique.len());
    // the exact name wins the single class target
    let x = node(&to, "x");
    assert_eq!(correspondences.for_to(x).map(|c| c.from), Some(node(&from, "a")));
}

#[test]
fn test_pinned_correspondences_survive_rematching() {
    let from = package("P1", &[("a", "Order"), ("b", "Customer")]);
    let to = package("P2", &[("x", "Order"), ("y", "Customer")]);
    let matcher = lexical_matcher(0.5);

    let mut correspondences = Correspondences::new();
    // deliberately cross-wired pin
    correspondences.pin(node(&from, "a"), node(&to, "y"));

    let matrix = matcher.measure_similarities(&from, &to);
    let ranking = matcher.rank_similarities(&matrix, AGGREGATE);
    matcher.match_threshold(&ranking, &mut correspondences, 0.5);

    let pinned = correspondences.for_from(node(&from, "a")).unwrap();
    assert!(pinned.pinned);
    assert_eq!(pinned.to, node(&to, "y"));
    // "Customer" lost its target to the pin and nothing else is close enough
    assert!(correspondences.for_from(node(&from, "b")).is_none());
    assert!(correspondences.for_to(node(&to, "x")).is_none());
}

#[test]
fn test_rematching_replaces_unpinned_correspondences() {
    let from = package("P1", &[("a", "Order")]);
    let to = package("P2", &[("x", "Order"), ("y", "Invoice")]);
    let mut matcher = lexical_matcher(0.5);

    let mut correspondences = Correspondences::new();
    correspondences.insert(node(&from, "a"), node(&to, "y"));
    matcher.run(&from, &to, &mut correspondences);

    assert_eq!(correspondences.for_from(node(&from, "a")).unwrap().to, node(&to, "x"));
    let pairs = correspondences.id_pairs(&from, &to);
    assert!(pairs.contains(&("a".into(), "x".into())));
}

#[test]
fn test_failed_script_scores_with_weight_zero() {
    let from = package("P1", &[("a", "Order")]);
    let to = package("P2", &[("x", "Order")]);
    let mut matcher = lexical_matcher(0.5);
    let compile = |_: &Model, _: &Model| {
        Err::<ScriptTrace, _>(EvaluatorError::ScriptCompile("syntax error".into()))
    };
    matcher.add_evaluator(ScriptEvaluator::new(compile, 1.0));

    let failures = matcher.prepare(&from, &to);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Strategy::Script);

    let matrix = matcher.measure_similarities(&from, &to);
    let cell = matrix.cell(node(&from, "a"), node(&to, "x")).unwrap();
    assert!(cell.failed(2));
    assert!(cell.is_available());
    // lexical alone decides: 1.0² · 0.8 / 0.8
    assert_eq!(cell.aggregate(), 1.0);
}

#[test]
fn test_all_strategies_failing_leaves_row_unmatched() {
    let from = package("P1", &[("a", "Order")]);
    let to = package("P2", &[("x", "Order")]);
    let mut matcher = ElementMatcher::new(MatchConfig::default().with_threshold(0.0));
    // never prepared, so every lookup fails
    matcher.add_evaluator(ScriptEvaluator::new(
        |_: &Model, _: &Model| Ok::<_, EvaluatorError>(ScriptTrace::new()),
        1.0,
    ));

    let matrix = matcher.measure_similarities(&from, &to);
    let ranking = matcher.rank_similarities(&matrix, AGGREGATE);
    let mut correspondences = Correspondences::new();
    let matched = matcher.match_threshold(&ranking, &mut correspondences, 0.0);
    assert_eq!(matched, 0);
    assert!(correspondences.is_empty());
}

fn lexically_ranked_matcher() -> ElementMatcher {
    let config = MatchConfig::default().with_ranking(Strategy::Lexical);
    let mut matcher = ElementMatcher::new(config);
    matcher.add_evaluator(IdentityEvaluator::default());
    matcher.add_evaluator(LexicalEvaluator::default());
    matcher
}

#[test]
fn test_lexical_ranking_overrides_aggregate_order() {
    // "a" keeps its id but is renamed; "b" is a new id with the old name
    let from = package("P1", &[("a", "Order")]);
    let to = package("P2", &[("a", "Invoice"), ("b", "Order")]);
    let matcher = lexically_ranked_matcher();
    assert_eq!(matcher.ranking_slot(), 2);

    let matrix = matcher.measure_similarities(&from, &to);
    let (a, to_a, to_b) = (node(&from, "a"), node(&to, "a"), node(&to, "b"));
    // the aggregate prefers the shared id, the lexical slot the shared name
    assert_eq!(matrix.cell(a, to_a).unwrap().aggregate(), 1.0);
    assert!(matrix.cell(a, to_b).unwrap().aggregate() < 0.5);

    let ranking = matcher.rank_similarities(&matrix, matcher.ranking_slot());
    let row = ranking.rows.iter().find(|r| r.from == a).unwrap();
    assert_eq!(row.cells[0].to, to_b);

    let mut correspondences = Correspondences::new();
    matcher.match_threshold(&ranking, &mut correspondences, 0.5);
    assert_eq!(correspondences.for_from(a).map(|c| c.to), Some(to_b));
}

#[test]
fn test_limit_applies_to_ranking_slot_score() {
    let from = package("P1", &[("a", "Order")]);
    let to = package("P2", &[("a", "Invoice")]);
    let matcher = lexically_ranked_matcher();

    let matrix = matcher.measure_similarities(&from, &to);
    let (a, to_a) = (node(&from, "a"), node(&to, "a"));
    assert_eq!(matrix.cell(a, to_a).unwrap().aggregate(), 1.0);

    let ranking = matcher.rank_similarities(&matrix, matcher.ranking_slot());
    let mut correspondences = Correspondences::new();
    let matched = matcher.match_threshold(&ranking, &mut correspondences, 0.5);
    // aggregate 1.0 is not enough: the lexical score is 0.0
    assert_eq!(matched, 0);
    assert!(correspondences.for_from(a).is_none());
}
