use super::correspondence::Correspondences;
use super::matrix::{AGGREGATE, MeasureMatrix, Ranking};
use crate::config::MatchConfig;
use crate::error::EvaluatorError;
use crate::model::{ElementKind, Model, NodeId};
use crate::similarity::{
    DependencyEvaluator, IdentityEvaluator, LexicalEvaluator, SimilarityEvaluator, Strategy,
    StructuralEvaluator,
};
use crate::trace::Trace;

/// Proposes correspondences between two models lacking shared identity.
///
/// ```text
/// measure_similarities ─▶ MeasureMatrix ─▶ rank_similarities ─▶ Ranking
///                                                                  │
///                               Correspondences ◀── match_threshold┘
/// ```
pub struct ElementMatcher {
    evaluators: Vec<Box<dyn SimilarityEvaluator>>,
    config: MatchConfig,
    trace: Trace,
}

impl ElementMatcher {
    /// A matcher without evaluators.
    pub fn new(config: MatchConfig) -> Self {
        let trace = config.trace();
        Self {
            evaluators: Vec::new(),
            config,
            trace,
        }
    }

    /// A matcher with identity, lexical, structural and dependency evaluators.
    pub fn with_default_evaluators(config: MatchConfig) -> Self {
        let mut matcher = Self::new(config);
        matcher.add_evaluator(IdentityEvaluator::default());
        matcher.add_evaluator(LexicalEvaluator::default());
        matcher.add_evaluator(StructuralEvaluator::default());
        matcher.add_evaluator(DependencyEvaluator::default());
        matcher
    }

    /// Register an evaluator. The identity strategy always takes the
    /// reserved first slot.
    pub fn add_evaluator(&mut self, evaluator: impl SimilarityEvaluator + 'static) {
        if evaluator.strategy() == Strategy::Identity {
            self.evaluators.insert(0, Box::new(evaluator));
        } else {
            self.evaluators.push(Box::new(evaluator));
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Active strategies with their effective weights, in slot order.
    pub fn strategies(&self) -> Vec<(Strategy, f32)> {
        self.evaluators
            .iter()
            .map(|e| {
                let strategy = e.strategy();
                (strategy, self.config.weight_for(strategy, e.initial_weight()))
            })
            .collect()
    }

    /// Run every evaluator's one-time setup for this model pair.
    ///
    /// Failures are returned, not raised: the failed strategy then reports an
    /// error for every pair and is scored with weight 0.
    pub fn prepare(&mut self, from: &Model, to: &Model) -> Vec<(Strategy, EvaluatorError)> {
        let mut failures = Vec::new();
        for evaluator in &mut self.evaluators {
            if let Err(err) = evaluator.prepare(from, to) {
                tracing::warn!(
                    strategy = ?evaluator.strategy(),
                    error = %err,
                    "evaluator setup failed"
                );
                failures.push((evaluator.strategy(), err));
            }
        }
        failures
    }

    /// Score every same-kind pair across the two models.
    pub fn measure_similarities(&self, from: &Model, to: &Model) -> MeasureMatrix {
        let mut matrix = MeasureMatrix::new(self.strategies());
        let targets: Vec<NodeId> = to.preorder();
        for from_node in from.preorder() {
            let Some(source) = from.element_ref(from_node) else {
                continue;
            };
            if source.kind() == ElementKind::None {
                continue;
            }
            for &to_node in &targets {
                let Some(target) = to.element_ref(to_node) else {
                    continue;
                };
                if target.kind() != source.kind() {
                    continue;
                }
                let results: Vec<_> = self
                    .evaluators
                    .iter()
                    .map(|e| {
                        e.evaluate(source, target).inspect_err(|err| {
                            self.trace.trace(
                                "matcher",
                                format_args!("{:?} unavailable for pair: {err}", e.strategy()),
                            );
                        })
                    })
                    .collect();
                matrix.put(from_node, to_node, results);
            }
        }
        self.trace.debug(
            "matcher",
            format_args!(
                "measured {} cells over {} rows",
                matrix.cell_count(),
                matrix.row_count()
            ),
        );
        matrix
    }

    /// Sort the matrix by `slot` (0 = aggregate).
    pub fn rank_similarities(&self, matrix: &MeasureMatrix, slot: usize) -> Ranking {
        matrix.rank(slot)
    }

    /// Greedy one-to-one assignment over a ranking.
    ///
    /// Unpinned correspondences of ranked rows are cleared first. Rows are then
    /// visited best first, and each takes its first candidate that is still
    /// free and scores at least `limit` in the ranking slot. Pinned
    /// correspondences are never touched and keep their targets reserved.
    pub fn match_threshold(
        &self,
        ranking: &Ranking,
        correspondences: &mut Correspondences,
        limit: f32,
    ) -> usize {
        for row in &ranking.rows {
            if !correspondences.is_pinned(row.from) {
                correspondences.remove(row.from);
            }
        }

        let mut matched = 0;
        for row in &ranking.rows {
            if correspondences.is_pinned(row.from) {
                continue;
            }
            let candidate = row.cells.iter().find(|cell| {
                cell.is_available()
                    && correspondences.for_to(cell.to).is_none()
                    && cell.score(ranking.slot) >= limit
            });
            match candidate {
                Some(cell) => {
                    correspondences.insert(row.from, cell.to);
                    matched += 1;
                }
                None => self
                    .trace
                    .trace("matcher", format_args!("{:?} left unmatched", row.from)),
            }
        }
        self.trace.debug(
            "matcher",
            format_args!("matched {matched} of {} rows at limit {limit}", ranking.rows.len()),
        );
        matched
    }

    /// Slot named by the configured ranking strategy, else the aggregate.
    pub fn ranking_slot(&self) -> usize {
        self.config
            .ranking
            .and_then(|strategy| self.evaluators.iter().position(|e| e.strategy() == strategy))
            .map_or(AGGREGATE, |i| i + 1)
    }

    /// Prepare, measure, rank and match with the configured threshold.
    pub fn run(
        &mut self,
        from: &Model,
        to: &Model,
        correspondences: &mut Correspondences,
    ) -> usize {
        self.prepare(from, to);
        let matrix = self.measure_similarities(from, to);
        let ranking = self.rank_similarities(&matrix, self.ranking_slot());
        self.match_threshold(&ranking, correspondences, self.config.threshold)
    }
}
