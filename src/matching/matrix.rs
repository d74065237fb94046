//! Sparse pairwise score table.
//!
//! ```text
//! MeasureMatrix
//! └── rows: IndexMap<from, IndexMap<to, Cell>>
//!     Cell.scores[0]     aggregate
//!     Cell.scores[i + 1] strategy i
//! ```

use indexmap::IndexMap;

use crate::error::EvaluatorError;
use crate::model::NodeId;
use crate::similarity::Strategy;

/// Slot of the aggregate score in every cell.
pub const AGGREGATE: usize = 0;

/// Slot reserved for the identity-like strategy.
pub const IDENTITY_SLOT: usize = 1;

/// Scores of one (from, to) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub from: NodeId,
    pub to: NodeId,
    scores: Vec<f32>,
    failed: Vec<bool>,
}

impl Cell {
    fn new(from: NodeId, to: NodeId, slots: usize) -> Self {
        Self {
            from,
            to,
            scores: vec![0.0; slots],
            failed: vec![false; slots],
        }
    }

    /// Score in `slot`; 0.0 for unknown slots.
    pub fn score(&self, slot: usize) -> f32 {
        self.scores.get(slot).copied().unwrap_or(0.0)
    }

    pub fn aggregate(&self) -> f32 {
        self.score(AGGREGATE)
    }

    /// Whether the strategy in `slot` failed for this pair.
    pub fn failed(&self, slot: usize) -> bool {
        self.failed.get(slot).copied().unwrap_or(false)
    }

    /// False when every strategy failed for this pair.
    pub fn is_available(&self) -> bool {
        self.failed.len() <= 1 || self.failed[1..].iter().any(|f| !f)
    }
}

/// One row of a [`Ranking`]: candidates for `from`, best first.
#[derive(Clone, Debug)]
pub struct RankedRow {
    pub from: NodeId,
    pub cells: Vec<Cell>,
}

impl RankedRow {
    /// Best aggregate among the row's cells.
    pub fn best_aggregate(&self) -> f32 {
        self.cells
            .iter()
            .map(Cell::aggregate)
            .fold(0.0, f32::max)
    }
}

/// Fully sorted view of a [`MeasureMatrix`].
#[derive(Clone, Debug)]
pub struct Ranking {
    /// Slot the cells of each row are ordered by.
    pub slot: usize,
    /// Rows ordered by best aggregate, highest first.
    pub rows: Vec<RankedRow>,
}

/// Sparse score table over same-kind pairs.
#[derive(Clone, Debug, Default)]
pub struct MeasureMatrix {
    strategies: Vec<(Strategy, f32)>,
    rows: IndexMap<NodeId, IndexMap<NodeId, Cell>>,
}

impl MeasureMatrix {
    /// `strategies` are the active strategies with their effective weights,
    /// in slot order (strategy `i` lives in slot `i + 1`).
    pub fn new(strategies: Vec<(Strategy, f32)>) -> Self {
        Self {
            strategies,
            rows: IndexMap::new(),
        }
    }

    pub fn strategies(&self) -> &[(Strategy, f32)] {
        &self.strategies
    }

    /// Slot holding `strategy`'s scores.
    pub fn slot_of(&self, strategy: Strategy) -> Option<usize> {
        self.strategies
            .iter()
            .position(|(s, _)| *s == strategy)
            .map(|i| i + 1)
    }

    /// Store one result per strategy for (from, to) and refresh the aggregate.
    ///
    /// The cell is created on first use and reused afterwards. A failed
    /// strategy scores 0.0 and contributes no weight for this pair.
    pub fn put(
        &mut self,
        from: NodeId,
        to: NodeId,
        results: impl IntoIterator<Item = Result<f32, EvaluatorError>>,
    ) -> &Cell {
        let slots = self.strategies.len() + 1;
        let mut cell = self
            .rows
            .get(&from)
            .and_then(|row| row.get(&to))
            .cloned()
            .unwrap_or_else(|| Cell::new(from, to, slots));
        for (i, result) in results.into_iter().take(self.strategies.len()).enumerate() {
            let slot = i + 1;
            match result {
                Ok(score) => {
                    cell.scores[slot] = score;
                    cell.failed[slot] = false;
                }
                Err(_) => {
                    cell.scores[slot] = 0.0;
                    cell.failed[slot] = true;
                }
            }
        }
        cell.scores[AGGREGATE] = self.aggregate(&cell);
        let row = self.rows.entry(from).or_default();
        row.insert(to, cell);
        &row[&to]
    }

    /// Weighted mean of squared scores, short-circuited by an exact identity match.
    fn aggregate(&self, cell: &Cell) -> f32 {
        let mut total = 0.0f32;
        let mut total_weight = 0.0f32;
        for (i, (strategy, weight)) in self.strategies.iter().enumerate() {
            let slot = i + 1;
            if cell.failed(slot) {
                continue;
            }
            let score = cell.score(slot);
            if slot == IDENTITY_SLOT && *strategy == Strategy::Identity && score == 1.0 {
                return 1.0;
            }
            if *weight > 0.0 {
                total += score * score * weight;
                total_weight += weight;
            }
        }
        if total_weight != 0.0 {
            total / total_weight
        } else {
            0.0
        }
    }

    pub fn cell(&self, from: NodeId, to: NodeId) -> Option<&Cell> {
        self.rows.get(&from).and_then(|row| row.get(&to))
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = (NodeId, impl Iterator<Item = &Cell>)> {
        self.rows.iter().map(|(from, row)| (*from, row.values()))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(IndexMap::len).sum()
    }

    /// Sort every row by `slot`, then rows by best aggregate.
    ///
    /// Sorts are stable: equal scores keep insertion order and are never
    /// merged.
    pub fn rank(&self, slot: usize) -> Ranking {
        let mut rows: Vec<RankedRow> = self
            .rows
            .iter()
            .map(|(from, row)| {
                let mut cells: Vec<Cell> = row.values().cloned().collect();
                cells.sort_by(|a, b| b.score(slot).total_cmp(&a.score(slot)));
                RankedRow { from: *from, cells }
            })
            .collect();
        rows.sort_by(|a, b| b.best_aggregate().total_cmp(&a.best_aggregate()));
        Ranking { slot, rows }
    }
}
