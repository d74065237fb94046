//! Change records consumed from the change-log layer.
//!
//! Raw tool logs are parsed elsewhere; this module only holds the typed,
//! time-ordered result and the queries the matching engine needs.

use indexmap::IndexSet;

use crate::model::{ElementId, Feature, MergeSide};

/// What happened to an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum ChangeKind {
    Create,
    Update,
    Move,
    Delete,
}

/// One typed change record.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    pub element: ElementId,
    pub side: MergeSide,
    pub kind: ChangeKind,
    /// The slot touched by an update, if known.
    pub feature: Option<Feature>,
}

impl ChangeRecord {
    pub fn new(element: impl Into<ElementId>, side: MergeSide, kind: ChangeKind) -> Self {
        Self {
            element: element.into(),
            side,
            kind,
            feature: None,
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.feature = Some(feature);
        self
    }
}

/// Records committed together on one side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    pub side: MergeSide,
    pub records: Vec<ChangeRecord>,
}

impl Transaction {
    pub fn new(side: MergeSide) -> Self {
        Self {
            side,
            records: Vec::new(),
        }
    }

    /// Append a record; its side is forced to the transaction's side.
    pub fn record(mut self, element: impl Into<ElementId>, kind: ChangeKind) -> Self {
        self.records.push(ChangeRecord::new(element, self.side, kind));
        self
    }
}

/// Ordered sequence of transactions.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    transactions: Vec<Transaction>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.iter().all(|t| t.records.is_empty())
    }

    /// Every record for `id`, in log order.
    pub fn records_for<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = &'a ChangeRecord> {
        self.transactions
            .iter()
            .flat_map(|t| t.records.iter())
            .filter(move |r| &r.element == id)
    }

    /// Ids touched by any record on `side`, first-touch order.
    pub fn touched(&self, side: MergeSide) -> IndexSet<ElementId> {
        self.ids_where(|r| r.side == side)
    }

    /// Ids moved on `side`, first-move order.
    pub fn moved(&self, side: MergeSide) -> IndexSet<ElementId> {
        self.ids_where(|r| r.side == side && r.kind == ChangeKind::Move)
    }

    fn ids_where(&self, pred: impl Fn(&ChangeRecord) -> bool) -> IndexSet<ElementId> {
        self.transactions
            .iter()
            .flat_map(|t| t.records.iter())
            .filter(|r| pred(r))
            .map(|r| r.element.clone())
            .collect()
    }
}

impl FromIterator<Transaction> for ChangeLog {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}
