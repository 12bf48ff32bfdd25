//! Date-keyed breadth history.
//!
//! The scan process may run several times a day; a later snapshot for the
//! same date replaces the earlier one. Iteration is always date-ascending.

use crate::domain::{BreadthReading, BreadthSnapshot};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreadthHistory {
    snapshots: BTreeMap<NaiveDate, BreadthSnapshot>,
}

impl BreadthHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot, replacing any existing one for the same date.
    /// Returns the replaced snapshot.
    pub fn upsert(&mut self, snapshot: BreadthSnapshot) -> Option<BreadthSnapshot> {
        self.snapshots.insert(snapshot.date, snapshot)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&BreadthSnapshot> {
        self.snapshots.get(&date)
    }

    /// Most recent snapshot dated on or before `date`.
    pub fn as_of(&self, date: NaiveDate) -> Option<&BreadthSnapshot> {
        self.snapshots.range(..=date).next_back().map(|(_, s)| s)
    }

    /// Forward-filled reading for a bar date.
    pub fn reading_at(&self, date: NaiveDate) -> BreadthReading {
        self.as_of(date)
            .map(BreadthReading::from_snapshot)
            .unwrap_or_else(BreadthReading::missing)
    }

    pub fn latest(&self) -> Option<&BreadthSnapshot> {
        self.snapshots.values().next_back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BreadthSnapshot> {
        self.snapshots.values()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl FromIterator<BreadthSnapshot> for BreadthHistory {
    /// Later items win on duplicate dates.
    fn from_iter<I: IntoIterator<Item = BreadthSnapshot>>(iter: I) -> Self {
        let mut history = Self::new();
        for snapshot in iter {
            history.upsert(snapshot);
        }
        history
    }
}
