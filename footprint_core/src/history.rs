//! Bounded snapshot history.
//!
//! Keeps the most recent [`HISTORY_CAPACITY`] submissions in chronological
//! order and computes the aggregates shown on the dashboard.

use crate::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of snapshots retained per session
pub const HISTORY_CAPACITY: usize = 30;

/// Chronological, capacity-bounded list of snapshots (oldest first)
///
/// Deserializing a longer list keeps only the newest entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Snapshot>", into = "Vec<Snapshot>")]
pub struct History {
    entries: VecDeque<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot, evicting the oldest entries beyond capacity
    pub fn append(&mut self, snap: Snapshot) {
        self.entries.push_back(snap);
        while self.entries.len() > HISTORY_CAPACITY {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!("Evicted snapshot from {}", evicted.timestamp);
            }
        }
    }

    /// Arithmetic mean of all totals, or 0 when empty
    pub fn average(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.entries.iter().map(|s| s.total).sum();
        sum / self.entries.len() as f64
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    /// Chart labels, `YYYY-MM-DD HH:MM` per snapshot
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|s| s.timestamp.format("%Y-%m-%d %H:%M").to_string())
            .collect()
    }

    /// Totals in chronological order
    pub fn totals(&self) -> Vec<f64> {
        self.entries.iter().map(|s| s.total).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Snapshot> {
        self.entries.iter().cloned().collect()
    }
}

impl From<Vec<Snapshot>> for History {
    fn from(snapshots: Vec<Snapshot>) -> Self {
        let skip = snapshots.len().saturating_sub(HISTORY_CAPACITY);
        if skip > 0 {
            tracing::warn!(
                "Stored history has {} snapshots, keeping the newest {}",
                snapshots.len(),
                HISTORY_CAPACITY
            );
        }
        Self {
            entries: snapshots.into_iter().skip(skip).collect(),
        }
    }
}

impl From<History> for Vec<Snapshot> {
    fn from(history: History) -> Self {
        history.entries.into()
    }
}
