//! Bounded, most-recent-first sequence of valuation snapshots.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::models::ValuationSnapshot;
use crate::error::DataWarning;

/// Snapshots kept per report, roughly a day of hourly refreshes.
pub const MAX_HISTORY: usize = 24;

fn default_capacity() -> usize {
    MAX_HISTORY
}

fn clamp_capacity(capacity: usize) -> usize {
    capacity.clamp(1, MAX_HISTORY)
}

fn deserialize_capacity<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    usize::deserialize(deserializer).map(clamp_capacity)
}

/// Capacity is always within `1..=MAX_HISTORY`, however it was configured or stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationHistory {
    #[serde(
        default = "default_capacity",
        deserialize_with = "deserialize_capacity"
    )]
    capacity: usize,
    /// Most recent first.
    #[serde(default)]
    snapshots: Vec<ValuationSnapshot>,
}

impl Default for ValuationHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl ValuationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: clamp_capacity(capacity),
            snapshots: Vec::new(),
        }
    }

    /// Re-bound the history, dropping the oldest snapshots that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = clamp_capacity(capacity);
        self.snapshots.truncate(self.capacity);
    }

    /// Add the newest snapshot, evicting the oldest ones past capacity.
    pub fn record(&mut self, snapshot: ValuationSnapshot) {
        let snapshots = std::mem::take(&mut self.snapshots);
        self.snapshots = record_bounded(snapshots, snapshot, self.capacity);
    }

    pub fn snapshots(&self) -> &[ValuationSnapshot] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&ValuationSnapshot> {
        self.snapshots.first()
    }

    pub fn previous(&self) -> Option<&ValuationSnapshot> {
        self.snapshots.get(1)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change from the previous snapshot to the latest one.
    pub fn latest_change(&self) -> Option<ValueChange> {
        Some(change_between(self.latest()?, self.previous()?))
    }
}

/// Prepend `snapshot` and keep at most [`MAX_HISTORY`] entries.
pub fn record(
    history: Vec<ValuationSnapshot>,
    snapshot: ValuationSnapshot,
) -> Vec<ValuationSnapshot> {
    record_bounded(history, snapshot, MAX_HISTORY)
}

fn record_bounded(
    mut history: Vec<ValuationSnapshot>,
    snapshot: ValuationSnapshot,
    capacity: usize,
) -> Vec<ValuationSnapshot> {
    history.insert(0, snapshot);
    history.truncate(capacity);
    history
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub direction: Direction,
    /// Magnitude of the change in percent, rounded to two decimals.
    pub absolute_percent: f64,
    /// Magnitude of the change in chaos.
    pub absolute_value: f64,
}

/// Period-over-period change. A zero baseline reports no direction.
pub fn change_between(newer: &ValuationSnapshot, older: &ValuationSnapshot) -> ValueChange {
    let absolute_value = (newer.total - older.total).abs();

    if older.total == 0.0 {
        warn!(warning = ?DataWarning::ZeroBaseline, "change computed against an empty snapshot");
        return ValueChange {
            direction: Direction::None,
            absolute_percent: 0.0,
            absolute_value,
        };
    }

    let percent = round2((newer.total - older.total) / older.total * 100.0);
    let direction = if percent > 0.0 {
        Direction::Up
    } else if percent < 0.0 {
        Direction::Down
    } else {
        Direction::None
    };

    ValueChange {
        direction,
        absolute_percent: percent.abs(),
        absolute_value,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
