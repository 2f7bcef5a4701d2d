use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::league::LeagueKey;
use crate::rates::RateEntry;
use crate::stash::InventoryItem;

/// Where one folded stack came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterChild {
    pub tab_index: u32,
    pub tab_name: String,
    pub item: InventoryItem,
}

/// Items sharing a full name, priced by one rate entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedClusterEntry {
    /// The first stack seen for this name.
    pub item: InventoryItem,
    pub rate: RateEntry,
    pub stack_size: u64,
    pub chaos_value: f64,
    /// Every stack folded into the cluster, the representative included.
    pub children: Vec<ClusterChild>,
}

impl MatchedClusterEntry {
    pub fn full_name(&self) -> &str {
        self.item.full_name()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<LeagueKey>,
    /// Sum of every cluster's chaos value.
    pub total: f64,
    /// Sorted by chaos value, most valuable first.
    pub items: Vec<MatchedClusterEntry>,
}

impl ValuationSnapshot {
    /// Build a snapshot from already-sorted clusters.
    pub fn new(created_at: DateTime<Utc>, items: Vec<MatchedClusterEntry>) -> Self {
        let total = items.iter().map(|c| c.chaos_value).sum();
        Self {
            id: Uuid::new_v4(),
            created_at,
            league: None,
            total,
            items,
        }
    }

    pub fn with_league(mut self, league: LeagueKey) -> Self {
        self.league = Some(league);
        self
    }

    /// A snapshot with only a total, for history bookkeeping and tests.
    pub fn with_total(created_at: DateTime<Utc>, total: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
            league: None,
            total,
            items: Vec::new(),
        }
    }
}
