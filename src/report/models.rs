use serde::Serialize;

use crate::valuation::ValuationSnapshot;

/// Result of asking for a report refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "snapshot", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The pass finished and its snapshot was recorded in the report's history.
    Completed(ValuationSnapshot),
    /// Another refresh of the same report was in flight; this request was dropped.
    AlreadyRunning,
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> Option<&ValuationSnapshot> {
        match self {
            RefreshOutcome::Completed(snapshot) => Some(snapshot),
            RefreshOutcome::AlreadyRunning => None,
        }
    }

    pub fn into_snapshot(self) -> Option<ValuationSnapshot> {
        match self {
            RefreshOutcome::Completed(snapshot) => Some(snapshot),
            RefreshOutcome::AlreadyRunning => None,
        }
    }
}

/// A pass that stopped early and will resume on the next refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingStatus {
    /// Tab the next refresh starts from.
    pub next_tab: Option<u32>,
    pub tabs_done: usize,
    pub tabs_total: usize,
}
