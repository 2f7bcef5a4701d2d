//! Folds matched stash items into per-name clusters.

use std::collections::HashMap;

use crate::rates::{chaos_orb_entry, LeagueRates, RateCategory, RateEntry, CHAOS_ORB};
use crate::stash::{InventoryItem, StashTab, TabScope};

use super::matcher::match_in;
use super::models::{ClusterChild, MatchedClusterEntry};

#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    pub scope: TabScope,
    /// Keep only items priced from the currency category.
    pub currency_only: bool,
}

/// Scratch state of an aggregation pass.
///
/// Tabs are added one at a time; nothing is published until
/// [`ClusterSet::into_sorted`] is called.
#[derive(Debug, Default)]
pub struct ClusterSet {
    clusters: Vec<MatchedClusterEntry>,
    by_name: HashMap<String, usize>,
}

impl ClusterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every matched item of an in-scope tab. Out-of-scope and hidden tabs are ignored.
    pub fn add_tab(&mut self, tab: &StashTab, rates: &LeagueRates, options: &AggregateOptions) {
        if !options.scope.includes(&tab.tab) {
            return;
        }
        for item in &tab.items {
            let Some(rate) = price_item(item, rates) else {
                continue;
            };
            if options.currency_only && rate.category != RateCategory::Currency {
                continue;
            }
            self.add(tab, item, rate);
        }
    }

    fn add(&mut self, tab: &StashTab, item: &InventoryItem, rate: RateEntry) {
        let stack_size = u64::from(item.stack_size);
        let value = stack_size as f64 * rate.chaos_value;
        let child = ClusterChild {
            tab_index: tab.tab.index,
            tab_name: tab.tab.name.clone(),
            item: item.clone(),
        };

        match self.by_name.get(item.full_name()).copied() {
            Some(idx) => {
                let cluster = &mut self.clusters[idx];
                cluster.stack_size += stack_size;
                cluster.chaos_value += value;
                cluster.children.push(child);
            }
            None => {
                self.by_name
                    .insert(item.full_name().to_string(), self.clusters.len());
                self.clusters.push(MatchedClusterEntry {
                    item: item.clone(),
                    rate,
                    stack_size,
                    chaos_value: value,
                    children: vec![child],
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters by descending value; equal values keep first-seen order.
    pub fn into_sorted(self) -> Vec<MatchedClusterEntry> {
        let mut clusters = self.clusters;
        clusters.sort_by(|a, b| b.chaos_value.total_cmp(&a.chaos_value));
        clusters
    }
}

/// Aggregate a set of fetched tabs in one go.
pub fn aggregate(
    tabs: &[StashTab],
    rates: &LeagueRates,
    options: &AggregateOptions,
) -> Vec<MatchedClusterEntry> {
    let mut set = ClusterSet::new();
    for tab in tabs {
        set.add_tab(tab, rates, options);
    }
    set.into_sorted()
}

/// The rate that prices `item`, if any.
///
/// Chaos Orbs are the unit of account and are always worth exactly one,
/// whether or not the feed quoted them.
fn price_item(item: &InventoryItem, rates: &LeagueRates) -> Option<RateEntry> {
    let matched = match_in(item, rates).cloned();
    if item.type_line != CHAOS_ORB {
        return matched;
    }
    let mut rate = matched.unwrap_or_else(|| chaos_orb_entry(None));
    rate.chaos_value = 1.0;
    Some(rate)
}
