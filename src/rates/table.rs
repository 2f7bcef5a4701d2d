use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{RateCategory, RateEntry};
use crate::league::LeagueKey;

/// Rates for every league the engine has refreshed.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    leagues: HashMap<LeagueKey, LeagueRates>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry of `category` for `league`. Other categories are untouched.
    pub fn upsert(&mut self, league: &LeagueKey, category: RateCategory, entries: Vec<RateEntry>) {
        self.leagues
            .entry(league.clone())
            .or_insert_with(|| LeagueRates::new(league.clone()))
            .upsert(category, entries);
    }

    /// All entries for `league`, categories in canonical order.
    pub fn snapshot(&self, league: &LeagueKey) -> Vec<RateEntry> {
        self.leagues
            .get(league)
            .map(|rates| rates.entries().cloned().collect())
            .unwrap_or_default()
    }

    pub fn find_candidates(
        &self,
        league: &LeagueKey,
        full_name_lowercase: &str,
    ) -> Vec<&RateEntry> {
        self.leagues
            .get(league)
            .map(|rates| rates.find_candidates(full_name_lowercase))
            .unwrap_or_default()
    }

    pub fn league(&self, league: &LeagueKey) -> Option<&LeagueRates> {
        self.leagues.get(league)
    }

    /// Install a whole league at once, replacing whatever was there.
    pub fn replace_league(&mut self, rates: LeagueRates) {
        self.leagues.insert(rates.league.clone(), rates);
    }
}

/// Rates for one league, keyed by category, with a full-name lookup index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredLeagueRates", into = "StoredLeagueRates")]
pub struct LeagueRates {
    league: LeagueKey,
    categories: BTreeMap<RateCategory, Vec<RateEntry>>,
    fetched_at: Option<DateTime<Utc>>,
    index: HashMap<String, Vec<(RateCategory, usize)>>,
}

#[derive(Serialize, Deserialize)]
struct StoredLeagueRates {
    league: LeagueKey,
    categories: BTreeMap<RateCategory, Vec<RateEntry>>,
    #[serde(default)]
    fetched_at: Option<DateTime<Utc>>,
}

impl From<StoredLeagueRates> for LeagueRates {
    fn from(stored: StoredLeagueRates) -> Self {
        let mut rates = LeagueRates::new(stored.league);
        rates.categories = stored.categories;
        rates.fetched_at = stored.fetched_at;
        rates.rebuild_index();
        rates
    }
}

impl From<LeagueRates> for StoredLeagueRates {
    fn from(rates: LeagueRates) -> Self {
        Self {
            league: rates.league,
            categories: rates.categories,
            fetched_at: rates.fetched_at,
        }
    }
}

impl LeagueRates {
    pub fn new(league: LeagueKey) -> Self {
        Self {
            league,
            categories: BTreeMap::new(),
            fetched_at: None,
            index: HashMap::new(),
        }
    }

    pub fn league(&self) -> &LeagueKey {
        &self.league
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn set_fetched_at(&mut self, at: DateTime<Utc>) {
        self.fetched_at = Some(at);
    }

    /// Replace `category` wholesale. Duplicate quotes (same name and
    /// attributes) keep their first occurrence.
    pub fn upsert(&mut self, category: RateCategory, entries: Vec<RateEntry>) {
        let mut seen = HashSet::new();
        let entries: Vec<RateEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(DedupKey::from(entry)))
            .collect();
        self.categories.insert(category, entries);
        self.rebuild_index();
    }

    pub fn category(&self, category: RateCategory) -> &[RateEntry] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RateEntry> {
        self.categories.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries whose lowercase full name equals `full_name_lowercase`, in table order.
    pub fn find_candidates(&self, full_name_lowercase: &str) -> Vec<&RateEntry> {
        self.index
            .get(full_name_lowercase)
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|(category, idx)| {
                        self.categories.get(category).and_then(|v| v.get(*idx))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First entry with this exact display name, e.g. a currency by name.
    pub fn find_by_name(&self, name: &str) -> Option<&RateEntry> {
        self.entries().find(|entry| entry.name == name)
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (category, entries) in &self.categories {
            for (idx, entry) in entries.iter().enumerate() {
                self.index
                    .entry(entry.full_name_lowercase.clone())
                    .or_default()
                    .push((*category, idx));
            }
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
struct DedupKey {
    full_name_lowercase: String,
    variant: Option<String>,
    links: Option<u32>,
    gem_level: Option<u32>,
    gem_quality: Option<u32>,
    corrupted: Option<bool>,
    quality: Option<u32>,
    level: Option<u32>,
    map_tier: Option<u32>,
    is_relic: bool,
}

impl From<&RateEntry> for DedupKey {
    fn from(entry: &RateEntry) -> Self {
        Self {
            full_name_lowercase: entry.full_name_lowercase.clone(),
            variant: entry.variant.clone(),
            links: entry.links,
            gem_level: entry.gem_level,
            gem_quality: entry.gem_quality,
            corrupted: entry.corrupted,
            quality: entry.quality,
            level: entry.level,
            map_tier: entry.map_tier,
            is_relic: entry.is_relic,
        }
    }
}
