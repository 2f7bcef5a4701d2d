#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use stashworth::error::FetchResponse;
use stashworth::league::LeagueKey;
use stashworth::rates::{FeedPayload, RateCategory, RateSource};
use stashworth::stash::{InventoryItem, StashSource, TabDescriptor, TabItems, TabList};
use tokio::sync::Notify;

/// Price feed answering from a per-category script. Unscripted categories are 404.
#[derive(Default)]
pub struct MockRateSource {
    responses: Mutex<HashMap<RateCategory, FetchResponse<FeedPayload>>>,
    calls: Mutex<Vec<(RateCategory, LeagueKey)>>,
}

impl MockRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(self, category: RateCategory, payload: FeedPayload) -> Self {
        self.set(category, FetchResponse::ok(payload));
        self
    }

    pub fn set(&self, category: RateCategory, response: FetchResponse<FeedPayload>) {
        self.responses
            .lock()
            .unwrap()
            .insert(category, response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn leagues_requested(&self) -> Vec<LeagueKey> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, league)| league.clone())
            .collect()
    }
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch_rates(
        &self,
        category: RateCategory,
        league: &LeagueKey,
        _date: NaiveDate,
    ) -> Result<FetchResponse<FeedPayload>> {
        self.calls.lock().unwrap().push((category, league.clone()));
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_else(|| FetchResponse::status(404));
        Ok(response)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Holds a fetch until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// Stash answering from scripted responses.
///
/// Each tab has a queue of responses; the last one repeats once the others are used up.
#[derive(Default)]
pub struct MockStashSource {
    tab_list: Mutex<Option<FetchResponse<TabList>>>,
    tabs: Mutex<HashMap<u32, VecDeque<FetchResponse<TabItems>>>>,
    list_calls: Mutex<usize>,
    tab_calls: Mutex<HashMap<u32, usize>>,
    leagues: Mutex<Vec<LeagueKey>>,
    gate: Option<Arc<Gate>>,
}

impl MockStashSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A visible tab holding `items`.
    pub fn with_tab(self, index: u32, name: &str, items: Vec<InventoryItem>) -> Self {
        self.with_descriptor(TabDescriptor::new(index, name))
            .with_responses(index, vec![FetchResponse::ok(TabItems { items })])
    }

    pub fn with_descriptor(self, tab: TabDescriptor) -> Self {
        {
            let mut list = self.tab_list.lock().unwrap();
            let list = list.get_or_insert_with(|| FetchResponse::ok(TabList::default()));
            if let Some(data) = list.data.as_mut() {
                data.tabs.push(tab);
            }
        }
        self
    }

    pub fn with_responses(self, index: u32, responses: Vec<FetchResponse<TabItems>>) -> Self {
        self.tabs
            .lock()
            .unwrap()
            .insert(index, responses.into_iter().collect());
        self
    }

    pub fn with_tab_list_response(self, response: FetchResponse<TabList>) -> Self {
        *self.tab_list.lock().unwrap() = Some(response);
        self
    }

    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub fn tab_calls(&self, index: u32) -> usize {
        self.tab_calls
            .lock()
            .unwrap()
            .get(&index)
            .copied()
            .unwrap_or(0)
    }

    pub fn leagues_requested(&self) -> Vec<LeagueKey> {
        self.leagues.lock().unwrap().clone()
    }
}

#[async_trait]
impl StashSource for MockStashSource {
    async fn fetch_tab_list(&self, league: &LeagueKey) -> Result<FetchResponse<TabList>> {
        *self.list_calls.lock().unwrap() += 1;
        self.leagues.lock().unwrap().push(league.clone());
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        let response = self
            .tab_list
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| FetchResponse::ok(TabList::default()));
        Ok(response)
    }

    async fn fetch_tab_items(
        &self,
        league: &LeagueKey,
        tab_index: u32,
    ) -> Result<FetchResponse<TabItems>> {
        *self.tab_calls.lock().unwrap().entry(tab_index).or_insert(0) += 1;
        self.leagues.lock().unwrap().push(league.clone());

        let mut tabs = self.tabs.lock().unwrap();
        let response = match tabs.get_mut(&tab_index) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| FetchResponse::status(404)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn currency_feed(lines: serde_json::Value) -> FeedPayload {
    serde_json::from_value(json!({ "lines": lines, "currencyDetails": [] }))
        .expect("valid currency feed")
}

pub fn item_feed(lines: serde_json::Value) -> FeedPayload {
    serde_json::from_value(json!({ "lines": lines })).expect("valid item feed")
}

/// Exalted Orb at 60 chaos plus two Enhance Support quotes, level 2 listed first.
pub fn standard_rates() -> MockRateSource {
    MockRateSource::new()
        .with_payload(
            RateCategory::Currency,
            currency_feed(json!([
                { "currencyTypeName": "Exalted Orb", "chaosEquivalent": 60.0 }
            ])),
        )
        .with_payload(
            RateCategory::Gem,
            item_feed(json!([
                { "name": "Enhance Support", "gemLevel": 2, "gemQuality": 0, "chaosValue": 50.0 },
                { "name": "Enhance Support", "gemLevel": 1, "gemQuality": 0, "chaosValue": 5.0 }
            ])),
        )
}

pub fn chaos_stack(size: u32) -> InventoryItem {
    InventoryItem::new("Chaos Orb").with_stack_size(size)
}
