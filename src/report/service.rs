//! Rate and report refresh passes.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::models::{PendingStatus, RefreshOutcome};
use crate::clock::{Clock, SystemClock};
use crate::config::{RefreshConfig, ReportConfig};
use crate::error::{classify_status, EngineError, EngineResult};
use crate::format::ValueFormat;
use crate::league::LeagueKey;
use crate::rates::{normalize, LeagueRates, RateCategory, RateEntry, RateSource, RateTable};
use crate::staleness::check_staleness;
use crate::stash::{StashSource, StashTab, TabDescriptor};
use crate::storage::{get_json, keys, set_json, KeyValueStore};
use crate::valuation::{
    holdings, AggregateOptions, ClusterSet, Holdings, ValuationHistory, ValuationSnapshot,
};

/// Scratch state of a report pass. Published only when every tab is in.
struct PendingPass {
    league: LeagueKey,
    tabs: Option<Vec<TabDescriptor>>,
    next: usize,
    clusters: ClusterSet,
}

impl PendingPass {
    fn new(league: LeagueKey) -> Self {
        Self {
            league,
            tabs: None,
            next: 0,
            clusters: ClusterSet::new(),
        }
    }

    fn next_tab(&self) -> Option<u32> {
        self.tabs
            .as_ref()
            .and_then(|tabs| tabs.get(self.next))
            .map(|tab| tab.index)
    }

    fn status(&self) -> PendingStatus {
        PendingStatus {
            next_tab: self.next_tab(),
            tabs_done: self.next,
            tabs_total: self.tabs.as_ref().map_or(0, Vec::len),
        }
    }
}

/// Marks a report as refreshing until dropped.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    report: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<String>>, report: &str) -> Option<Self> {
        let mut running = in_flight.lock().expect("in-flight lock poisoned");
        if !running.insert(report.to_string()) {
            return None;
        }
        Some(Self {
            in_flight,
            report: report.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut running) = self.in_flight.lock() {
            running.remove(&self.report);
        }
    }
}

fn transport(context: &str, err: anyhow::Error) -> EngineError {
    EngineError::transient(format!("{context}: {err:#}"))
}

pub struct ReportService {
    account: String,
    rate_source: Arc<dyn RateSource>,
    stash_source: Arc<dyn StashSource>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    refresh: RefreshConfig,
    display: ValueFormat,
    rates: RwLock<RateTable>,
    in_flight: Mutex<HashSet<String>>,
    pending: Mutex<HashMap<String, PendingPass>>,
}

impl ReportService {
    pub fn new(
        account: impl Into<String>,
        rate_source: Arc<dyn RateSource>,
        stash_source: Arc<dyn StashSource>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            account: account.into(),
            rate_source,
            stash_source,
            store,
            clock: Arc::new(SystemClock),
            refresh: RefreshConfig::default(),
            display: ValueFormat::default(),
            rates: RwLock::new(RateTable::new()),
            in_flight: Mutex::new(HashSet::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_refresh_config(mut self, refresh: RefreshConfig) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_display(mut self, display: ValueFormat) -> Self {
        self.display = display;
        self
    }

    /// Fetch every rate category for a league and install the result.
    ///
    /// All-or-nothing: if any category fails the previous table stays in place.
    pub async fn refresh_rates(&self, league: &LeagueKey) -> EngineResult<LeagueRates> {
        let date = self.clock.today();
        info!(%league, source = self.rate_source.name(), %date, "refreshing rates");

        let fetches = RateCategory::ALL.iter().map(|&category| async move {
            let context = format!("fetching {category} rates for {league}");
            let response = self
                .rate_source
                .fetch_rates(category, league, date)
                .await
                .map_err(|e| transport(&context, e))?;
            let entries: Vec<RateEntry> = classify_status(response, &context)?
                .map(|payload| normalize(category, &payload))
                .unwrap_or_default();
            debug!(%league, ?category, count = entries.len(), "rates normalized");
            Ok::<_, EngineError>((category, entries))
        });

        let mut fetched = Vec::with_capacity(RateCategory::ALL.len());
        let mut failure: Option<EngineError> = None;
        for result in join_all(fetches).await {
            match result {
                Ok(category_entries) => fetched.push(category_entries),
                Err(err) => {
                    let replace = match &failure {
                        None => true,
                        Some(existing) => err.is_logged_out() && !existing.is_logged_out(),
                    };
                    if replace {
                        failure = Some(err);
                    }
                }
            }
        }
        if let Some(err) = failure {
            warn!(%league, error = %err, "rate refresh failed, keeping previous rates");
            return Err(err);
        }

        let mut rates = LeagueRates::new(league.clone());
        for (category, entries) in fetched {
            rates.upsert(category, entries);
        }
        rates.set_fetched_at(self.clock.now());

        self.rates.write().await.replace_league(rates.clone());
        let key = keys::rates_key(&self.account, league);
        let ttl = Some(self.refresh.rates_ttl_secs);
        if let Err(err) = set_json(self.store.as_ref(), &key, &rates, ttl).await {
            warn!(%league, error = %err, "failed to cache rates");
        }

        info!(%league, entries = rates.len(), "rates refreshed");
        Ok(rates)
    }

    /// The league's rates, refreshed only when neither memory nor the store holds a fresh copy.
    pub async fn rates_for(&self, league: &LeagueKey) -> EngineResult<LeagueRates> {
        if let Some(rates) = self.fresh_rates(league).await? {
            return Ok(rates);
        }
        self.refresh_rates(league).await
    }

    async fn fresh_rates(&self, league: &LeagueKey) -> EngineResult<Option<LeagueRates>> {
        let threshold = self.refresh.rates_staleness();
        let now = self.clock.now();

        if let Some(rates) = self.rates.read().await.league(league) {
            if !check_staleness(rates.fetched_at(), threshold, now).is_stale {
                return Ok(Some(rates.clone()));
            }
        }

        let key = keys::rates_key(&self.account, league);
        let Some(cached) = get_json::<LeagueRates>(self.store.as_ref(), &key).await? else {
            return Ok(None);
        };
        if cached.league() != league
            || check_staleness(cached.fetched_at(), threshold, now).is_stale
        {
            return Ok(None);
        }
        debug!(%league, "using cached rates from store");
        self.rates.write().await.replace_league(cached.clone());
        Ok(Some(cached))
    }

    /// Whatever rates are on hand for a league, however old. Never fetches.
    async fn known_rates(&self, league: &LeagueKey) -> EngineResult<Option<LeagueRates>> {
        if let Some(rates) = self.rates.read().await.league(league) {
            return Ok(Some(rates.clone()));
        }
        let key = keys::rates_key(&self.account, league);
        Ok(get_json(self.store.as_ref(), &key).await?)
    }

    /// Value a report's tabs and record the snapshot in its history.
    ///
    /// A refresh of a report that is already refreshing is dropped. A pass
    /// stopped by rate limiting or a transient failure keeps what it has and
    /// the next call resumes at the failed tab; a rejected session discards it.
    pub async fn refresh_report(&self, report: &ReportConfig) -> EngineResult<RefreshOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &report.name) else {
            info!(report = %report.name, "refresh already in flight, dropping request");
            return Ok(RefreshOutcome::AlreadyRunning);
        };

        let league = report.league_key();
        let rates = self.rates_for(&league).await?;

        let mut pass = self.take_pending(&report.name, &league);
        match self.run_pass(report, &rates, &mut pass).await {
            Ok(()) => {}
            Err(err) => {
                if err.retry() {
                    warn!(
                        report = %report.name,
                        error = %err,
                        next_tab = ?pass.next_tab(),
                        "report pass interrupted, keeping progress"
                    );
                    self.pending
                        .lock()
                        .expect("pending lock poisoned")
                        .insert(report.name.clone(), pass);
                } else {
                    warn!(
                        report = %report.name,
                        error = %err,
                        "report pass aborted, discarding progress"
                    );
                }
                return Err(err);
            }
        }

        let snapshot = ValuationSnapshot::new(self.clock.now(), pass.clusters.into_sorted())
            .with_league(league.clone());

        let mut history = self.history(report).await?;
        history.record(snapshot.clone());
        let key = keys::history_key(&self.account, &league, &report.name);
        let ttl = Some(self.refresh.history_ttl_secs);
        set_json(self.store.as_ref(), &key, &history, ttl).await?;

        info!(
            report = %report.name,
            %league,
            total = snapshot.total,
            clusters = snapshot.items.len(),
            "report refreshed"
        );
        Ok(RefreshOutcome::Completed(snapshot))
    }

    fn take_pending(&self, report: &str, league: &LeagueKey) -> PendingPass {
        let mut pending = self.pending.lock().expect("pending lock poisoned");
        match pending.remove(report) {
            Some(pass) if &pass.league == league => {
                debug!(report, next_tab = ?pass.next_tab(), "resuming report pass");
                pass
            }
            _ => PendingPass::new(league.clone()),
        }
    }

    async fn run_pass(
        &self,
        report: &ReportConfig,
        rates: &LeagueRates,
        pass: &mut PendingPass,
    ) -> EngineResult<()> {
        let league = pass.league.clone();
        let options = AggregateOptions {
            scope: report.tabs.clone(),
            currency_only: report.currency_only,
        };

        if pass.tabs.is_none() {
            let context = format!("listing stash tabs in {league}");
            let response = self
                .stash_source
                .fetch_tab_list(&league)
                .await
                .map_err(|e| transport(&context, e))?;
            let list = classify_status(response, &context)?.unwrap_or_default();
            debug!(%league, tabs = list.tabs.len(), "stash tabs listed");
            pass.tabs = Some(list.tabs);
        }
        let tabs = pass.tabs.clone().unwrap_or_default();

        while let Some(tab) = tabs.get(pass.next) {
            if !options.scope.includes(tab) {
                pass.next += 1;
                continue;
            }

            let context = format!("fetching stash tab {} in {league}", tab.index);
            let response = self
                .stash_source
                .fetch_tab_items(&league, tab.index)
                .await
                .map_err(|e| transport(&context, e))?;
            let items = match classify_status(response, &context) {
                Ok(items) => items.map(|t| t.items).unwrap_or_default(),
                Err(EngineError::RateLimited { .. }) => {
                    return Err(EngineError::RateLimited {
                        resume_from_tab: Some(tab.index),
                    });
                }
                Err(err) => return Err(err),
            };

            debug!(%league, tab_index = tab.index, items = items.len(), "stash tab fetched");
            pass.clusters
                .add_tab(&StashTab::new(tab.clone(), items), rates, &options);
            pass.next += 1;
        }

        Ok(())
    }

    /// Drop a report's interrupted pass. Returns whether one existed.
    pub fn discard_pending(&self, report: &str) -> bool {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .remove(report)
            .is_some()
    }

    pub fn pending(&self, report: &str) -> Option<PendingStatus> {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .get(report)
            .map(PendingPass::status)
    }

    pub fn is_refreshing(&self, report: &str) -> bool {
        self.in_flight
            .lock()
            .expect("in-flight lock poisoned")
            .contains(report)
    }

    /// The report's stored history, most recent first, bounded by the configured `max_history`.
    pub async fn history(&self, report: &ReportConfig) -> EngineResult<ValuationHistory> {
        let key = keys::history_key(&self.account, &report.league_key(), &report.name);
        let mut history: ValuationHistory = get_json(self.store.as_ref(), &key)
            .await?
            .unwrap_or_default();
        history.set_capacity(self.refresh.max_history);
        Ok(history)
    }

    /// Latest report value in the report's display currency.
    pub async fn holdings(&self, report: &ReportConfig) -> EngineResult<Holdings> {
        let history = self.history(report).await?;
        let rates = self.known_rates(&report.league_key()).await?;
        Ok(holdings(
            &history,
            &report.display_currency,
            rates.as_ref(),
            self.display,
        ))
    }
}
