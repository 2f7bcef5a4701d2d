//! Legacy `character-window` stash endpoint, authenticated by the `POESESSID` cookie.

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::FetchResponse;
use crate::league::LeagueKey;
use crate::stash::{StashSource, TabItems, TabList};

const STASH_BASE_URL: &str = "https://www.pathofexile.com";
const DEFAULT_USER_AGENT: &str = concat!("stashworth/", env!("CARGO_PKG_VERSION"));

pub struct StashApiSource {
    client: Client,
    base_url: String,
    user_agent: String,
    account: String,
    session_id: SecretString,
}

impl StashApiSource {
    pub fn new(account: impl Into<String>, session_id: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: STASH_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            account: account.into(),
            session_id,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn get_stash<T: DeserializeOwned>(
        &self,
        league: &LeagueKey,
        tab_index: u32,
        include_tabs: bool,
    ) -> Result<FetchResponse<T>> {
        let url = format!("{}/character-window/get-stash-items", self.base_url);
        let tab_index = tab_index.to_string();
        let tabs = if include_tabs { "1" } else { "0" };

        debug!(%league, tab_index = %tab_index, include_tabs, "requesting stash");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("accountName", self.account.as_str()),
                ("league", league.as_str()),
                ("tabs", tabs),
                ("tabIndex", tab_index.as_str()),
            ])
            .header("User-Agent", &self.user_agent)
            .header(
                "Cookie",
                format!("POESESSID={}", self.session_id.expose_secret()),
            )
            .send()
            .await
            .with_context(|| format!("Failed to request stash tab {tab_index} in {league}"))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Ok(FetchResponse::status(status));
        }

        let body = response
            .text()
            .await
            .context("Failed to read stash response body")?;
        match serde_json::from_str::<T>(&body) {
            Ok(data) => Ok(FetchResponse::ok(data)),
            Err(err) => {
                warn!(%league, error = %err, "undecodable stash payload");
                Ok(FetchResponse::status(200))
            }
        }
    }
}

#[async_trait::async_trait]
impl StashSource for StashApiSource {
    async fn fetch_tab_list(&self, league: &LeagueKey) -> Result<FetchResponse<TabList>> {
        self.get_stash(league, 0, true).await
    }

    async fn fetch_tab_items(
        &self,
        league: &LeagueKey,
        tab_index: u32,
    ) -> Result<FetchResponse<TabItems>> {
        self.get_stash(league, tab_index, false).await
    }

    fn name(&self) -> &str {
        "stash-api"
    }
}
