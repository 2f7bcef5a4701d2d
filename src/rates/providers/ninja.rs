//! poe.ninja price feed.
//!
//! Currency and fragment prices come from `currencyoverview`, everything else
//! from `itemoverview`. Both endpoints take `league`, `type` and an optional
//! `date` query parameter.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::FetchResponse;
use crate::league::LeagueKey;
use crate::rates::{FeedPayload, FeedShape, RateCategory, RateSource};

const NINJA_BASE_URL: &str = "https://poe.ninja";
const DEFAULT_USER_AGENT: &str = concat!("stashworth/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct NinjaRateSource {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl NinjaRateSource {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: NINJA_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Point the source at a different host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn overview_path(category: RateCategory) -> &'static str {
        match category.shape() {
            FeedShape::Currency => "currencyoverview",
            FeedShape::Item => "itemoverview",
        }
    }
}

impl Default for NinjaRateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RateSource for NinjaRateSource {
    async fn fetch_rates(
        &self,
        category: RateCategory,
        league: &LeagueKey,
        date: NaiveDate,
    ) -> Result<FetchResponse<FeedPayload>> {
        let url = format!(
            "{}/api/data/{}",
            self.base_url,
            Self::overview_path(category)
        );
        let date = date.format("%Y-%m-%d").to_string();

        debug!(%league, %category, "fetching price feed");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("league", league.as_str()),
                ("type", category.feed_type()),
                ("date", date.as_str()),
            ])
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .with_context(|| format!("Failed to request {category} prices for {league}"))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Ok(FetchResponse::status(status));
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {category} price body"))?;
        match serde_json::from_str::<FeedPayload>(&body) {
            Ok(payload) => Ok(FetchResponse::ok(payload)),
            Err(err) => {
                warn!(%league, %category, error = %err, "undecodable price feed payload");
                Ok(FetchResponse::status(200))
            }
        }
    }

    fn name(&self) -> &str {
        "poe.ninja"
    }
}
