use anyhow::Result;
use chrono::NaiveDate;

use super::feed::FeedPayload;
use super::models::RateCategory;
use crate::error::FetchResponse;
use crate::league::LeagueKey;

/// Fetches one category of the price feed for a league.
///
/// Transport failures are `Err`; HTTP-level outcomes (403, 404, 429, ...)
/// come back as the response status for the engine to classify.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(
        &self,
        category: RateCategory,
        league: &LeagueKey,
        date: NaiveDate,
    ) -> Result<FetchResponse<FeedPayload>>;

    fn name(&self) -> &str;
}
