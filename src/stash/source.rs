use anyhow::Result;

use super::tab::{TabItems, TabList};
use crate::error::FetchResponse;
use crate::league::LeagueKey;

/// Read access to an account's stash.
#[async_trait::async_trait]
pub trait StashSource: Send + Sync {
    async fn fetch_tab_list(&self, league: &LeagueKey) -> Result<FetchResponse<TabList>>;

    async fn fetch_tab_items(
        &self,
        league: &LeagueKey,
        tab_index: u32,
    ) -> Result<FetchResponse<TabItems>>;

    fn name(&self) -> &str;
}
