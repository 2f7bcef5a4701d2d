//! Store key layout.

use crate::league::LeagueKey;

pub fn rates_key(account: &str, league: &LeagueKey) -> String {
    format!("{account}-{league}-rates")
}

pub fn history_key(account: &str, league: &LeagueKey, report: &str) -> String {
    format!("{account}-{league}-{report}-history")
}
