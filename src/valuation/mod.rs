mod aggregator;
mod history;
mod holdings;
pub mod matcher;
mod models;

pub use aggregator::{aggregate, AggregateOptions, ClusterSet};
pub use history::{change_between, record, Direction, ValuationHistory, ValueChange, MAX_HISTORY};
pub use holdings::{currency_abbreviation, holdings, Holdings, DEFAULT_ABBREVIATION};
pub use matcher::{match_in, match_item};
pub use models::{ClusterChild, MatchedClusterEntry, ValuationSnapshot};
