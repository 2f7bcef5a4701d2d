mod feed;
mod models;
mod normalizer;
#[cfg(feature = "http")]
pub mod providers;
mod source;
mod table;

pub use feed::{CurrencyDetail, FeedLine, FeedPayload, FeedSample, RELIC_ITEM_CLASS};
pub use models::{compose_full_name, FeedShape, RateCategory, RateEntry};
pub use normalizer::{chaos_orb_entry, normalize, normalize_with_warnings, CHAOS_ORB, EXALTED_ORB};
pub use source::RateSource;
pub use table::{LeagueRates, RateTable};
