pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod league;
pub mod rates;
pub mod report;
pub mod staleness;
pub mod stash;
pub mod storage;
pub mod valuation;
