//! Wire shapes of the price feed.
//!
//! Currency-style overviews and item-style overviews name the same things
//! differently, so every field is optional and the normalizer reconciles them.

use serde::{Deserialize, Serialize};

/// `itemClass` value the feed uses for relic uniques.
pub const RELIC_ITEM_CLASS: u32 = 9;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPayload {
    #[serde(default)]
    pub lines: Option<Vec<FeedLine>>,
    #[serde(default)]
    pub currency_details: Option<Vec<CurrencyDetail>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedLine {
    // Currency-style fields
    pub currency_type_name: Option<String>,
    pub chaos_equivalent: Option<f64>,
    pub receive: Option<FeedSample>,

    // Item-style fields
    pub name: Option<String>,
    pub base_type: Option<String>,
    pub icon: Option<String>,
    pub poe_trade_id: Option<String>,
    pub chaos_value: Option<f64>,
    pub exalted_value: Option<f64>,
    pub stack_size: Option<u32>,
    pub links: Option<u32>,
    pub variant: Option<String>,
    pub gem_level: Option<u32>,
    pub gem_quality: Option<u32>,
    pub corrupted: Option<bool>,
    pub quality: Option<u32>,
    pub level: Option<u32>,
    pub map_tier: Option<u32>,
    pub item_class: Option<u32>,
    pub count: Option<u32>,
}

/// One side of a currency trade summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSample {
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyDetail {
    pub name: String,
    pub icon: Option<String>,
    pub poe_trade_id: Option<String>,
}
