use std::fmt;

use serde::{Deserialize, Serialize};

/// Price-feed categories refreshed independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    Currency,
    Essence,
    Fragment,
    Card,
    Map,
    UniqueMap,
    Fossil,
    Resonator,
    Prophecy,
    Incubator,
    Scarab,
    Oil,
    Gem,
}

/// Which overview endpoint shape a category is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedShape {
    /// `currencyTypeName` lines plus a `currencyDetails` side table.
    Currency,
    /// Self-describing item lines.
    Item,
}

impl RateCategory {
    pub const ALL: [RateCategory; 13] = [
        RateCategory::Currency,
        RateCategory::Essence,
        RateCategory::Fragment,
        RateCategory::Card,
        RateCategory::Map,
        RateCategory::UniqueMap,
        RateCategory::Fossil,
        RateCategory::Resonator,
        RateCategory::Prophecy,
        RateCategory::Incubator,
        RateCategory::Scarab,
        RateCategory::Oil,
        RateCategory::Gem,
    ];

    pub fn shape(self) -> FeedShape {
        match self {
            RateCategory::Currency | RateCategory::Fragment => FeedShape::Currency,
            _ => FeedShape::Item,
        }
    }

    /// The `type` query value the price feed uses for this category.
    pub fn feed_type(self) -> &'static str {
        match self {
            RateCategory::Currency => "Currency",
            RateCategory::Essence => "Essence",
            RateCategory::Fragment => "Fragment",
            RateCategory::Card => "DivinationCard",
            RateCategory::Map => "Map",
            RateCategory::UniqueMap => "UniqueMap",
            RateCategory::Fossil => "Fossil",
            RateCategory::Resonator => "Resonator",
            RateCategory::Prophecy => "Prophecy",
            RateCategory::Incubator => "Incubator",
            RateCategory::Scarab => "Scarab",
            RateCategory::Oil => "Oil",
            RateCategory::Gem => "SkillGem",
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.feed_type())
    }
}

/// One normalized price quotation, in chaos.
///
/// Built once by the normalizer and never mutated; a refresh replaces the
/// whole category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub category: RateCategory,
    pub name: String,
    pub lowercase_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    pub full_name: String,
    pub full_name_lowercase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub chaos_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exalted_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_size_hint: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gem_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gem_quality: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrupted: Option<bool>,
    /// Item quality for non-gem quotes that are priced per quality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    /// Item level for non-gem quotes that are priced per level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_tier: Option<u32>,
    #[serde(default)]
    pub is_relic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
    /// Number of listings the quote was computed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u32>,
}

impl RateEntry {
    /// A minimal entry with derived names filled in. Used by the normalizer and by tests.
    pub fn new(category: RateCategory, name: impl Into<String>, chaos_value: f64) -> Self {
        let name = name.into();
        let lowercase_name = name.to_lowercase();
        Self {
            category,
            full_name: name.clone(),
            full_name_lowercase: lowercase_name.clone(),
            name,
            lowercase_name,
            base_type: None,
            icon: None,
            chaos_value,
            exalted_value: None,
            stack_size_hint: None,
            links: None,
            variant: None,
            gem_level: None,
            gem_quality: None,
            corrupted: None,
            quality: None,
            level: None,
            map_tier: None,
            is_relic: false,
            trade_id: None,
            sample_count: None,
        }
    }

    /// Set the base type and recompute the full name.
    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        let base_type = base_type.into();
        self.full_name = compose_full_name(&self.name, Some(&base_type));
        self.full_name_lowercase = self.full_name.to_lowercase();
        self.base_type = Some(base_type);
        self
    }

    pub fn with_gem(mut self, level: u32, quality: u32) -> Self {
        self.gem_level = Some(level);
        self.gem_quality = Some(quality);
        self
    }

    pub fn with_links(mut self, links: u32) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = Some(count);
        self
    }

    pub fn relic(mut self) -> Self {
        self.is_relic = true;
        self
    }

    pub fn is_gem_quote(&self) -> bool {
        self.gem_level.is_some() || self.gem_quality.is_some()
    }
}

/// `name`, or `"<name> <base_type>"` when the base type isn't already part of the name.
pub fn compose_full_name(name: &str, base_type: Option<&str>) -> String {
    match base_type {
        Some(base) if !base.is_empty() && !name.contains(base) => format!("{name} {base}"),
        _ => name.to_string(),
    }
}
