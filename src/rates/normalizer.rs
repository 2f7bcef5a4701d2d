//! Turns one price-feed response into [`RateEntry`] values.

use std::collections::HashMap;

use tracing::warn;

use super::feed::{CurrencyDetail, FeedLine, FeedPayload, RELIC_ITEM_CLASS};
use super::models::{compose_full_name, RateCategory, RateEntry};
use crate::error::DataWarning;

pub const CHAOS_ORB: &str = "Chaos Orb";
pub const EXALTED_ORB: &str = "Exalted Orb";

const CHAOS_ORB_ICON: &str =
    "https://web.poecdn.com/image/Art/2DItems/Currency/CurrencyRerollRare.png";
const CHAOS_ORB_TRADE_ID: &str = "chaos";
/// Display stack size the currency feed is normalized to.
const CURRENCY_STACK_HINT: u32 = 1000;

/// Normalize a feed response, logging any data-integrity warnings.
///
/// A payload without `lines` yields an empty list; deciding whether that is
/// worth a retry is up to the caller.
pub fn normalize(category: RateCategory, payload: &FeedPayload) -> Vec<RateEntry> {
    let (entries, warnings) = normalize_with_warnings(category, payload);
    for warning in warnings {
        warn!(?category, ?warning, "price feed data warning");
    }
    entries
}

/// Like [`normalize`] but returns the warnings instead of logging them.
pub fn normalize_with_warnings(
    category: RateCategory,
    payload: &FeedPayload,
) -> (Vec<RateEntry>, Vec<DataWarning>) {
    let Some(lines) = payload.lines.as_deref() else {
        return (Vec::new(), Vec::new());
    };

    let details: HashMap<&str, &CurrencyDetail> = payload
        .currency_details
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|d| (d.name.as_str(), d))
        .collect();

    let mut entries: Vec<RateEntry> = lines
        .iter()
        .map(|line| normalize_line(category, line, &details))
        .collect();

    let mut warnings = Vec::new();
    if category == RateCategory::Currency {
        let exalted = entries
            .iter()
            .find(|e| e.name == EXALTED_ORB)
            .map(|e| e.chaos_value);
        if exalted.is_none() {
            warnings.push(DataWarning::MissingReferenceRate);
        }
        entries.push(chaos_orb_entry(exalted));
    }

    (entries, warnings)
}

/// The reference unit. Always worth exactly one chaos.
///
/// `exalted_value` carries the Exalted Orb's chaos price when the feed had one.
pub fn chaos_orb_entry(exalted_value: Option<f64>) -> RateEntry {
    let mut entry = RateEntry::new(RateCategory::Currency, CHAOS_ORB, 1.0);
    entry.icon = Some(CHAOS_ORB_ICON.to_string());
    entry.trade_id = Some(CHAOS_ORB_TRADE_ID.to_string());
    entry.stack_size_hint = Some(CURRENCY_STACK_HINT);
    entry.exalted_value = exalted_value;
    entry
}

fn normalize_line(
    category: RateCategory,
    line: &FeedLine,
    details: &HashMap<&str, &CurrencyDetail>,
) -> RateEntry {
    let name = line
        .currency_type_name
        .clone()
        .or_else(|| line.name.clone())
        .unwrap_or_default();
    let detail = details.get(name.as_str()).copied();

    let full_name = compose_full_name(&name, line.base_type.as_deref());
    let icon = line
        .icon
        .clone()
        .or_else(|| detail.and_then(|d| d.icon.clone()));
    let trade_id = line
        .poe_trade_id
        .clone()
        .or_else(|| detail.and_then(|d| d.poe_trade_id.clone()));
    let chaos_value = line
        .chaos_equivalent
        .or(line.chaos_value)
        .unwrap_or(0.0)
        .max(0.0);
    let sample_count = line
        .count
        .or_else(|| line.receive.as_ref().and_then(|r| r.count));

    let mut entry = RateEntry {
        category,
        lowercase_name: name.to_lowercase(),
        full_name_lowercase: full_name.to_lowercase(),
        name,
        base_type: line.base_type.clone(),
        full_name,
        icon,
        chaos_value,
        exalted_value: line.exalted_value,
        stack_size_hint: line.stack_size,
        links: line.links,
        variant: line.variant.clone(),
        gem_level: None,
        gem_quality: None,
        corrupted: None,
        quality: line.quality,
        level: line.level,
        map_tier: None,
        is_relic: line.item_class == Some(RELIC_ITEM_CLASS),
        trade_id,
        sample_count,
    };

    match category {
        RateCategory::Currency => entry.stack_size_hint = Some(CURRENCY_STACK_HINT),
        RateCategory::Gem => {
            entry.gem_level = line.gem_level;
            entry.gem_quality = line.gem_quality;
            entry.corrupted = line.corrupted;
        }
        RateCategory::Map | RateCategory::UniqueMap => entry.map_tier = line.map_tier,
        _ => {}
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::feed::FeedSample;

    fn currency_line(name: &str, chaos: f64) -> FeedLine {
        FeedLine {
            currency_type_name: Some(name.to_string()),
            chaos_equivalent: Some(chaos),
            ..FeedLine::default()
        }
    }

    #[test]
    fn currency_feed_synthesizes_chaos_orb() {
        let payload = FeedPayload {
            lines: Some(vec![currency_line("Exalted Orb", 60.0)]),
            currency_details: None,
        };

        let (entries, warnings) = normalize_with_warnings(RateCategory::Currency, &payload);
        assert!(warnings.is_empty());
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].name, "Exalted Orb");
        assert_eq!(entries[0].chaos_value, 60.0);
        assert_eq!(entries[0].stack_size_hint, Some(1000));

        assert_eq!(entries[1].name, "Chaos Orb");
        assert_eq!(entries[1].chaos_value, 1.0);
        assert_eq!(entries[1].exalted_value, Some(60.0));
        assert_eq!(entries[1].stack_size_hint, Some(1000));
    }

    #[test]
    fn missing_exalted_orb_is_a_warning_not_a_panic() {
        let payload = FeedPayload {
            lines: Some(vec![currency_line("Orb of Alteration", 0.2)]),
            currency_details: None,
        };

        let (entries, warnings) = normalize_with_warnings(RateCategory::Currency, &payload);
        assert_eq!(warnings, vec![DataWarning::MissingReferenceRate]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "Chaos Orb");
        assert_eq!(entries[1].exalted_value, None);
    }

    #[test]
    fn missing_lines_yield_nothing() {
        let (entries, warnings) =
            normalize_with_warnings(RateCategory::Currency, &FeedPayload::default());
        assert!(entries.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn details_fill_in_only_what_the_line_lacks() {
        let mut with_icon = currency_line("Orb of Fusing", 0.5);
        with_icon.icon = Some("line-icon".to_string());
        let payload = FeedPayload {
            lines: Some(vec![with_icon, currency_line("Vaal Orb", 1.2)]),
            currency_details: Some(vec![
                CurrencyDetail {
                    name: "Orb of Fusing".into(),
                    icon: Some("detail-icon".into()),
                    poe_trade_id: Some("fuse".into()),
                },
                CurrencyDetail {
                    name: "Vaal Orb".into(),
                    icon: Some("vaal-icon".into()),
                    poe_trade_id: Some("vaal".into()),
                },
            ]),
        };

        let entries = normalize(RateCategory::Fragment, &payload);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].icon.as_deref(), Some("line-icon"));
        assert_eq!(entries[0].trade_id.as_deref(), Some("fuse"));
        assert_eq!(entries[1].icon.as_deref(), Some("vaal-icon"));
        // Only the currency category is forced to the display stack size.
        assert_eq!(entries[1].stack_size_hint, None);
    }

    #[test]
    fn chaos_equivalent_wins_over_chaos_value() {
        let line = FeedLine {
            currency_type_name: Some("Divine Orb".into()),
            name: Some("ignored".into()),
            chaos_equivalent: Some(180.0),
            chaos_value: Some(1.0),
            receive: Some(FeedSample { count: Some(40) }),
            ..FeedLine::default()
        };
        let payload = FeedPayload {
            lines: Some(vec![line]),
            currency_details: None,
        };

        let entries = normalize(RateCategory::Fragment, &payload);
        assert_eq!(entries[0].name, "Divine Orb");
        assert_eq!(entries[0].chaos_value, 180.0);
        assert_eq!(entries[0].sample_count, Some(40));
    }

    #[test]
    fn gem_and_map_fields_are_category_scoped() {
        let gem = FeedLine {
            name: Some("Empower Support".into()),
            gem_level: Some(3),
            gem_quality: Some(20),
            corrupted: Some(true),
            map_tier: Some(16),
            chaos_value: Some(300.0),
            ..FeedLine::default()
        };
        let payload = FeedPayload {
            lines: Some(vec![gem]),
            currency_details: None,
        };

        let gems = normalize(RateCategory::Gem, &payload);
        assert_eq!(gems[0].gem_level, Some(3));
        assert_eq!(gems[0].gem_quality, Some(20));
        assert_eq!(gems[0].corrupted, Some(true));
        assert_eq!(gems[0].map_tier, None);

        let maps = normalize(RateCategory::UniqueMap, &payload);
        assert_eq!(maps[0].gem_level, None);
        assert_eq!(maps[0].map_tier, Some(16));
    }

    #[test]
    fn item_lines_compose_full_name_and_relic_flag() {
        let line = FeedLine {
            name: Some("Maelström of Chaos".into()),
            base_type: Some("Atoll Map".into()),
            item_class: Some(RELIC_ITEM_CLASS),
            chaos_value: Some(4.0),
            ..FeedLine::default()
        };
        let payload = FeedPayload {
            lines: Some(vec![line]),
            currency_details: None,
        };

        let entries = normalize(RateCategory::UniqueMap, &payload);
        assert_eq!(entries[0].full_name, "Maelström of Chaos Atoll Map");
        assert_eq!(entries[0].full_name_lowercase, "maelström of chaos atoll map");
        assert!(entries[0].is_relic);
    }

    #[test]
    fn normalization_is_deterministic() {
        let payload = FeedPayload {
            lines: Some(vec![
                currency_line("Exalted Orb", 60.0),
                currency_line("Orb of Alteration", 0.2),
            ]),
            currency_details: None,
        };
        assert_eq!(
            normalize(RateCategory::Currency, &payload),
            normalize(RateCategory::Currency, &payload)
        );
    }
}
