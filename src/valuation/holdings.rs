//! Net worth of a report expressed in a chosen currency.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::history::ValuationHistory;
use crate::format::{format_value, ValueFormat};
use crate::rates::{LeagueRates, RateCategory, CHAOS_ORB};

/// Abbreviation used for chaos and for any currency not listed below.
pub const DEFAULT_ABBREVIATION: &str = "C";

const ABBREVIATIONS: [(&str, &str); 15] = [
    ("Chaos Orb", "C"),
    ("Exalted Orb", "Ex"),
    ("Divine Orb", "Div"),
    ("Mirror of Kalandra", "Mirror"),
    ("Orb of Alteration", "Alt"),
    ("Orb of Fusing", "Fuse"),
    ("Orb of Alchemy", "Alch"),
    ("Jeweller's Orb", "Jew"),
    ("Chromatic Orb", "Chrom"),
    ("Vaal Orb", "Vaal"),
    ("Regal Orb", "Regal"),
    ("Gemcutter's Prism", "GCP"),
    ("Orb of Scouring", "Scour"),
    ("Orb of Regret", "Regret"),
    ("Cartographer's Chisel", "Chisel"),
];

pub fn currency_abbreviation(currency_name: &str) -> &'static str {
    ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == currency_name)
        .map(|(_, abbreviation)| *abbreviation)
        .unwrap_or(DEFAULT_ABBREVIATION)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub value: f64,
    pub formatted_value: String,
    pub currency_abbreviation: String,
}

/// The latest snapshot's total, converted into `currency_name`.
///
/// The conversion rate comes from the league's currency quotes. A currency
/// without a usable quote falls back to chaos.
pub fn holdings(
    history: &ValuationHistory,
    currency_name: &str,
    rates: Option<&LeagueRates>,
    format: ValueFormat,
) -> Holdings {
    let total = history.latest().map(|s| s.total).unwrap_or(0.0);

    let (value, abbreviation) = match chaos_per_unit(currency_name, rates) {
        Some(rate) => (total / rate, currency_abbreviation(currency_name)),
        None => {
            warn!(currency = currency_name, "no usable rate for display currency, showing chaos");
            (total, DEFAULT_ABBREVIATION)
        }
    };

    Holdings {
        value,
        formatted_value: format_value(value, format),
        currency_abbreviation: abbreviation.to_string(),
    }
}

fn chaos_per_unit(currency_name: &str, rates: Option<&LeagueRates>) -> Option<f64> {
    if currency_name == CHAOS_ORB {
        return Some(1.0);
    }
    rates?
        .category(RateCategory::Currency)
        .iter()
        .find(|entry| entry.name == currency_name)
        .map(|entry| entry.chaos_value)
        .filter(|value| *value > 0.0)
}
