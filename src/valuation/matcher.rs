//! Decides which rate entry, if any, prices an inventory item.
//!
//! Candidates share the item's lookup name. Each candidate is run through an
//! ordered list of rules; the first rule that accepts or rejects decides, and
//! a candidate no rule objects to is accepted. The first accepted candidate in
//! table order wins. There is no best-fit selection across candidates.

use crate::rates::{LeagueRates, RateEntry};
use crate::stash::InventoryItem;

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    /// The rule has no opinion; ask the next one.
    Continue,
}

pub type MatchRule = fn(&InventoryItem, &RateEntry) -> Verdict;

/// Rules in evaluation order.
pub const RULES: [(&str, MatchRule); 8] = [
    ("confidence", confidence),
    ("relic", relic),
    ("gem_tolerance", gem_tolerance),
    ("quality_and_level", quality_and_level),
    ("quality", quality_only),
    ("level", level_only),
    ("variant", variant),
    ("links", links),
];

/// Support gems whose level bands are priced separately.
const LEVEL_SENSITIVE_SUPPORTS: [&str; 3] =
    ["Enhance Support", "Empower Support", "Enlighten Support"];

pub fn accepts(item: &InventoryItem, candidate: &RateEntry) -> bool {
    for (_, rule) in RULES {
        match rule(item, candidate) {
            Verdict::Accept => return true,
            Verdict::Reject => return false,
            Verdict::Continue => {}
        }
    }
    true
}

/// First candidate the item is accepted by, in the order given.
pub fn match_item<'a, I>(item: &InventoryItem, candidates: I) -> Option<&'a RateEntry>
where
    I: IntoIterator<Item = &'a RateEntry>,
{
    candidates
        .into_iter()
        .find(|candidate| accepts(item, candidate))
}

/// Look the item up by name in a league's rates and match it.
pub fn match_in<'a>(item: &InventoryItem, rates: &'a LeagueRates) -> Option<&'a RateEntry> {
    match_item(item, rates.find_candidates(item.lookup_name()))
}

/// Quotes computed from no listings are noise.
pub fn confidence(_item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    match candidate.sample_count {
        Some(count) if count < 1 => Verdict::Reject,
        _ => Verdict::Continue,
    }
}

pub fn relic(item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    if candidate.is_relic != item.is_relic() {
        Verdict::Reject
    } else {
        Verdict::Continue
    }
}

/// Gem quotes cover a band of nearby levels and qualities; the band narrows as
/// level and quality rise. Decides the match for any gem quote.
pub fn gem_tolerance(item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    if !candidate.is_gem_quote() {
        return Verdict::Continue;
    }

    let candidate_level = candidate.gem_level.unwrap_or(0);
    let candidate_quality = candidate.gem_quality.unwrap_or(0);

    let level_tolerance = if is_level_sensitive(candidate) {
        0
    } else {
        tolerance(5.0, item.level().max(candidate_level), 0.25)
    };
    let quality_tolerance = tolerance(4.0, item.quality().max(candidate_quality), 0.2);

    if candidate_level.abs_diff(item.level()) <= level_tolerance
        && candidate_quality.abs_diff(item.quality()) <= quality_tolerance
    {
        Verdict::Accept
    } else {
        Verdict::Reject
    }
}

pub fn quality_and_level(item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    match (candidate.quality, candidate.level) {
        (Some(quality), Some(level)) if quality != item.quality() || level != item.level() => {
            Verdict::Reject
        }
        _ => Verdict::Continue,
    }
}

pub fn quality_only(item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    match (candidate.quality, candidate.level) {
        (Some(quality), None) if quality != item.quality() => Verdict::Reject,
        _ => Verdict::Continue,
    }
}

pub fn level_only(item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    match (candidate.quality, candidate.level) {
        (None, Some(level)) if level != item.level() => Verdict::Reject,
        _ => Verdict::Continue,
    }
}

pub fn variant(item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    match (candidate.variant.as_deref(), item.variant()) {
        (Some(expected), Some(actual)) if expected != actual => Verdict::Reject,
        _ => Verdict::Continue,
    }
}

pub fn links(item: &InventoryItem, candidate: &RateEntry) -> Verdict {
    match candidate.links {
        Some(links) if links != item.links() => Verdict::Reject,
        _ => Verdict::Continue,
    }
}

fn is_level_sensitive(candidate: &RateEntry) -> bool {
    LEVEL_SENSITIVE_SUPPORTS
        .iter()
        .any(|name| candidate.name.contains(name))
}

/// `max(0, ceil(base - value * factor))`
fn tolerance(base: f64, value: u32, factor: f64) -> u32 {
    (base - f64::from(value) * factor).ceil().max(0.0) as u32
}
