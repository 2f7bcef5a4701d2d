//! League names as join keys.
//!
//! The account API, the price feed and saved reports all spell the same league
//! differently ("SSF Bestiary HC", "Hardcore Bestiary", ...). Every lookup goes
//! through [`LeagueKey`] so the spellings collapse to one key.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const SOFTCORE_EVENT_CODE: &str = "001";
const HARDCORE_EVENT_CODE: &str = "002";

fn event_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|\D)(\d{3})(\)?)$").expect("valid event suffix regex"))
}

/// Canonical league name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueKey(String);

impl LeagueKey {
    pub fn new(raw: &str) -> Self {
        Self(normalize_league(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_hardcore(&self) -> bool {
        self.0 == "Hardcore" || self.0.starts_with("Hardcore ")
    }
}

impl fmt::Display for LeagueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeagueKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Normalize a league name.
///
/// - drops the `SSF ` prefix (solo leagues share the trade league's prices)
/// - folds `HC ` / ` HC` / `Hardcore ` into a single `Hardcore ` prefix
/// - rewrites a trailing 3-digit event code to `001` (softcore) or `002` (hardcore)
///
/// Idempotent: `normalize_league(&normalize_league(x)) == normalize_league(x)`.
pub fn normalize_league(name: &str) -> String {
    let mut rest = name.trim();
    let mut hardcore = false;

    loop {
        if let Some(r) = rest.strip_prefix("SSF ") {
            rest = r.trim_start();
        } else if let Some(r) = rest.strip_prefix("Hardcore ") {
            hardcore = true;
            rest = r.trim_start();
        } else if let Some(r) = rest.strip_prefix("HC ") {
            hardcore = true;
            rest = r.trim_start();
        } else {
            break;
        }
    }

    while let Some(r) = rest.strip_suffix(" HC") {
        hardcore = true;
        rest = r.trim_end();
    }
    if rest == "HC" || rest == "Hardcore" {
        hardcore = true;
        rest = "";
    }

    let mut base = rest.to_string();
    while let Some(idx) = base.find(" HC ") {
        hardcore = true;
        base.replace_range(idx..idx + 3, "");
    }

    let code = if hardcore {
        HARDCORE_EVENT_CODE
    } else {
        SOFTCORE_EVENT_CODE
    };
    let base = event_suffix()
        .replace(&base, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], code, &caps[3])
        })
        .into_owned();

    match (hardcore, base.is_empty()) {
        (true, true) => "Hardcore".to_string(),
        (true, false) => format!("Hardcore {base}"),
        (false, _) => base,
    }
}
