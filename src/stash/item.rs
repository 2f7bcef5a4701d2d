//! Raw stash items and the attributes derived from them.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub const FRAME_UNIQUE: u32 = 3;
pub const FRAME_GEM: u32 = 4;
pub const FRAME_RELIC: u32 = 9;

const SUPERIOR_PREFIX: &str = "Superior ";
const QUALITY_PROPERTY: &str = "Quality";
const LEVEL_PROPERTY: &str = "Level";
/// Links of this size or smaller are reported as unlinked.
const MAX_UNTRACKED_LINKS: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperty {
    pub name: String,
    #[serde(default)]
    pub values: Vec<(String, i32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Socket {
    pub group: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

fn default_stack_size() -> u32 {
    1
}

/// An item as returned by the stash API.
///
/// The payload is never modified; derived attributes are computed on first
/// access and cached on the instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub type_line: String,
    #[serde(default, rename = "name")]
    pub raw_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub explicit_mods: Vec<String>,
    #[serde(default)]
    pub properties: Vec<ItemProperty>,
    #[serde(default)]
    pub sockets: Vec<Socket>,
    #[serde(default)]
    pub frame_type: u32,
    #[serde(default = "default_stack_size")]
    pub stack_size: u32,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(skip)]
    derived: OnceLock<Derived>,
}

#[derive(Debug, Clone)]
struct Derived {
    name: Option<String>,
    item_type: String,
    variant: Option<String>,
    full_name: String,
    lookup_name: String,
    quality: u32,
    level: u32,
    links: u32,
}

impl InventoryItem {
    pub fn new(type_line: impl Into<String>) -> Self {
        Self {
            id: None,
            type_line: type_line.into(),
            raw_name: String::new(),
            icon: None,
            explicit_mods: Vec::new(),
            properties: Vec::new(),
            sockets: Vec::new(),
            frame_type: 0,
            stack_size: 1,
            x: 0,
            y: 0,
            derived: OnceLock::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.raw_name = name.into();
        self.touched()
    }

    pub fn with_frame_type(mut self, frame_type: u32) -> Self {
        self.frame_type = frame_type;
        self.touched()
    }

    pub fn with_stack_size(mut self, stack_size: u32) -> Self {
        self.stack_size = stack_size;
        self.touched()
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(ItemProperty {
            name: name.into(),
            values: vec![(value.into(), 0)],
        });
        self.touched()
    }

    pub fn with_explicit_mod(mut self, modifier: impl Into<String>) -> Self {
        self.explicit_mods.push(modifier.into());
        self.touched()
    }

    /// Add sockets, one per entry, each in the given link group.
    pub fn with_socket_groups(mut self, groups: &[u32]) -> Self {
        self.sockets
            .extend(groups.iter().map(|&group| Socket { group, attr: None }));
        self.touched()
    }

    pub fn at(mut self, x: u32, y: u32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// A gem with the given level and quality properties.
    pub fn gem(type_line: impl Into<String>, level: u32, quality: u32) -> Self {
        let item = Self::new(type_line)
            .with_frame_type(FRAME_GEM)
            .with_property(LEVEL_PROPERTY, level.to_string());
        if quality > 0 {
            item.with_property(QUALITY_PROPERTY, format!("+{quality}%"))
        } else {
            item
        }
    }

    fn touched(mut self) -> Self {
        self.derived = OnceLock::new();
        self
    }

    fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| self.derive())
    }

    /// Flavor name with markup and the "Superior " prefix removed. `None` for non-uniques.
    pub fn name(&self) -> Option<&str> {
        self.derived().name.as_deref()
    }

    /// Base type with the "Superior " prefix removed.
    pub fn item_type(&self) -> &str {
        &self.derived().item_type
    }

    pub fn variant(&self) -> Option<&str> {
        self.derived().variant.as_deref()
    }

    /// Display name, unique per priced variant. Used as the cluster key.
    pub fn full_name(&self) -> &str {
        &self.derived().full_name
    }

    /// Lowercase name without the variant tag, the form rate entries are indexed by.
    pub fn lookup_name(&self) -> &str {
        &self.derived().lookup_name
    }

    pub fn quality(&self) -> u32 {
        self.derived().quality
    }

    pub fn level(&self) -> u32 {
        self.derived().level
    }

    pub fn links(&self) -> u32 {
        self.derived().links
    }

    pub fn is_unique(&self) -> bool {
        self.frame_type == FRAME_UNIQUE
    }

    pub fn is_gem(&self) -> bool {
        self.frame_type == FRAME_GEM
    }

    pub fn is_relic(&self) -> bool {
        self.frame_type == FRAME_RELIC
    }

    fn derive(&self) -> Derived {
        let item_type = strip_superior(last_segment(&self.type_line)).to_string();
        let name = Some(strip_superior(last_segment(&self.raw_name)))
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let variant = abyssal_variant(&self.explicit_mods);

        let base_name = match &name {
            Some(name) => format!("{name} {item_type}"),
            None => item_type.clone(),
        };
        let full_name = match &variant {
            Some(variant) => format!("{base_name} ({variant})"),
            None => base_name.clone(),
        };

        Derived {
            lookup_name: base_name.to_lowercase(),
            full_name,
            name,
            item_type,
            variant,
            quality: self.property_number(QUALITY_PROPERTY).unwrap_or(0),
            level: self.normalized_level(),
            links: link_count(&self.sockets),
        }
    }

    fn property_number(&self, property: &str) -> Option<u32> {
        self.properties
            .iter()
            .find(|p| p.name == property)
            .and_then(|p| p.values.first())
            .and_then(|(value, _)| parse_leading_number(value))
    }

    fn normalized_level(&self) -> u32 {
        let level = self.property_number(LEVEL_PROPERTY).unwrap_or(0);
        if !self.is_gem() {
            return level;
        }
        match level {
            5..=18 => 1,
            19 => 20,
            other => other,
        }
    }
}

fn strip_superior(value: &str) -> &str {
    value.strip_prefix(SUPERIOR_PREFIX).unwrap_or(value)
}

/// Names arrive with `<<set:MS>><<set:M>>` style markup; keep what follows the last `>`.
fn last_segment(value: &str) -> &str {
    value.rsplit('>').next().unwrap_or(value).trim()
}

fn parse_leading_number(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .trim_start_matches('+')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn abyssal_variant(explicit_mods: &[String]) -> Option<String> {
    explicit_mods.iter().find_map(|m| match m.as_str() {
        "Has 1 Abyssal Socket" => Some("1 Jewel".to_string()),
        "Has 2 Abyssal Sockets" => Some("2 Jewels".to_string()),
        _ => None,
    })
}

/// Size of the largest link group, or 0 when no group exceeds four sockets.
fn link_count(sockets: &[Socket]) -> u32 {
    let mut groups: BTreeMap<u32, u32> = BTreeMap::new();
    for socket in sockets {
        *groups.entry(socket.group).or_default() += 1;
    }
    let mut sizes: Vec<u32> = groups.into_values().collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    match sizes.first() {
        Some(&largest) if largest > MAX_UNTRACKED_LINKS => largest,
        _ => 0,
    }
}
