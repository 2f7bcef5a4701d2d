use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::item::InventoryItem;

/// A stash tab as listed by the account API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabDescriptor {
    #[serde(rename = "i")]
    pub index: u32,
    #[serde(rename = "n", default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl TabDescriptor {
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            id: None,
            kind: None,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabList {
    #[serde(default)]
    pub tabs: Vec<TabDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabItems {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

/// A fetched tab: its descriptor plus the items it held at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StashTab {
    pub tab: TabDescriptor,
    pub items: Vec<InventoryItem>,
}

impl StashTab {
    pub fn new(tab: TabDescriptor, items: Vec<InventoryItem>) -> Self {
        Self { tab, items }
    }
}

/// Which tabs a report values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TabScope {
    #[default]
    All,
    Only(BTreeSet<u32>),
}

impl TabScope {
    pub fn only(indices: impl IntoIterator<Item = u32>) -> Self {
        TabScope::Only(indices.into_iter().collect())
    }

    /// Hidden tabs are never in scope.
    pub fn includes(&self, tab: &TabDescriptor) -> bool {
        if tab.hidden {
            return false;
        }
        match self {
            TabScope::All => true,
            TabScope::Only(indices) => indices.contains(&tab.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_filters_hidden_and_unlisted_tabs() {
        let scope = TabScope::only([0, 2]);
        assert!(scope.includes(&TabDescriptor::new(0, "Currency")));
        assert!(!scope.includes(&TabDescriptor::new(1, "Dump")));
        assert!(!scope.includes(&TabDescriptor::new(2, "Remove-only").hidden()));
        assert!(TabScope::All.includes(&TabDescriptor::new(9, "Maps")));
        assert!(!TabScope::All.includes(&TabDescriptor::new(9, "Maps").hidden()));
    }

    #[test]
    fn scope_deserializes_from_list_or_null() {
        #[derive(Deserialize)]
        struct Report {
            #[serde(default)]
            tabs: TabScope,
        }
        let listed: Report = serde_json::from_str(r#"{"tabs": [3, 1]}"#).unwrap();
        assert_eq!(listed.tabs, TabScope::only([1, 3]));
        let all: Report = serde_json::from_str("{}").unwrap();
        assert_eq!(all.tabs, TabScope::All);
    }

    #[test]
    fn parses_tab_list() {
        let list: TabList = serde_json::from_str(
            r#"{"numTabs": 2, "tabs": [
                {"n": "Currency", "i": 0, "id": "abc", "type": "CurrencyStash", "hidden": false,
                 "colour": {"r": 1, "g": 2, "b": 3}},
                {"n": "Remove-only", "i": 1, "type": "NormalStash", "hidden": true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.tabs.len(), 2);
        assert_eq!(list.tabs[0].kind.as_deref(), Some("CurrencyStash"));
        assert!(list.tabs[1].hidden);
    }
}
