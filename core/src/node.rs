use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// One remote host entry in the inventory.
///
/// Nodes are created in bulk when the inventory is (re)populated and are
/// immutable for the duration of a browsing session; a refresh replaces the
/// whole set atomically. Labels are arbitrary case-sensitive key/value pairs;
/// a `BTreeMap` keeps their iteration order deterministic, which the fuzzy
/// ranking relies on when it concatenates label values into a search key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    pub hostname: String,
    pub ip: String,
    pub os: String,
    pub region: String,
    pub env: String,
    pub node_type: String,
    pub labels: BTreeMap<String, String>,
}

impl Node {
    pub fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or_default()
    }
}
