use std::collections::BTreeMap;

use crate::columns::FixedColumn;
use crate::node::Node;

/// Structured column filters: each entry requires a node's value in one
/// fixed column to start with the given prefix (case-sensitive). Entries
/// compose as logical AND; prefix tests are side-effect-free and
/// commutative, so application order never affects the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    prefixes: BTreeMap<FixedColumn, String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn get(&self, column: FixedColumn) -> Option<&str> {
        self.prefixes.get(&column).map(String::as_str)
    }

    /// Toggling the same (column, value) pair twice restores the original
    /// state; toggling a different value for a set column replaces it.
    pub fn toggle(&mut self, column: FixedColumn, value: &str) {
        if self.prefixes.get(&column).is_some_and(|v| v == value) {
            self.prefixes.remove(&column);
        } else {
            self.prefixes.insert(column, value.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.prefixes.clear();
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.prefixes
            .iter()
            .all(|(column, prefix)| column.value(node).starts_with(prefix.as_str()))
    }

    /// An empty filter state is an identity transform.
    pub fn apply(&self, nodes: &[Node]) -> Vec<Node> {
        nodes
            .iter()
            .filter(|node| self.matches(node))
            .cloned()
            .collect()
    }
}
