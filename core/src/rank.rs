use std::collections::BTreeMap;

use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;

use crate::columns::Column;
use crate::node::Node;

/// Order nodes by fuzzy-match quality against `query`.
///
/// Nodes are grouped by a lower-cased text key (one column's value when a
/// scope is given, otherwise the whole-row blob built by [`group_key`]); the
/// distinct keys are scored with a fuzzy subsequence match and expanded back
/// into nodes in rank order. Multiple nodes sharing one key is a valid
/// grouping, not an error: they are emitted together, keeping their relative
/// input order.
///
/// Ties on score keep the keys' lexicographic pre-order, so the result is
/// deterministic across runs even though the grouping map iteration order
/// would otherwise not be.
pub fn rank(nodes: &[Node], query: &str, scope: Option<&Column>) -> Vec<Node> {
    if query.is_empty() {
        return nodes.to_vec();
    }

    // BTreeMap gives the lexicographically sorted key list required for the
    // deterministic tie-break.
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        groups.entry(group_key(node, scope)).or_default().push(idx);
    }

    let query = query.to_lowercase();
    let mut matcher = Matcher::new(Config::DEFAULT);
    let mut query_buf = Vec::new();
    let query_utf32 = Utf32Str::new(&query, &mut query_buf);

    let mut scored: Vec<(u16, &str)> = Vec::new();
    for key in groups.keys() {
        let mut key_buf = Vec::new();
        let key_utf32 = Utf32Str::new(key, &mut key_buf);
        if let Some(score) = matcher.fuzzy_match(key_utf32, query_utf32) {
            scored.push((score, key.as_str()));
        }
    }
    // Stable sort: equal scores preserve the pre-sorted key order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut ranked = Vec::new();
    for (_, key) in scored {
        if let Some(group) = groups.get(key) {
            ranked.extend(group.iter().map(|&idx| nodes[idx].clone()));
        }
    }
    ranked
}

/// The grouping key for one node: the scoped column's value, or the
/// space-joined Hostname, IP, OS and label values. Label values are taken in
/// lexicographic key order so the blob is stable regardless of how the label
/// map was populated.
fn group_key(node: &Node, scope: Option<&Column>) -> String {
    let text = match scope {
        Some(column) => column.value(node).to_string(),
        None => {
            let mut text = format!("{} {} {}", node.hostname, node.ip, node.os);
            for value in node.labels.values() {
                text.push(' ');
                text.push_str(value);
            }
            text
        }
    };
    text.to_lowercase()
}
