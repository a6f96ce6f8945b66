use std::collections::BTreeSet;

use crate::node::Node;

/// Label keys that are promoted into fixed columns and therefore removed
/// from the per-node label maps when the inventory is built.
pub const PROMOTED_LABEL_KEYS: [&str; 3] = ["region", "env", "category3"];

/// Uniform width applied to every dynamically derived label column.
const LABEL_COLUMN_WIDTH: u16 = 15;

/// The six always-present display dimensions, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixedColumn {
    Region,
    Env,
    Hostname,
    Ip,
    Type,
    Os,
}

impl FixedColumn {
    pub const ALL: [FixedColumn; 6] = [
        FixedColumn::Region,
        FixedColumn::Env,
        FixedColumn::Hostname,
        FixedColumn::Ip,
        FixedColumn::Type,
        FixedColumn::Os,
    ];

    pub fn title(self) -> &'static str {
        match self {
            FixedColumn::Region => "Region",
            FixedColumn::Env => "Env",
            FixedColumn::Hostname => "Hostname",
            FixedColumn::Ip => "IP",
            FixedColumn::Type => "Type",
            FixedColumn::Os => "OS",
        }
    }

    /// Widths are a fixed policy table, independent of the data.
    pub fn width(self) -> u16 {
        match self {
            FixedColumn::Region => 7,
            FixedColumn::Env => 5,
            FixedColumn::Hostname => 30,
            FixedColumn::Ip => 16,
            FixedColumn::Type => 15,
            FixedColumn::Os => 30,
        }
    }

    pub fn value(self, node: &Node) -> &str {
        match self {
            FixedColumn::Region => &node.region,
            FixedColumn::Env => &node.env,
            FixedColumn::Hostname => &node.hostname,
            FixedColumn::Ip => &node.ip,
            FixedColumn::Type => &node.node_type,
            FixedColumn::Os => &node.os,
        }
    }
}

/// A display dimension: either one of the six fixed columns or a column
/// derived from a label key present on at least one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Fixed(FixedColumn),
    Label(String),
}

impl Column {
    pub fn title(&self) -> &str {
        match self {
            Column::Fixed(fixed) => fixed.title(),
            Column::Label(key) => key,
        }
    }

    pub fn width(&self) -> u16 {
        match self {
            Column::Fixed(fixed) => fixed.width(),
            Column::Label(_) => LABEL_COLUMN_WIDTH,
        }
    }

    /// A label column absent on a node yields the empty string, never an
    /// error.
    pub fn value<'a>(&self, node: &'a Node) -> &'a str {
        match self {
            Column::Fixed(fixed) => fixed.value(node),
            Column::Label(key) => node.label(key),
        }
    }
}

/// The ordered column set derived from one inventory snapshot: the fixed six
/// first, then one column per distinct remaining label key, ascending by key.
/// Display indices are 1-based and stay stable until the inventory changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedColumns {
    columns: Vec<Column>,
}

impl OrderedColumns {
    /// Must be re-run on every inventory change; label keys can vary
    /// node-to-node even when the node count does not.
    pub fn derive(nodes: &[Node]) -> Self {
        let label_keys: BTreeSet<&str> = nodes
            .iter()
            .flat_map(|node| node.labels.keys())
            .map(String::as_str)
            .filter(|key| !PROMOTED_LABEL_KEYS.contains(key))
            .collect();

        let mut columns: Vec<Column> = FixedColumn::ALL.into_iter().map(Column::Fixed).collect();
        columns.extend(label_keys.into_iter().map(|key| Column::Label(key.to_string())));
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by its 1-based display index.
    pub fn get(&self, display_index: usize) -> Option<&Column> {
        display_index
            .checked_sub(1)
            .and_then(|idx| self.columns.get(idx))
    }

    /// One row of column-indexed string values for a node.
    pub fn row_values(&self, node: &Node) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.value(node).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labeled(hostname: &str, labels: &[(&str, &str)]) -> Node {
        Node {
            hostname: hostname.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn derives_label_columns_sorted_after_fixed_six() {
        let nodes = vec![
            labeled("a", &[("team", "x")]),
            labeled("b", &[("team", "y"), ("az", "z")]),
        ];
        let columns = OrderedColumns::derive(&nodes);

        assert_eq!(columns.len(), 8);
        assert_eq!(columns.columns()[6], Column::Label("az".to_string()));
        assert_eq!(columns.columns()[7], Column::Label("team".to_string()));
    }

    #[test]
    fn promoted_keys_never_become_label_columns() {
        let nodes = vec![labeled("a", &[("region", "kr"), ("env", "dev"), ("tier", "1")])];
        let columns = OrderedColumns::derive(&nodes);

        assert_eq!(columns.len(), 7);
        assert_eq!(columns.columns()[6], Column::Label("tier".to_string()));
    }

    #[test]
    fn display_indices_are_one_based() {
        let columns = OrderedColumns::derive(&[labeled("a", &[("team", "x")])]);

        assert_eq!(columns.get(0), None);
        assert_eq!(columns.get(1), Some(&Column::Fixed(FixedColumn::Region)));
        assert_eq!(columns.get(7), Some(&Column::Label("team".to_string())));
        assert_eq!(columns.get(8), None);
    }

    #[test]
    fn row_values_follow_column_order() {
        let mut node = labeled("web-1", &[("team", "x")]);
        node.env = "dev".to_string();
        node.ip = "10.0.0.1".to_string();
        let columns = OrderedColumns::derive(std::slice::from_ref(&node));

        assert_eq!(
            columns.row_values(&node),
            vec!["", "dev", "web-1", "10.0.0.1", "", "", "x"]
        );
    }
}
