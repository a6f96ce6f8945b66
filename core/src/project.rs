use crate::columns::Column;
use crate::filter::FilterState;
use crate::node::Node;
use crate::rank;

/// Derive the visible sequence from the full inventory: structured filters
/// first, then fuzzy ranking. With an empty query the filtered set is given
/// the default stable (Env, Type, OS, Hostname) ordering; with a query the
/// ranking order is authoritative and is not re-sorted, so text relevance
/// wins over the alphabetical tie-break.
///
/// Pure in (nodes, filters, query, scope): re-running it on the same inputs
/// always yields the same sequence, which lets the caller re-invoke it after
/// every keystroke without drift.
pub fn project(
    nodes: &[Node],
    filters: &FilterState,
    query: &str,
    scope: Option<&Column>,
) -> Vec<Node> {
    let filtered = filters.apply(nodes);
    if query.is_empty() {
        return sort_default(filtered);
    }
    rank::rank(&filtered, query, scope)
}

/// Stable four-level sort, each comparison lexicographic and case-sensitive.
fn sort_default(mut nodes: Vec<Node>) -> Vec<Node> {
    nodes.sort_by(|a, b| {
        a.env
            .cmp(&b.env)
            .then_with(|| a.node_type.cmp(&b.node_type))
            .then_with(|| a.os.cmp(&b.os))
            .then_with(|| a.hostname.cmp(&b.hostname))
    });
    nodes
}

/// Cursor and scroll offset into the visible sequence. The engine repairs
/// both after every projection so the selection never points past the end of
/// a shrinking result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub cursor: usize,
    pub offset: usize,
}

impl Viewport {
    /// Clamp the cursor into `rows` and keep it inside a window of `height`
    /// visible lines. A cursor at or past the second-to-last row pins the
    /// scroll to the bottom, keeping the selection visible while narrower
    /// results stream in.
    pub fn repair(&mut self, rows: usize, height: usize) {
        if rows == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        if self.cursor >= rows {
            self.cursor = rows - 1;
        }
        if self.cursor + 2 >= rows {
            self.offset = rows.saturating_sub(height.max(1));
        } else if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor + 1 > self.offset + height.max(1) {
            self.offset = self.cursor + 1 - height.max(1);
        }
    }

    pub fn move_up(&mut self, lines: usize) {
        self.cursor = self.cursor.saturating_sub(lines);
    }

    pub fn move_down(&mut self, lines: usize, rows: usize) {
        self.cursor = (self.cursor + lines).min(rows.saturating_sub(1));
    }
}
