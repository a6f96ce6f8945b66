use crate::columns::Column;
use crate::columns::FixedColumn;
use crate::columns::OrderedColumns;
use crate::filter::FilterState;
use crate::node::Node;
use crate::project::Viewport;
use crate::project::project;

/// Interaction mode driving which inputs reach the projection pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Browsing,
    /// A column-select command was issued; the next digit picks the search
    /// scope and moves to [`Mode::Searching`].
    ColumnSelecting,
    Searching,
}

/// One input event for the session reducer. Events are processed strictly in
/// arrival order; each one re-derives the visible sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A (re)load completed; replaces the inventory wholesale and re-derives
    /// the column set.
    InventoryLoaded(Vec<Node>),
    StartSearch,
    StartColumnSelect,
    /// 1-based display index typed while column-selecting.
    PickColumn(usize),
    /// Full query text after an edit.
    QueryEdited(String),
    ToggleFilter(FixedColumn, String),
    /// Clears query, scope and filter toggles; back to browsing.
    Cancel,
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    /// Visible table height in rows, from the rendering collaborator.
    ViewResized(usize),
}

/// The whole browsing state: inventory, derived columns, filter/search
/// state, and the derived visible sequence with its viewport.
///
/// `apply` is the single mutation point; projection is pure in the held
/// inputs, so applying the same event stream always produces the same
/// visible sequence.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inventory: Vec<Node>,
    columns: OrderedColumns,
    filters: FilterState,
    query: String,
    scope: Option<usize>,
    mode: Mode,
    visible: Vec<Node>,
    viewport: Viewport,
    view_height: usize,
    loaded: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            view_height: 1,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::InventoryLoaded(nodes) => {
                self.inventory = nodes;
                self.columns = OrderedColumns::derive(&self.inventory);
                // Column indices from a prior inventory must not survive the
                // re-derivation.
                if self.scope.is_some_and(|idx| self.columns.get(idx).is_none()) {
                    self.scope = None;
                }
                self.loaded = true;
            }
            SessionEvent::StartSearch => {
                if self.mode == Mode::Browsing {
                    self.mode = Mode::Searching;
                }
            }
            SessionEvent::StartColumnSelect => {
                if self.mode == Mode::Browsing {
                    self.mode = Mode::ColumnSelecting;
                }
            }
            SessionEvent::PickColumn(display_index) => {
                if self.mode == Mode::ColumnSelecting
                    && self.scope.is_none()
                    && self.columns.get(display_index).is_some()
                {
                    self.scope = Some(display_index);
                    self.mode = Mode::Searching;
                }
            }
            SessionEvent::QueryEdited(text) => {
                if self.mode == Mode::Searching {
                    self.query = text;
                }
            }
            SessionEvent::ToggleFilter(column, value) => {
                if self.mode != Mode::Searching {
                    self.filters.toggle(column, &value);
                }
            }
            SessionEvent::Cancel => {
                self.query.clear();
                self.scope = None;
                self.filters.clear();
                self.mode = Mode::Browsing;
            }
            SessionEvent::CursorUp => self.viewport.move_up(1),
            SessionEvent::CursorDown => self.viewport.move_down(1, self.visible.len()),
            SessionEvent::PageUp => self.viewport.move_up(self.view_height),
            SessionEvent::PageDown => {
                self.viewport.move_down(self.view_height, self.visible.len());
            }
            SessionEvent::ViewResized(height) => self.view_height = height.max(1),
        }
        self.reproject();
    }

    fn reproject(&mut self) {
        let scope = self.scope_column().cloned();
        self.visible = project(&self.inventory, &self.filters, &self.query, scope.as_ref());
        self.viewport.repair(self.visible.len(), self.view_height);
    }

    /// The node under the cursor; confirming a selection yields this.
    pub fn selected(&self) -> Option<&Node> {
        self.visible.get(self.viewport.cursor)
    }

    pub fn scope_column(&self) -> Option<&Column> {
        self.scope.and_then(|idx| self.columns.get(idx))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn columns(&self) -> &OrderedColumns {
        &self.columns
    }

    pub fn visible(&self) -> &[Node] {
        &self.visible
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn total(&self) -> usize {
        self.inventory.len()
    }

    /// True until the first inventory-loaded event arrives.
    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(hostname: &str, env: &str) -> Node {
        Node {
            hostname: hostname.to_string(),
            env: env.to_string(),
            ..Default::default()
        }
    }

    fn loaded_session() -> Session {
        let mut session = Session::new();
        session.apply(SessionEvent::ViewResized(10));
        session.apply(SessionEvent::InventoryLoaded(vec![
            node("alpha", "dev"),
            node("albert", "dev"),
            node("beta", "stg"),
        ]));
        session
    }

    fn visible_hostnames(session: &Session) -> Vec<&str> {
        session.visible().iter().map(|n| n.hostname.as_str()).collect()
    }

    #[test]
    fn starts_loading_until_inventory_arrives() {
        let mut session = Session::new();
        assert!(session.is_loading());
        assert_eq!(session.visible().len(), 0);

        session.apply(SessionEvent::InventoryLoaded(vec![node("a", "dev")]));
        assert!(!session.is_loading());
        assert_eq!(session.visible().len(), 1);
    }

    #[test]
    fn browsing_shows_the_default_sorted_inventory() {
        let session = loaded_session();
        assert_eq!(session.mode(), Mode::Browsing);
        assert_eq!(visible_hostnames(&session), vec!["albert", "alpha", "beta"]);
    }

    #[test]
    fn direct_search_transition_leaves_scope_unset() {
        let mut session = loaded_session();
        session.apply(SessionEvent::StartSearch);

        assert_eq!(session.mode(), Mode::Searching);
        assert_eq!(session.scope_column(), None);
    }

    #[test]
    fn column_select_digit_sets_scope_then_searches() {
        let mut session = loaded_session();
        session.apply(SessionEvent::StartColumnSelect);
        assert_eq!(session.mode(), Mode::ColumnSelecting);

        session.apply(SessionEvent::PickColumn(3));
        assert_eq!(session.mode(), Mode::Searching);
        assert_eq!(
            session.scope_column(),
            Some(&Column::Fixed(FixedColumn::Hostname))
        );
    }

    #[test]
    fn only_the_first_digit_picks_a_column() {
        let mut session = loaded_session();
        session.apply(SessionEvent::StartColumnSelect);
        session.apply(SessionEvent::PickColumn(3));
        session.apply(SessionEvent::PickColumn(5));

        assert_eq!(
            session.scope_column(),
            Some(&Column::Fixed(FixedColumn::Hostname))
        );
    }

    #[test]
    fn typing_narrows_the_visible_sequence() {
        let mut session = loaded_session();
        session.apply(SessionEvent::StartSearch);
        session.apply(SessionEvent::QueryEdited("al".to_string()));

        let visible = visible_hostnames(&session);
        assert_eq!(visible.len(), 2);
        assert!(!visible.contains(&"beta"));
    }

    #[test]
    fn cancel_restores_the_initial_state() {
        let mut session = loaded_session();
        session.apply(SessionEvent::ToggleFilter(FixedColumn::Env, "dev".to_string()));
        session.apply(SessionEvent::StartSearch);
        session.apply(SessionEvent::QueryEdited("al".to_string()));

        session.apply(SessionEvent::Cancel);

        assert_eq!(session.mode(), Mode::Browsing);
        assert_eq!(session.query(), "");
        assert_eq!(session.scope_column(), None);
        assert!(session.filters().is_empty());
        assert_eq!(visible_hostnames(&session), vec!["albert", "alpha", "beta"]);
    }

    #[test]
    fn filter_toggles_are_ignored_while_searching() {
        let mut session = loaded_session();
        session.apply(SessionEvent::StartSearch);
        session.apply(SessionEvent::ToggleFilter(FixedColumn::Env, "dev".to_string()));

        assert!(session.filters().is_empty());
    }

    #[test]
    fn shrinking_results_clamp_the_cursor() {
        let mut session = loaded_session();
        session.apply(SessionEvent::CursorDown);
        session.apply(SessionEvent::CursorDown);
        assert_eq!(session.viewport().cursor, 2);

        session.apply(SessionEvent::StartSearch);
        session.apply(SessionEvent::QueryEdited("beta".to_string()));
        assert_eq!(session.visible().len(), 1);
        assert_eq!(session.viewport().cursor, 0);
    }

    #[test]
    fn confirm_yields_the_node_under_the_cursor() {
        let mut session = loaded_session();
        session.apply(SessionEvent::CursorDown);

        assert_eq!(session.selected().map(|n| n.hostname.as_str()), Some("alpha"));
    }

    #[test]
    fn refresh_replaces_the_inventory_and_revalidates_scope() {
        let mut labeled = node("tagged", "dev");
        labeled.labels.insert("team".to_string(), "x".to_string());

        let mut session = Session::new();
        session.apply(SessionEvent::InventoryLoaded(vec![labeled]));
        assert_eq!(session.columns().len(), 7);

        session.apply(SessionEvent::StartColumnSelect);
        session.apply(SessionEvent::PickColumn(7));
        assert_eq!(session.scope_column(), Some(&Column::Label("team".to_string())));

        // New inventory without that label key: the stale index is dropped.
        session.apply(SessionEvent::InventoryLoaded(vec![node("plain", "dev")]));
        assert_eq!(session.columns().len(), 6);
        assert_eq!(session.scope_column(), None);
    }
}
