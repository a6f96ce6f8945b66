use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use hopsh_broker::Broker;
use hopsh_core::FixedColumn;
use hopsh_core::InventorySource;
use hopsh_core::InventoryStore;
use hopsh_core::Mode;
use hopsh_core::Node;
use hopsh_core::NodeCache;
use hopsh_core::Session;
use hopsh_core::SessionEvent;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::app_event::AppEvent;
use crate::terminal::Tui;
use crate::view;

/// How the interactive loop ended.
#[derive(Debug)]
pub(crate) enum AppOutcome {
    Quit,
    Connect(Node),
}

/// Rows consumed by chrome around the table: borders, header, status,
/// search and help lines.
const TABLE_MARGIN: u16 = 6;

const SPINNER_INTERVAL_MS: u64 = 250;

pub(crate) struct App {
    pub(crate) session: Session,
    pub(crate) cluster: String,
    pub(crate) refreshing: bool,
    pub(crate) spinner_frame: usize,
    source: Arc<dyn InventorySource>,
    cache: Arc<dyn NodeCache>,
    events_tx: UnboundedSender<AppEvent>,
}

pub(crate) async fn run_app(
    terminal: &mut Tui,
    broker: &Broker,
    preloaded: Option<Vec<Node>>,
) -> Result<AppOutcome> {
    let (events_tx, mut events_rx) = unbounded_channel();
    let mut app = App {
        session: Session::new(),
        cluster: broker.source.cluster().to_string(),
        refreshing: false,
        spinner_frame: 0,
        source: broker.source.clone(),
        cache: broker.cache.clone(),
        events_tx,
    };

    let size = terminal.size()?;
    app.session
        .apply(SessionEvent::ViewResized(table_height(size.height)));

    match preloaded {
        Some(nodes) => app.session.apply(SessionEvent::InventoryLoaded(nodes)),
        None => app.spawn_fetch(false),
    }

    let mut input = EventStream::new();
    let mut spinner =
        tokio::time::interval(std::time::Duration::from_millis(SPINNER_INTERVAL_MS));

    loop {
        terminal.draw(|frame| view::draw(frame, &app))?;

        tokio::select! {
            Some(event) = input.next() => {
                match event? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        if let Some(outcome) = app.handle_key(key) {
                            return Ok(outcome);
                        }
                    }
                    Event::Resize(_, rows) => {
                        app.session.apply(SessionEvent::ViewResized(table_height(rows)));
                    }
                    _ => {}
                }
            }
            Some(event) = events_rx.recv() => app.handle_app_event(event)?,
            _ = spinner.tick() => {
                app.spinner_frame = app.spinner_frame.wrapping_add(1);
            }
        }
    }
}

fn table_height(terminal_rows: u16) -> usize {
    usize::from(terminal_rows.saturating_sub(TABLE_MARGIN)).max(1)
}

impl App {
    fn spawn_fetch(&mut self, refresh: bool) {
        self.refreshing = refresh;
        let source = self.source.clone();
        let cache = self.cache.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let mut store = InventoryStore::new(source, cache);
            let result = store.load(refresh).await;
            let _ = tx.send(AppEvent::InventoryLoaded { refresh, result });
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::InventoryLoaded { result: Ok(nodes), .. } => {
                self.refreshing = false;
                self.session.apply(SessionEvent::InventoryLoaded(nodes));
                Ok(())
            }
            AppEvent::InventoryLoaded { refresh, result: Err(err) } => {
                self.refreshing = false;
                if self.session.is_loading() && !refresh {
                    // Without any data the session cannot proceed.
                    return Err(err.into());
                }
                warn!(error = %err, "inventory refresh failed; keeping previous data");
                Ok(())
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<AppOutcome> {
        match map_key(self.session.mode(), self.session.query(), key)? {
            KeyAction::Session(event) => {
                self.session.apply(event);
                None
            }
            KeyAction::Confirm => self.session.selected().cloned().map(AppOutcome::Connect),
            KeyAction::Quit => Some(AppOutcome::Quit),
            KeyAction::Refresh => {
                self.spawn_fetch(true);
                None
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Session(SessionEvent),
    Confirm,
    Quit,
    Refresh,
}

/// Translate a key press into an action for the current interaction mode.
/// Pure so the bindings are testable without a terminal.
pub(crate) fn map_key(mode: Mode, query: &str, key: KeyEvent) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }

    // Bindings shared by every mode.
    match key.code {
        KeyCode::Esc => return Some(KeyAction::Session(SessionEvent::Cancel)),
        KeyCode::Enter => return Some(KeyAction::Confirm),
        KeyCode::Up => return Some(KeyAction::Session(SessionEvent::CursorUp)),
        KeyCode::Down => return Some(KeyAction::Session(SessionEvent::CursorDown)),
        _ => {}
    }

    if mode == Mode::Searching {
        return match key.code {
            KeyCode::Backspace => {
                let mut edited = query.to_string();
                edited.pop();
                Some(KeyAction::Session(SessionEvent::QueryEdited(edited)))
            }
            KeyCode::Char(ch) if !ctrl => {
                let mut edited = query.to_string();
                edited.push(ch);
                Some(KeyAction::Session(SessionEvent::QueryEdited(edited)))
            }
            _ => None,
        };
    }

    if ctrl {
        return match key.code {
            KeyCode::Char('r') => Some(KeyAction::Refresh),
            KeyCode::Char('b') => Some(KeyAction::Session(SessionEvent::PageUp)),
            KeyCode::Char('f') => Some(KeyAction::Session(SessionEvent::PageDown)),
            _ => None,
        };
    }

    if mode == Mode::ColumnSelecting
        && let KeyCode::Char(ch) = key.code
        && let Some(digit) = ch.to_digit(10)
        && digit > 0
    {
        return Some(KeyAction::Session(SessionEvent::PickColumn(digit as usize)));
    }

    match key.code {
        KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Char('/') => Some(KeyAction::Session(SessionEvent::StartSearch)),
        KeyCode::Char('C') => Some(KeyAction::Session(SessionEvent::StartColumnSelect)),
        KeyCode::Char('k') => Some(KeyAction::Session(SessionEvent::CursorUp)),
        KeyCode::Char('j') => Some(KeyAction::Session(SessionEvent::CursorDown)),
        KeyCode::Char('D') => Some(KeyAction::Session(SessionEvent::ToggleFilter(
            FixedColumn::Env,
            "dev".to_string(),
        ))),
        KeyCode::Char('S') => Some(KeyAction::Session(SessionEvent::ToggleFilter(
            FixedColumn::Env,
            "stg".to_string(),
        ))),
        KeyCode::Char('P') => Some(KeyAction::Session(SessionEvent::ToggleFilter(
            FixedColumn::Env,
            "ppd".to_string(),
        ))),
        KeyCode::Char('c') => Some(KeyAction::Session(SessionEvent::ToggleFilter(
            FixedColumn::Type,
            "compute".to_string(),
        ))),
        KeyCode::Char('p') => Some(KeyAction::Session(SessionEvent::ToggleFilter(
            FixedColumn::Type,
            "platform".to_string(),
        ))),
        _ => None,
    }
}
