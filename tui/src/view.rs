use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Position;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::TableState;

use hopsh_core::Mode;

use crate::app::App;

const SPINNER_FRAMES: [&str; 4] = ["", ".", "..", "..."];

pub(crate) fn draw(frame: &mut Frame, app: &App) {
    let [table_area, status_area, search_area, help_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_table(frame, app, table_area);
    frame.render_widget(Paragraph::new(status_line(app)), status_area);
    draw_search(frame, app, search_area);
    frame.render_widget(
        Paragraph::new(help_line(app)).style(Style::new().fg(Color::DarkGray)),
        help_area,
    );
}

fn draw_table(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let columns = app.session.columns();
    let column_select = app.session.mode() == Mode::ColumnSelecting;

    let header = Row::new(columns.columns().iter().enumerate().map(|(idx, column)| {
        if column_select {
            (idx + 1).to_string()
        } else {
            column.title().to_string()
        }
    }))
    .bold();

    let rows = app
        .session
        .visible()
        .iter()
        .map(|node| Row::new(columns.row_values(node)));
    let widths = columns
        .columns()
        .iter()
        .map(|column| Constraint::Length(column.width()));

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::new().fg(Color::Black).bg(Color::LightBlue))
        .block(Block::bordered());

    let viewport = app.session.viewport();
    let mut state = TableState::default()
        .with_offset(viewport.offset)
        .with_selected((!app.session.visible().is_empty()).then_some(viewport.cursor));
    frame.render_stateful_widget(table, area, &mut state);
}

fn status_line(app: &App) -> String {
    let session = &app.session;
    if session.is_loading() {
        let frame = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        return format!("[{}] Loading{frame}", app.cluster);
    }

    let visible = session.visible().len();
    let total = session.total();
    let position = if visible == 0 {
        0
    } else {
        session.viewport().cursor + 1
    };
    let mut line = if visible == total {
        format!("[{}] {position}/{total}", app.cluster)
    } else {
        format!("[{}] {position}/{visible} (total: {total})", app.cluster)
    };
    if app.refreshing {
        line.push_str("  refreshing…");
    }
    line
}

fn draw_search(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let prompt = match app.session.scope_column() {
        Some(column) => format!("{}> ", column.title()),
        None => "> ".to_string(),
    };
    let text = format!("{prompt}{}", app.session.query());
    frame.render_widget(Paragraph::new(text.clone()), area);

    if app.session.mode() == Mode::Searching {
        frame.set_cursor_position(Position::new(area.x + text.len() as u16, area.y));
    }
}

fn help_line(app: &App) -> &'static str {
    match app.session.mode() {
        Mode::Searching => "Type to search • Esc: cancel search • Enter: ssh to selection",
        Mode::ColumnSelecting => {
            "↑/↓: Navigate • 1-9: Choose column • q: Quit • Esc: cancel column select • Enter: ssh to selection"
        }
        Mode::Browsing => {
            "↑/↓: Navigate • /: Search • C: Column search • D/S/P: Env(dev/stg/ppd) • c/p: Type(compute/platform) • ctrl+r: Refresh • q: Quit • Enter: ssh to selection"
        }
    }
}
