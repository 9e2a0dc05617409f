//! UI rendering for the TUI.
//!
//! Defines the layout and renders all panels from the current `App` state.

use crate::app::{App, ErrorDialog, Focus, PickList};
use crate::core::db::Session;
use crate::highlight::{styled_runs, HighlightSpan};
use crate::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table, TableState, Wrap,
    },
    Frame,
};

/// Maximum width for any grid column.
const MAX_COLUMN_WIDTH: usize = 40;

const SIDEBAR_WIDTH: u16 = 28;
const EDITOR_HEIGHT: u16 = 8;

/// Renders the entire UI.
///
/// Takes the app mutably so the grid viewport can follow the panel height.
pub fn render<S: Session>(frame: &mut Frame, app: &mut App<S>) {
    let area = frame.area();
    frame.render_widget(Block::default().style(app.theme.base()), area);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(main_layout[0]);

    let sidebar_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(content_layout[0]);

    let work_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(EDITOR_HEIGHT), Constraint::Min(3)])
        .split(content_layout[1]);

    render_pick_list(frame, sidebar_layout[0], "Databases", &app.databases, app.focus == Focus::Databases, &app.theme);
    render_pick_list(frame, sidebar_layout[1], "Tables", &app.tables, app.focus == Focus::Tables, &app.theme);
    render_editor(frame, work_layout[0], app);
    render_grid(frame, work_layout[1], app);
    render_status(frame, main_layout[1], app);

    if let Some(dialog) = &app.dialog {
        render_error_dialog(frame, dialog, &app.theme);
    }
}

fn panel<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let border = if focused { theme.focused_border } else { theme.border };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border))
        .style(theme.base())
}

fn render_pick_list(frame: &mut Frame, area: Rect, title: &str, list: &PickList, focused: bool, theme: &Theme) {
    let items: Vec<ListItem> = list.items.iter().map(|i| ListItem::new(i.as_str())).collect();
    let widget = List::new(items)
        .block(panel(title, focused, theme))
        .highlight_style(theme.selection)
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !list.items.is_empty() {
        state.select(Some(list.selected));
    }
    frame.render_stateful_widget(widget, area, &mut state);
}

/// Splits highlighted editor text into styled lines.
pub fn editor_lines(text: &str, spans: &[HighlightSpan], theme: &Theme) -> Vec<Line<'static>> {
    let chars: Vec<char> = text.chars().collect();
    let mut lines = vec![Line::default()];
    for (class, range) in styled_runs(text, spans) {
        let style = class.map(|c| theme.token(c)).unwrap_or_else(|| theme.base());
        let piece: String = chars[range].iter().collect();
        for (i, part) in piece.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if part.is_empty() {
                continue;
            }
            if let Some(line) = lines.last_mut() {
                line.spans.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines
}

fn render_editor<S: Session>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let focused = app.focus == Focus::Editor;
    let block = panel("Query (F5 to run)", focused, &app.theme);
    let inner = block.inner(area);

    let (line, col) = app.editor.cursor_line_col();
    let height = inner.height.max(1) as usize;
    let scroll = line.saturating_sub(height - 1);

    let lines = editor_lines(app.editor.get_query(), app.editor.spans(), &app.theme);
    let widget = Paragraph::new(lines).block(block).scroll((scroll as u16, 0));
    frame.render_widget(widget, area);

    if focused && app.dialog.is_none() && inner.width > 0 {
        let x = inner.x + (col as u16).min(inner.width - 1);
        let y = inner.y + (line - scroll) as u16;
        frame.set_cursor_position((x, y));
    }
}

fn render_grid<S: Session>(frame: &mut Frame, area: Rect, app: &mut App<S>) {
    let focused = app.focus == Focus::Grid;
    let title = match &app.current_table {
        Some(table) => format!("{} ({} rows)", table, app.grid.row_count()),
        None => format!("Results ({} rows)", app.grid.row_count()),
    };
    let block = panel(&title, focused, &app.theme);

    if app.grid.headers.is_empty() {
        let hint = Paragraph::new("No data. Pick a table or run a query.").block(block);
        frame.render_widget(hint, area);
        return;
    }

    // Borders plus the header row
    let visible = area.height.saturating_sub(3) as usize;
    let grid = &mut app.grid;
    grid.viewport.resize(visible);
    if let Some(selected) = grid.selected {
        grid.viewport.reveal(selected);
    }

    let widths: Vec<Constraint> = grid
        .column_widths()
        .into_iter()
        .map(|w| Constraint::Length(w.min(MAX_COLUMN_WIDTH) as u16))
        .collect();

    let header = Row::new(grid.headers.iter().map(|h| Cell::from(h.as_str()))).style(app.theme.header);
    let rows: Vec<Row> = grid
        .viewport
        .visible_rows(&grid.rows)
        .iter()
        .map(|row| Row::new(row.cells.iter().map(|c| Cell::from(c.content.as_str()))))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .highlight_style(app.theme.selection);

    let mut state = TableState::default();
    if let Some(selected) = grid.selected {
        state.select(selected.checked_sub(grid.viewport.start));
    }
    frame.render_stateful_widget(table, area, &mut state);

    if grid.rows.len() > visible {
        let mut scrollbar = ScrollbarState::new(grid.rows.len()).position(grid.selected.unwrap_or(0));
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar,
        );
    }
}

fn render_status<S: Session>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let database = app.current_database().unwrap_or("-");
    let mut spans = vec![
        Span::styled(format!(" [{}] ", database), app.theme.status.add_modifier(Modifier::BOLD)),
        Span::styled(app.status.clone(), app.theme.status),
    ];
    if app.show_status_tips {
        spans.push(Span::styled(format!("  |  {}", app.tips()), app.theme.status));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(app.theme.status), area);
}

fn render_error_dialog(frame: &mut Frame, dialog: &ErrorDialog, theme: &Theme) {
    let area = frame.area();
    let width = ((area.width as f32 * 0.6) as u16).clamp(20, 80).min(area.width);
    let text_width = width.saturating_sub(4).max(1) as usize;
    let wrapped: usize = dialog
        .message
        .lines()
        .map(|l| l.chars().count().div_ceil(text_width).max(1))
        .sum();
    let height = (wrapped as u16 + 4).min(area.height);
    let dialog_area = center_rect(width, height, area);

    frame.render_widget(Clear, dialog_area);

    let mut lines: Vec<Line> = dialog.message.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter or Esc to dismiss",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", dialog.title))
        .border_style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD))
        .style(theme.base());
    let widget = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(widget, dialog_area);
}

fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
