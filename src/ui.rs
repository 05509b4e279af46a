//! The UI renders the application state as a checkbox list with a help pane.
//!
//! Patches are listed under a heading per file. Each row shows its checkbox, its name and its
//! group; rows whose status differs from disk are highlighted until applied or restored. The
//! right-hand pane shows the selected patch's block text and the bottom bar shows the keys or
//! the outcome of the last action.

use crate::app_state::{AppState, Row};
use crate::patch::Status;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const KEYS: &str =
    "↑/↓: Navigate | Space: Toggle | a: Apply Changes | d: Disable all | r: Restore Defaults | q: Quit";
const MAX_STATUS_HEIGHT: u16 = 12;

/// Renders the patch list, help pane and status bar.
pub fn draw(f: &mut Frame, app: &AppState) {
    let status_height = app.message.as_ref().map_or(3, |(_, message)| {
        u16::try_from(message.lines().count() + 3)
            .unwrap_or(MAX_STATUS_HEIGHT)
            .min(MAX_STATUS_HEIGHT)
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(status_height)])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[0]);

    draw_list(f, app, panes[0]);
    draw_help_text(f, app, panes[1]);
    draw_status(f, app, chunks[1]);
}

fn draw_list(f: &mut Frame, app: &AppState, area: Rect) {
    let session = &app.session;
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| match row {
            Row::File(path) => ListItem::new(Line::from(Span::styled(
                format!("📄 {}", path.display()),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ))),
            Row::Patch { file, index } => {
                let Some(record) = session.record(file, *index) else {
                    return ListItem::new(Line::default());
                };
                let changed = session
                    .original()
                    .get(file)
                    .and_then(|records| records.get(*index))
                    .is_some_and(|original| original.status != record.status);

                let checkbox = match record.status {
                    Status::Enabled => "[x] ",
                    Status::Disabled => "[ ] ",
                };
                let mut spans = vec![
                    Span::raw("  "),
                    Span::raw(checkbox),
                    Span::raw(record.name.clone()),
                ];
                if let Some(group) = &record.group {
                    spans.push(Span::styled(
                        format!(" ({group})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }

                let style = if changed {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(spans)).style(style)
            }
        })
        .collect();

    let title = if session.is_dirty() {
        format!("Patches ({} files, unapplied changes)", session.records().len())
    } else {
        format!("Patches ({} files)", session.records().len())
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_help_text(f: &mut Frame, app: &AppState, area: Rect) {
    let (title, text) = app.current_record().map_or_else(
        || ("Help".to_string(), String::new()),
        |record| (record.label(), record.help_text.clone()),
    );

    let help = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(help, area);
}

fn draw_status(f: &mut Frame, app: &AppState, area: Rect) {
    let widget = match &app.message {
        Some((title, message)) => Paragraph::new(message.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title.as_str())),
        None => Paragraph::new(KEYS).block(Block::default().borders(Borders::ALL)),
    };
    f.render_widget(widget, area);
}
