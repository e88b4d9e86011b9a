use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use layerstack::layer::Transform;

use crate::app::App;
use crate::mode::Mode;

/// Compact "x,y" position, with rotation and scale only when not neutral
fn describe_transform(t: &Transform) -> String {
    let mut out = format!("{},{}", t.x, t.y);
    if t.rotation != 0.0 {
        out.push_str(&format!(" r{}", t.rotation));
    }
    if t.scale != 1.0 {
        out.push_str(&format!(" x{}", t.scale));
    }
    out
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_layers(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
    render_message_line(frame, app, chunks[2]);
}

fn render_layers(frame: &mut Frame, app: &App, area: Rect) {
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Cell::from(""),
        Cell::from(""),
        Cell::from(""),
        Cell::from("Name"),
        Cell::from("Content"),
        Cell::from("Position"),
    ])
    .style(header_style);

    let rows: Vec<Row> = app
        .rows()
        .enumerate()
        .map(|(row_idx, layer)| {
            let is_cursor = row_idx == app.cursor;

            let style = if is_cursor {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if layer.selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(if is_cursor { ">" } else { " " }),
                Cell::from(if layer.selected { "●" } else { "○" }),
                Cell::from(layer.kind.glyph().to_string()),
                Cell::from(layer.name.clone()),
                Cell::from(format!("{} {}", layer.kind.label(), layer.kind.describe())),
                Cell::from(describe_transform(&layer.transform)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(12),
        Constraint::Min(16),
        Constraint::Length(16),
    ];

    let title = format!("Layers ({}) front ↑ back ↓", app.stack.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(table, area);
}

/// Capability flag shown bright when the operation is available
fn flag(label: &'static str, on: bool) -> Span<'static> {
    if on {
        Span::styled(label, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(label, Style::default().fg(Color::DarkGray))
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_style = match app.mode {
        Mode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        Mode::Nudge => Style::default().bg(Color::Magenta).fg(Color::White),
        Mode::Rename => Style::default().bg(Color::Green).fg(Color::Black),
    };

    let history = app.stack.history();
    let pending = if app.stack.has_pending_changes() { "[+]" } else { "" };
    let keys = if app.mode.is_gesture() {
        String::new()
    } else {
        app.key_buffer_display()
    };

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", app.mode.display_name()),
            mode_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        flag("undo", app.stack.can_undo()),
        Span::raw(format!(":{} ", history.undo_depth())),
        flag("redo", app.stack.can_redo()),
        Span::raw(format!(":{} ", history.redo_depth())),
        Span::raw("│ "),
        flag("fwd ", app.stack.can_move_layers_forward()),
        flag("bwd ", app.stack.can_move_layers_backward()),
        flag("top ", app.stack.can_bring_layers_to_front()),
        flag("bottom ", app.stack.can_send_layers_to_back()),
        Span::raw(format!("│ {} selected ", app.stack.selected_count())),
        Span::styled(pending, Style::default().fg(Color::Red)),
        Span::raw(format!(" {}", keys)),
    ]);

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

fn render_message_line(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.mode {
        Mode::Rename => format!("rename: {}_", app.rename_buffer),
        Mode::Nudge => "nudge: arrows/hjkl move, Enter apply, Esc cancel".to_string(),
        Mode::Normal => app.message.clone().unwrap_or_default(),
    };

    frame.render_widget(Paragraph::new(content), area);
}
