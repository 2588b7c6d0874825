//! UI layout and rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Span,
    widgets::{Paragraph, Widget},
    Frame,
};

use super::app::{App, Focus};
use super::widgets::{chat, header, input, sidebar};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Content (chat + sidebar)
            Constraint::Length(1), // Status line
            Constraint::Length(3), // Input
        ])
        .split(area);

    let header_area = main_layout[0];
    let content_area = main_layout[1];
    let status_area = main_layout[2];
    let input_area = main_layout[3];

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70), // Chat
            Constraint::Percentage(30), // Connection form
        ])
        .split(content_area);

    let chat_area = content_layout[0];
    let sidebar_area = content_layout[1];

    render_header(frame, header_area, app);
    render_chat(frame, chat_area, app);
    render_sidebar(frame, sidebar_area, app);
    render_status(frame, status_area, app);
    render_input(frame, input_area, app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let widget = header::Header::new(
        app.form.kind.label(),
        app.session.active_handle().is_some(),
        app.is_processing,
    );
    frame.render_widget(widget, area);
}

fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let widget = chat::ChatPanel::new(
        app.session.transcript().messages(),
        &app.progress,
        app.is_processing,
        app.chat_scroll,
        app.focus == Focus::Chat,
    );
    frame.render_widget(widget, area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let widget = sidebar::Sidebar::new(&app.form, app.focus == Focus::Sidebar);
    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(status) = &app.status {
        let widget = Paragraph::new(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Yellow),
        ));
        widget.render(area, frame.buffer_mut());
    }
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Input;
    let widget = input::InputBar::new(&app.input.text, app.input.cursor, focused);
    frame.render_widget(widget, area);

    if focused {
        let available_width = area.width.saturating_sub(5) as usize;
        let column =
            input::visible_cursor_column(&app.input.text, app.input.cursor, available_width);
        // Border (1) plus prompt "> " (2)
        let cursor_x = area.x + 1 + 2 + column as u16;
        let cursor_y = area.y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}
