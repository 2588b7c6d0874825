//! Header bar widget.
//!
//! Shows the application name, the selected backend, and a busy marker
//! while a turn is running.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Header bar widget.
pub struct Header<'a> {
    backend: &'a str,
    connected: bool,
    busy: bool,
}

impl<'a> Header<'a> {
    /// Creates a new header widget.
    pub fn new(backend: &'a str, connected: bool, busy: bool) -> Self {
        Self {
            backend,
            connected,
            busy,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" sqlchat v{}", env!("CARGO_PKG_VERSION"));
        let left_span = Span::styled(left_text, style);
        buf.set_span(area.x, area.y, &left_span, area.width);

        if self.busy {
            let busy_text = "thinking…";
            let busy_style = Style::default()
                .bg(Color::Blue)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD);
            let busy_x = area.x + (area.width.saturating_sub(busy_text.len() as u16)) / 2;
            buf.set_string(busy_x, area.y, busy_text, busy_style);
        }

        let status_dot = if self.connected { "●" } else { "○" };
        let status_color = if self.connected {
            Color::Green
        } else {
            Color::Gray
        };
        let right_text = format!(" [{}] ", self.backend);
        let right_width = right_text.len() as u16 + 1;
        if right_width < area.width {
            let right_x = area.right().saturating_sub(right_width);
            buf.set_string(
                right_x,
                area.y,
                status_dot,
                Style::default().bg(Color::Blue).fg(status_color),
            );
            buf.set_string(right_x + 1, area.y, &right_text, style);
        }
    }
}
