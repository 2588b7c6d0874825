//! Chat panel widget.
//!
//! Renders the transcript plus, while a turn is running, the agent's
//! live progress events. The panel is pinned to the bottom and scrolls
//! upward.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::agent::AgentEvent;
use crate::transcript::{ChatMessage, ChatRole};

/// Wraps `text` into lines of at most `width` characters, breaking on
/// whitespace where possible.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for raw_line in text.lines() {
        if raw_line.chars().count() <= width {
            lines.push(raw_line.to_string());
            continue;
        }

        // Scan the line as written so interior spacing survives; only
        // the single space a break lands on is consumed
        let mut current = String::new();
        let mut count = 0;
        for c in raw_line.chars() {
            if count == width {
                if let Some(pos) = current.rfind(' ') {
                    let carry = current[pos + 1..].to_string();
                    current.truncate(pos);
                    lines.push(std::mem::take(&mut current));
                    current = carry;
                    count = current.chars().count();
                } else {
                    lines.push(std::mem::take(&mut current));
                    count = 0;
                }
            }
            current.push(c);
            count += 1;
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Chat panel widget.
pub struct ChatPanel<'a> {
    messages: &'a [ChatMessage],
    progress: &'a [AgentEvent],
    is_processing: bool,
    scroll: usize,
    focused: bool,
}

impl<'a> ChatPanel<'a> {
    /// Creates a new chat panel widget.
    pub fn new(
        messages: &'a [ChatMessage],
        progress: &'a [AgentEvent],
        is_processing: bool,
        scroll: usize,
        focused: bool,
    ) -> Self {
        Self {
            messages,
            progress,
            is_processing,
            scroll,
            focused,
        }
    }

    fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for message in self.messages {
            let (label, label_color) = match message.role {
                ChatRole::User => ("You", Color::Cyan),
                ChatRole::Assistant => ("Assistant", Color::Green),
            };
            lines.push(Line::from(Span::styled(
                label.to_string(),
                Style::default()
                    .fg(label_color)
                    .add_modifier(Modifier::BOLD),
            )));
            for wrapped in wrap_text(&message.content, width) {
                lines.push(Line::from(wrapped));
            }
            lines.push(Line::from(""));
        }

        if self.is_processing {
            for event in self.progress {
                lines.push(Line::from(Span::styled(
                    event.to_string(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(Span::styled(
                "…".to_string(),
                Style::default().fg(Color::Yellow),
            )));
        }

        lines
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Chat ");

        let inner_width = area.width.saturating_sub(2) as usize;
        let inner_height = area.height.saturating_sub(2) as usize;

        let lines = self.build_lines(inner_width);

        // Pin to the bottom, then move up by the scroll offset
        let max_offset = lines.len().saturating_sub(inner_height);
        let offset = max_offset.saturating_sub(self.scroll.min(max_offset));

        let visible: Vec<Line> = lines.into_iter().skip(offset).collect();
        Paragraph::new(visible).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_line_unchanged() {
        assert_eq!(wrap_text("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_wrap_breaks_on_whitespace() {
        assert_eq!(
            wrap_text("alpha beta gamma", 11),
            vec!["alpha beta", "gamma"]
        );
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_preserves_explicit_newlines() {
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_keeps_interior_spacing() {
        // Aligned tool output must survive wrapping as written
        assert_eq!(wrap_text("a  b  c  d", 5), vec!["a  b", " c  d"]);
    }

    #[test]
    fn test_wrap_keeps_whitespace_only_lines() {
        assert_eq!(wrap_text("a\n   \nb", 10), vec!["a", "   ", "b"]);
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        assert_eq!(wrap_text("ééééé", 2), vec!["éé", "éé", "é"]);
    }
}
