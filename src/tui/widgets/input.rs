//! Input bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Calculates the scroll offset (in characters) needed to keep the
/// cursor visible.
pub fn calculate_scroll_offset(cursor_chars: usize, available_width: usize) -> usize {
    if cursor_chars <= available_width {
        0
    } else {
        cursor_chars.saturating_sub(available_width)
    }
}

/// Display column of the cursor inside the visible window, after
/// horizontal scrolling. `cursor` is a byte index into `text`.
pub fn visible_cursor_column(text: &str, cursor: usize, available_width: usize) -> usize {
    let cursor_chars = text[..cursor.min(text.len())].chars().count();
    let offset = calculate_scroll_offset(cursor_chars, available_width);
    (cursor_chars - offset).min(available_width)
}

/// Input bar widget.
pub struct InputBar<'a> {
    text: &'a str,
    cursor: usize,
    focused: bool,
}

impl<'a> InputBar<'a> {
    /// Creates a new input bar widget.
    pub fn new(text: &'a str, cursor: usize, focused: bool) -> Self {
        Self {
            text,
            cursor,
            focused,
        }
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Ask ");

        let prompt_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);

        // Border left (1) + prompt "> " (2) + border right (1) + cursor (1)
        let available_width = area.width.saturating_sub(5) as usize;

        // Scroll in characters, then map back to a byte index so the
        // slice always lands on a char boundary
        let cursor_chars = self.text[..self.cursor.min(self.text.len())].chars().count();
        let scroll_offset = calculate_scroll_offset(cursor_chars, available_width);
        let start = self
            .text
            .char_indices()
            .nth(scroll_offset)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        let visible_text = &self.text[start..];

        let line = Line::from(vec![
            Span::styled("> ", prompt_style),
            Span::raw(visible_text),
        ]);

        Paragraph::new(line).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scroll_while_cursor_fits() {
        assert_eq!(calculate_scroll_offset(5, 20), 0);
        assert_eq!(calculate_scroll_offset(20, 20), 0);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        assert_eq!(calculate_scroll_offset(25, 20), 5);
        assert_eq!(calculate_scroll_offset(50, 20), 30);
    }

    #[test]
    fn test_cursor_column_tracks_characters_not_bytes() {
        // "éé" is 4 bytes but 2 columns
        assert_eq!(visible_cursor_column("éé", 4, 20), 2);
        assert_eq!(visible_cursor_column("abc", 3, 20), 3);
    }

    #[test]
    fn test_cursor_column_is_clamped_after_scrolling() {
        let text = "é".repeat(10);
        assert_eq!(visible_cursor_column(&text, text.len(), 5), 5);
        assert_eq!(visible_cursor_column(&text, text.len(), 3), 3);
    }

    #[test]
    fn test_render_multibyte_overflow_does_not_panic() {
        let text = "é".repeat(10);
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);

        InputBar::new(&text, text.len(), true).render(area, &mut buf);

        // The tail of the text is visible after the prompt
        assert_eq!(buf[(3, 1)].symbol(), "é");
    }

    #[test]
    fn test_render_scrolls_to_keep_cursor_visible() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);

        // 5 columns available; cursor at the end scrolls "abcde" out
        InputBar::new("abcdefghij", 10, true).render(area, &mut buf);

        assert_eq!(buf[(3, 1)].symbol(), "f");
        assert_eq!(buf[(7, 1)].symbol(), "j");
    }
}
