//! Sidebar widget: the connection form.
//!
//! Renders the backend selector, credential fields, the API key field,
//! and the clear-history action. Secret values render masked.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tui::app::{SidebarForm, SidebarRow};

/// Replaces every character of a secret with a mask dot.
pub fn mask(value: &str) -> String {
    "•".repeat(value.chars().count())
}

/// Sidebar widget for the connection form.
pub struct Sidebar<'a> {
    form: &'a SidebarForm,
    focused: bool,
}

impl<'a> Sidebar<'a> {
    /// Creates a new sidebar widget.
    pub fn new(form: &'a SidebarForm, focused: bool) -> Self {
        Self { form, focused }
    }

    fn row_line(&self, index: usize, row: SidebarRow) -> Line<'static> {
        let selected =
            self.focused && index == self.form.selected.min(self.form.visible_rows().len() - 1);

        let label_style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let value = match row {
            SidebarRow::Database => self.form.kind.label().to_string(),
            SidebarRow::ClearHistory => String::new(),
            _ => {
                let raw = self.form.value(row).unwrap_or("");
                if row.is_secret() {
                    mask(raw)
                } else {
                    raw.to_string()
                }
            }
        };

        let marker = if selected { "▸ " } else { "  " };
        match row {
            SidebarRow::Database => Line::from(vec![
                Span::styled(format!("{marker}{}: ", row.label()), label_style),
                Span::styled(format!("◂ {value} ▸"), Style::default().fg(Color::Yellow)),
            ]),
            SidebarRow::ClearHistory => Line::from(Span::styled(
                format!("{marker}[ {} ]", row.label()),
                label_style,
            )),
            _ => Line::from(vec![
                Span::styled(format!("{marker}{}: ", row.label()), label_style),
                Span::raw(value),
            ]),
        }
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Connection ");

        let mut lines: Vec<Line> = self
            .form
            .visible_rows()
            .into_iter()
            .enumerate()
            .map(|(index, row)| self.row_line(index, row))
            .collect();

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab: switch panel",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "↑/↓: field  ◂/▸: backend",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
