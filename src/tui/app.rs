//! Application state for the TUI.
//!
//! Holds the sidebar form, the chat input, the session, and the state of
//! an in-flight agent turn. All pure state transitions live here; the
//! event loop in `tui::mod` drives the async parts.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::{mpsc, oneshot};

use crate::agent::AgentEvent;
use crate::error::Result;
use crate::profile::{DatabaseKind, RemoteFields};
use crate::session::Session;

/// Which panel currently has focus.
///
/// The sidebar starts focused: a connection must be configured before
/// the first question makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Sidebar,
    Chat,
    Input,
}

impl Focus {
    /// Cycles to the next focus panel.
    pub fn next(self) -> Self {
        match self {
            Self::Sidebar => Self::Chat,
            Self::Chat => Self::Input,
            Self::Input => Self::Sidebar,
        }
    }
}

/// One row of the sidebar form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarRow {
    Database,
    Host,
    User,
    Password,
    DatabaseName,
    ApiKey,
    ClearHistory,
}

impl SidebarRow {
    /// Label shown next to the row.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database => "Database",
            Self::Host => "Host",
            Self::User => "User",
            Self::Password => "Password",
            Self::DatabaseName => "DB name",
            Self::ApiKey => "Groq key",
            Self::ClearHistory => "Clear history",
        }
    }

    /// Rows whose value is rendered masked.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Password | Self::ApiKey)
    }
}

/// The sidebar form: backend choice, credentials, API key.
#[derive(Debug, Default)]
pub struct SidebarForm {
    pub kind: DatabaseKind,
    pub fields: RemoteFields,
    pub api_key: String,
    pub selected: usize,
}

impl SidebarForm {
    /// The rows shown for the current backend. Credential rows are
    /// hidden for the bundled local database.
    pub fn visible_rows(&self) -> Vec<SidebarRow> {
        let mut rows = vec![SidebarRow::Database];
        if self.kind.requires_credentials() {
            rows.extend([
                SidebarRow::Host,
                SidebarRow::User,
                SidebarRow::Password,
                SidebarRow::DatabaseName,
            ]);
        }
        rows.push(SidebarRow::ApiKey);
        rows.push(SidebarRow::ClearHistory);
        rows
    }

    /// The currently selected row.
    pub fn selected_row(&self) -> SidebarRow {
        let rows = self.visible_rows();
        rows[self.selected.min(rows.len() - 1)]
    }

    /// Moves the selection up.
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Moves the selection down.
    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(self.visible_rows().len() - 1);
    }

    /// Switches to the next (or previous) backend, keeping the selection
    /// inside the new row set.
    pub fn cycle_kind(&mut self, forward: bool) {
        let all = DatabaseKind::ALL;
        let index = all.iter().position(|k| *k == self.kind).unwrap_or(0);
        let next = if forward {
            (index + 1) % all.len()
        } else {
            (index + all.len() - 1) % all.len()
        };
        self.kind = all[next];
        self.selected = self.selected.min(self.visible_rows().len() - 1);
    }

    /// The text value of a row, if it has one.
    pub fn value(&self, row: SidebarRow) -> Option<&str> {
        match row {
            SidebarRow::Database => None,
            SidebarRow::Host => Some(&self.fields.host),
            SidebarRow::User => Some(&self.fields.user),
            SidebarRow::Password => Some(&self.fields.password),
            SidebarRow::DatabaseName => Some(&self.fields.database),
            SidebarRow::ApiKey => Some(&self.api_key),
            SidebarRow::ClearHistory => None,
        }
    }

    fn value_mut(&mut self, row: SidebarRow) -> Option<&mut String> {
        match row {
            SidebarRow::Database | SidebarRow::ClearHistory => None,
            SidebarRow::Host => Some(&mut self.fields.host),
            SidebarRow::User => Some(&mut self.fields.user),
            SidebarRow::Password => Some(&mut self.fields.password),
            SidebarRow::DatabaseName => Some(&mut self.fields.database),
            SidebarRow::ApiKey => Some(&mut self.api_key),
        }
    }

    /// Appends a character to the selected field, if it is editable.
    pub fn push_char(&mut self, c: char) {
        let row = self.selected_row();
        if let Some(value) = self.value_mut(row) {
            value.push(c);
        }
    }

    /// Removes the last character of the selected field.
    pub fn backspace(&mut self) {
        let row = self.selected_row();
        if let Some(value) = self.value_mut(row) {
            value.pop();
        }
    }
}

/// Input state for the chat input line.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (byte index; input is ASCII-editable only).
    pub cursor: usize,
}

impl InputState {
    /// Creates a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .chars()
                .next_back()
                .map(char::len_utf8)
                .unwrap_or(0);
            self.cursor -= prev;
            self.text.remove(self.cursor);
        }
    }

    /// Deletes the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    /// Moves the cursor left one character.
    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .chars()
                .next_back()
                .map(char::len_utf8)
                .unwrap_or(0);
            self.cursor -= prev;
        }
    }

    /// Moves the cursor right one character.
    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.text[self.cursor..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(0);
            self.cursor += next;
        }
    }

    /// Moves the cursor to the start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the end.
    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Clears the input and returns the previous text.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

/// Channels of an in-flight agent turn.
pub struct PendingTurn {
    pub done_rx: oneshot::Receiver<Result<String>>,
    pub events_rx: mpsc::UnboundedReceiver<AgentEvent>,
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    /// Current focus panel.
    pub focus: Focus,
    /// Chat input line.
    pub input: InputState,
    /// Sidebar form.
    pub form: SidebarForm,
    /// Transcript, cache, and active connection.
    pub session: Session,
    /// Progress events of the current (or last) turn.
    pub progress: Vec<AgentEvent>,
    /// The in-flight turn, if any.
    pub pending: Option<PendingTurn>,
    /// One-line status message under the chat.
    pub status: Option<String>,
    /// True while a turn is running.
    pub is_processing: bool,
    /// Chat scroll offset (lines from bottom).
    pub chat_scroll: usize,
    /// Override for the bundled SQLite path.
    pub local_db: Option<PathBuf>,
}

impl App {
    /// Creates the initial application state.
    pub fn new(local_db: Option<PathBuf>) -> Self {
        Self {
            running: true,
            focus: Focus::default(),
            input: InputState::new(),
            form: SidebarForm::default(),
            session: Session::new(),
            progress: Vec::new(),
            pending: None,
            status: None,
            is_processing: false,
            chat_scroll: 0,
            local_db,
        }
    }

    /// Sets the status line.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Drains progress events and, when the turn finishes, folds the
    /// outcome into the transcript.
    pub fn poll_pending(&mut self) {
        let Some(pending) = &mut self.pending else {
            return;
        };

        while let Ok(event) = pending.events_rx.try_recv() {
            self.progress.push(event);
        }

        match pending.done_rx.try_recv() {
            Ok(outcome) => {
                self.session.complete_turn(&outcome);
                if let Err(e) = &outcome {
                    self.status = Some(e.to_string());
                }
                self.pending = None;
                self.is_processing = false;
                self.chat_scroll = 0;
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                self.status = Some("The agent task stopped unexpectedly".to_string());
                self.pending = None;
                self.is_processing = false;
            }
        }
    }

    /// Handles a key event that only touches local state.
    ///
    /// Enter in the input panel is handled by the event loop, which owns
    /// the async submission path.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.running = false;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
            }
            _ => match self.focus {
                Focus::Sidebar => self.handle_sidebar_key(key),
                Focus::Chat => self.handle_chat_key(key),
                Focus::Input => self.handle_input_key(key),
            },
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.form.select_previous(),
            KeyCode::Down => self.form.select_next(),
            KeyCode::Left if self.form.selected_row() == SidebarRow::Database => {
                self.form.cycle_kind(false);
            }
            KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ')
                if self.form.selected_row() == SidebarRow::Database =>
            {
                self.form.cycle_kind(true);
            }
            KeyCode::Enter if self.form.selected_row() == SidebarRow::ClearHistory => {
                self.session.clear_history();
                self.progress.clear();
                self.set_status("Chat history cleared");
            }
            KeyCode::Enter => self.form.select_next(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) => self.form.push_char(c),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.chat_scroll = self.chat_scroll.saturating_add(1),
            KeyCode::Down => self.chat_scroll = self.chat_scroll.saturating_sub(1),
            KeyCode::PageUp => self.chat_scroll = self.chat_scroll.saturating_add(10),
            KeyCode::PageDown => self.chat_scroll = self.chat_scroll.saturating_sub(10),
            // Clamped to the top during render
            KeyCode::Home => self.chat_scroll = usize::MAX,
            KeyCode::End => self.chat_scroll = 0,
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => {}
        }
    }
}
