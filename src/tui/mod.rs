//! Terminal user interface.
//!
//! Owns the terminal, the event loop, and the async submission path.
//! A question is submitted with Enter in the input bar: the connection
//! is (re)established inline, then the agent turn runs in a background
//! task whose progress events stream into the chat panel.

pub mod app;
mod events;
mod ui;
pub mod widgets;

pub use app::App;
pub use events::{Event, EventHandler};

use std::io::{self, Stdout};
use std::panic;
use std::path::PathBuf;

use crossterm::{
    event::{KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::oneshot;
use tracing::info;

use crate::agent::{ChannelSink, GroqAgent, SqlAgent};
use crate::error::{ChatError, Result};
use crate::profile::ConnectionProfile;
use app::{Focus, PendingTurn};

/// The TUI runner: terminal handle plus event polling.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| ChatError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| ChatError::internal(format!("Failed to enter alternate screen: {e}")))?;

        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
            .map_err(|e| ChatError::internal(format!("Failed to create terminal: {e}")))
    }

    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| ChatError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| ChatError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| ChatError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the main event loop until the user quits.
    pub async fn run(&mut self, app: &mut App) -> Result<()> {
        // Restore the terminal if anything panics mid-draw
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        while app.running {
            app.poll_pending();

            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| ChatError::internal(format!("Failed to draw: {e}")))?;

            match self.event_handler.next()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if key.code == KeyCode::Enter && app.focus == Focus::Input {
                        submit_question(app).await;
                    } else {
                        app.handle_key(key);
                    }
                }
                Event::Key(_) | Event::Resize(..) | Event::Tick => {}
            }
        }

        let _ = panic::take_hook();
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Validates the form, connects, and launches the agent turn in the
/// background. Every failure lands in the status line; the transcript
/// is only touched once the turn actually starts.
async fn submit_question(app: &mut App) {
    if app.is_processing {
        app.set_status("Still working on the previous question");
        return;
    }
    if app.input.text.trim().is_empty() {
        return;
    }

    let api_key = app.form.api_key.trim().to_string();
    if api_key.is_empty() {
        app.set_status("Enter your Groq API key in the sidebar first");
        app.focus = Focus::Sidebar;
        return;
    }

    let profile = match ConnectionProfile::resolve(
        app.form.kind,
        &app.form.fields,
        app.local_db.as_deref(),
    ) {
        Ok(profile) => profile,
        Err(e) => {
            app.set_status(e.to_string());
            app.focus = Focus::Sidebar;
            return;
        }
    };

    let handle = match app.session.connect(&profile).await {
        Ok(handle) => handle,
        Err(e) => {
            app.set_status(e.to_string());
            return;
        }
    };

    let agent = match GroqAgent::new(api_key, handle) {
        Ok(agent) => agent,
        Err(e) => {
            app.set_status(e.to_string());
            return;
        }
    };

    let utterance = app.input.take().trim().to_string();
    app.session.begin_turn(utterance.clone());

    let (sink, events_rx) = ChannelSink::new();
    let (done_tx, done_rx) = oneshot::channel();
    tokio::spawn(async move {
        let outcome = agent.run(&utterance, &sink).await;
        // Receiver is dropped if the user quit mid-turn
        let _ = done_tx.send(outcome);
    });

    app.pending = Some(PendingTurn { done_rx, events_rx });
    app.progress.clear();
    app.is_processing = true;
    app.status = None;
    app.chat_scroll = 0;
}

/// Runs the TUI application.
pub async fn run(local_db: Option<PathBuf>) -> Result<()> {
    info!("starting interactive session");
    let mut tui = Tui::new()?;
    let mut app = App::new(local_db);
    tui.run(&mut app).await
}
