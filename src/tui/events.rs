//! Terminal event handling.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};

use crate::error::{ChatError, Result};

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// A periodic tick.
    Tick,
}

/// Polls the terminal for events with a fixed tick rate.
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new event handler with the default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    /// Polls for the next event, yielding `Tick` when nothing arrives
    /// within the tick rate.
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)
            .map_err(|e| ChatError::internal(format!("Failed to poll events: {e}")))?
        {
            let event = event::read()
                .map_err(|e| ChatError::internal(format!("Failed to read event: {e}")))?;

            match event {
                CrosstermEvent::Key(key) => Ok(Event::Key(key)),
                CrosstermEvent::Resize(width, height) => Ok(Event::Resize(width, height)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
