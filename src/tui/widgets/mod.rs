//! Widgets for the TUI.

pub mod chat;
pub mod header;
pub mod input;
pub mod sidebar;
