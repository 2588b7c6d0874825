//! sqlchat - chat with your database in plain language.
//!
//! A terminal app that connects to a bundled SQLite database or a remote
//! Postgres/MySQL server and answers natural-language questions by
//! letting a Groq-hosted model plan and run read-only SQL.

pub mod agent;
pub mod cache;
pub mod cli;
pub mod db;
pub mod error;
pub mod logging;
pub mod profile;
pub mod session;
pub mod transcript;
pub mod tui;
