//! Logging configuration for sqlchat.
//!
//! Writes log output to a file, since the TUI owns the terminal and
//! writing to stderr would corrupt the display. Connection URLs and
//! credentials are never logged; log lines mention at most the backend
//! kind and host.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initializes logging for TUI mode.
///
/// Logs are written to `~/.local/state/sqlchat/sqlchat.log` on Linux (XDG
/// state directory), or the platform-appropriate state/config directory
/// on other systems.
pub fn init_file_logging(default_level: &str) {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            // Fall back to no logging rather than corrupting the TUI
            return;
        }
    }

    // Truncate on each run to avoid unbounded growth
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Returns the path for the log file.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("sqlchat").join("sqlchat.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sqlchat").join("sqlchat.log");
    }

    std::env::temp_dir().join("sqlchat.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_absolute() {
        let path = get_log_path();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_log_path_ends_with_sqlchat_log() {
        let path = get_log_path();
        assert!(path.ends_with("sqlchat.log"));
    }
}
