//! sqlchat - chat with your database in plain language.

use sqlchat::cli::Cli;
use sqlchat::{logging, tui};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Logs go to a file; the terminal belongs to the TUI
    logging::init_file_logging(&cli.log_level);

    if let Err(e) = tui::run(cli.local_db).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}
