mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI and dispatch; logging is initialized once the config (and
    // with it the log file path) has been loaded.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("strec error: {:#}", err);
        std::process::exit(1);
    }
}
