//! CLI for the strec stream segment recorder.

mod commands;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strec_core::{config, logging};

use commands::{run_capture, run_clean, run_streams};

/// Top-level CLI for the strec stream segment recorder.
#[derive(Debug, Parser)]
#[command(name = "strec")]
#[command(about = "strec: scheduled concurrent stream segment recorder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Capture all configured streams until interrupted.
    Run {
        /// Start immediately, skipping any schedule prompt.
        #[arg(long, conflicts_with = "at")]
        now: bool,

        /// Start at the given 24-hour wall-clock time; a time already past
        /// today means the same time tomorrow.
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,

        /// Write segments here instead of the configured output directory.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Remove leftover partial files from the output directory.
    Clean {
        /// Clean this directory instead of the configured one.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// List the configured streams.
    Streams,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        if logging::init_logging(cfg.log_file.as_deref()).is_err() {
            logging::init_logging_stderr();
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                now,
                at,
                output_dir,
            } => run_capture(&cfg, now, at.as_deref(), output_dir).await?,
            CliCommand::Clean { output_dir } => run_clean(&cfg, output_dir)?,
            CliCommand::Streams => run_streams(&cfg),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
