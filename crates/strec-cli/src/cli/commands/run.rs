//! `strec run` – the full capture pipeline: dependency probe, reap,
//! schedule gate, concurrent jobs, drain, summary.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use strec_core::cancel::{self, ShutdownToken};
use strec_core::capture::YtDlpRunner;
use strec_core::config::RecorderConfig;
use strec_core::schedule::ScheduleSpec;
use strec_core::supervisor::{self, RunOptions};

use crate::cli::prompt;

pub async fn run_capture(
    cfg: &RecorderConfig,
    now: bool,
    at: Option<&str>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let spec = resolve_schedule(cfg, now, at)?;

    // Tool availability is checked before the schedule wait begins.
    let runner = YtDlpRunner::new();
    runner.ensure_available().await?;

    let output_dir = output_dir.unwrap_or_else(|| cfg.output_dir.clone());
    let shutdown = ShutdownToken::new();
    cancel::listen_for_interrupt(shutdown.clone());

    let summary = supervisor::run_all(
        &cfg.streams,
        spec,
        RunOptions {
            output_dir,
            default_segment_secs: cfg.segment_duration,
            runner: Arc::new(runner),
            shutdown,
        },
    )
    .await?;

    if summary.partials_removed > 0 {
        println!(
            "Removed {} leftover partial file(s) before starting.",
            summary.partials_removed
        );
    }
    if summary.jobs.is_empty() {
        println!("No capture jobs were started.");
    } else {
        println!("{} capture job(s) finished:", summary.jobs.len());
        for job in &summary.jobs {
            let outcome = job
                .last_outcome
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_else(|| "never started".to_string());
            println!(
                "  {}: {} segment(s) captured, {} failed, last outcome: {}",
                job.stream, job.successes, job.failures, outcome
            );
        }
    }
    Ok(())
}

/// Flags beat the prompt: `--now` or `--at` decide outright; otherwise the
/// config's `schedule_enabled` turns the interactive prompt on.
fn resolve_schedule(cfg: &RecorderConfig, now: bool, at: Option<&str>) -> Result<ScheduleSpec> {
    if now {
        return Ok(ScheduleSpec::Immediate);
    }
    if let Some(raw) = at {
        return prompt::parse_schedule_input(raw);
    }
    if cfg.schedule_enabled {
        return prompt::prompt_for_schedule();
    }
    Ok(ScheduleSpec::Immediate)
}
