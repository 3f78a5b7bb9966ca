//! Supervisor: reap, wait for the schedule gate, fan out one capture job
//! per configured stream, and drain them all on shutdown.
//!
//! All jobs share one shutdown token. An interrupt at any point (including
//! during the schedule wait) cancels every job and the supervisor still
//! waits for each one to terminate, so no segment write is abandoned
//! mid-flight by the process exiting.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cancel::ShutdownToken;
use crate::capture::SegmentRunner;
use crate::config::StreamConfig;
use crate::job::{CaptureJob, JobReport};
use crate::naming;
use crate::reaper;
use crate::schedule::{self, ScheduleSpec, WaitOutcome};

/// Wiring for one supervised run.
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub default_segment_secs: u64,
    pub runner: Arc<dyn SegmentRunner>,
    pub shutdown: ShutdownToken,
}

/// What happened: leftover partials removed at startup, and one report per
/// started job.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub partials_removed: usize,
    pub jobs: Vec<JobReport>,
}

/// Runs the full pipeline. Returns Err only for startup preconditions (an
/// unusable output directory); per-segment and per-job failures are
/// contained by the jobs and show up in the summary instead.
pub async fn run_all(
    streams: &[StreamConfig],
    spec: ScheduleSpec,
    opts: RunOptions,
) -> Result<RunSummary> {
    let partials_removed = reaper::clean_partial_files(&opts.output_dir)?;

    match schedule::wait_until(spec, &opts.shutdown).await {
        WaitOutcome::Interrupted => {
            tracing::warn!("run aborted before start, no capture jobs launched");
            return Ok(RunSummary {
                partials_removed,
                jobs: Vec::new(),
            });
        }
        WaitOutcome::Ready => {}
    }

    if streams.is_empty() {
        tracing::warn!("no streams configured, nothing to capture");
    }

    let names = naming::uniquify_stream_names(
        streams.iter().map(|s| s.display_name()).collect(),
    );

    let mut join_set = tokio::task::JoinSet::new();
    for (stream, name) in streams.iter().zip(names) {
        let job = CaptureJob::new(
            name,
            stream,
            opts.default_segment_secs,
            &opts.output_dir,
            Arc::clone(&opts.runner),
            opts.shutdown.clone(),
        );
        join_set.spawn(job.run());
    }

    tracing::info!(jobs = join_set.len(), "capture jobs launched");

    let mut jobs: Vec<JobReport> = Vec::with_capacity(streams.len());
    while let Some(res) = join_set.join_next().await {
        let report = res.map_err(|e| anyhow::anyhow!("capture job task join: {}", e))?;
        jobs.push(report);
    }
    jobs.sort_by(|a, b| a.stream.cmp(&b.stream));

    tracing::info!(jobs = jobs.len(), "all capture jobs terminated");
    for job in &jobs {
        let outcome = job
            .last_outcome
            .as_ref()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "never started".to_string());
        tracing::info!(
            stream = %job.stream,
            attempts = job.attempts,
            successes = job.successes,
            failures = job.failures,
            outcome = %outcome,
            "job summary"
        );
    }

    Ok(RunSummary {
        partials_removed,
        jobs,
    })
}
