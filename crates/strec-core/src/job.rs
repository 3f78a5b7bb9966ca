//! Per-stream capture job: an unbounded loop of sequential segment attempts.
//!
//! A failed segment is logged and the loop moves on to the next attempt;
//! the job never gives up on its stream. The only exit is the shared
//! shutdown token, observed before each attempt and inside the in-flight
//! subprocess wait.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use crate::cancel::ShutdownToken;
use crate::capture::{SegmentOutcome, SegmentRequest, SegmentRunner};
use crate::config::StreamConfig;
use crate::naming;

/// Lifecycle of a capture job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Running,
    Stopping,
    Terminated,
}

/// Final disposition of a segment attempt or of the job itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(String),
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failed(reason) => write!(f, "failed: {}", reason),
            Outcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Mutable per-job record, owned exclusively by its job. The segment index
/// increments after each attempt; cancellation does not count as an attempt.
#[derive(Debug, Clone)]
pub struct JobState {
    pub phase: JobPhase,
    pub next_index: u64,
    pub successes: u64,
    pub failures: u64,
    pub last_outcome: Option<Outcome>,
}

impl JobState {
    fn new() -> Self {
        Self {
            phase: JobPhase::Idle,
            next_index: 0,
            successes: 0,
            failures: 0,
            last_outcome: None,
        }
    }

    fn start(&mut self) {
        self.phase = JobPhase::Running;
    }

    fn record_attempt(&mut self, outcome: Outcome) {
        match &outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Failed(_) => self.failures += 1,
            Outcome::Cancelled => {}
        }
        self.last_outcome = Some(outcome);
        self.next_index += 1;
    }

    fn cancel(&mut self) {
        self.last_outcome = Some(Outcome::Cancelled);
        self.phase = JobPhase::Stopping;
    }

    fn terminate(&mut self) {
        self.phase = JobPhase::Terminated;
    }
}

/// Read-only snapshot of a terminated job, listed in the run summary.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub stream: String,
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub last_outcome: Option<Outcome>,
}

/// One configured stream's capture loop.
pub struct CaptureJob {
    stream_name: String,
    request: SegmentRequest,
    output_dir: PathBuf,
    runner: Arc<dyn SegmentRunner>,
    shutdown: ShutdownToken,
    state: JobState,
}

impl CaptureJob {
    /// `stream_name` must already be unique across the run (the supervisor
    /// uniquifies duplicates) so no two jobs can name the same output file.
    pub fn new(
        stream_name: String,
        stream: &StreamConfig,
        default_segment_secs: u64,
        output_dir: &Path,
        runner: Arc<dyn SegmentRunner>,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            stream_name,
            request: SegmentRequest {
                url: stream.url.clone(),
                quality: stream.quality.clone(),
                duration_secs: stream.effective_segment_secs(default_segment_secs),
            },
            output_dir: output_dir.to_path_buf(),
            runner,
            shutdown,
            state: JobState::new(),
        }
    }

    /// Runs until shutdown; returns the terminal snapshot.
    pub async fn run(mut self) -> JobReport {
        self.state.start();
        tracing::info!(
            stream = %self.stream_name,
            url = %self.request.url,
            segment_secs = self.request.duration_secs,
            "capture job started"
        );

        loop {
            if self.shutdown.is_triggered() {
                self.state.cancel();
                break;
            }

            let index = self.state.next_index;
            let file_name = naming::segment_file_name(&self.stream_name, index, Local::now());
            let output_path = self.output_dir.join(file_name);

            match self
                .runner
                .run_segment(&self.request, &output_path, &self.shutdown)
                .await
            {
                SegmentOutcome::Completed => {
                    tracing::info!(
                        stream = %self.stream_name,
                        segment = index,
                        path = %output_path.display(),
                        "segment captured"
                    );
                    self.state.record_attempt(Outcome::Success);
                }
                SegmentOutcome::Failed(err) => {
                    tracing::error!(
                        stream = %self.stream_name,
                        segment = index,
                        error = %err,
                        "segment failed, continuing with next attempt"
                    );
                    self.state.record_attempt(Outcome::Failed(err.to_string()));
                }
                SegmentOutcome::Cancelled => {
                    tracing::info!(
                        stream = %self.stream_name,
                        segment = index,
                        "segment attempt aborted by shutdown"
                    );
                    self.state.cancel();
                    break;
                }
            }
        }

        self.state.terminate();
        tracing::info!(
            stream = %self.stream_name,
            attempts = self.state.next_index,
            successes = self.state.successes,
            failures = self.state.failures,
            "capture job terminated"
        );

        JobReport {
            stream: self.stream_name,
            attempts: self.state.next_index,
            successes: self.state.successes,
            failures: self.state.failures,
            last_outcome: self.state.last_outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::tempdir;

    fn stream() -> StreamConfig {
        StreamConfig {
            url: "https://example.com/live/cam".to_string(),
            name: Some("cam".to_string()),
            quality: "best".to_string(),
            segment_duration: None,
        }
    }

    /// Scripted runner: fails the first attempt, succeeds the second,
    /// then triggers shutdown and reports the third as cancelled.
    struct ScriptedRunner {
        calls: AtomicU64,
        shutdown: ShutdownToken,
    }

    #[async_trait]
    impl SegmentRunner for ScriptedRunner {
        async fn run_segment(
            &self,
            _request: &SegmentRequest,
            output_path: &Path,
            _shutdown: &ShutdownToken,
        ) -> SegmentOutcome {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => SegmentOutcome::Failed(crate::capture::CaptureError::Spawn {
                    tool: "stub".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "stub failure"),
                }),
                1 => {
                    std::fs::write(output_path, b"segment").unwrap();
                    SegmentOutcome::Completed
                }
                _ => {
                    self.shutdown.trigger();
                    SegmentOutcome::Cancelled
                }
            }
        }
    }

    #[tokio::test]
    async fn failure_does_not_stop_the_job() {
        let dir = tempdir().unwrap();
        let shutdown = ShutdownToken::new();
        let runner = Arc::new(ScriptedRunner {
            calls: AtomicU64::new(0),
            shutdown: shutdown.clone(),
        });
        let job = CaptureJob::new(
            "cam".to_string(),
            &stream(),
            60,
            dir.path(),
            runner,
            shutdown,
        );
        let report = job.run().await;

        assert_eq!(report.attempts, 2, "failed attempt must be followed by another");
        assert_eq!(report.failures, 1);
        assert_eq!(report.successes, 1);
        assert_eq!(report.last_outcome, Some(Outcome::Cancelled));
    }

    /// Runner that must never be reached.
    struct PanicRunner;

    #[async_trait]
    impl SegmentRunner for PanicRunner {
        async fn run_segment(
            &self,
            _request: &SegmentRequest,
            _output_path: &Path,
            _shutdown: &ShutdownToken,
        ) -> SegmentOutcome {
            panic!("runner must not be called after shutdown");
        }
    }

    #[tokio::test]
    async fn cancel_before_first_attempt_produces_nothing() {
        let dir = tempdir().unwrap();
        let shutdown = ShutdownToken::new();
        shutdown.trigger();
        let job = CaptureJob::new(
            "cam".to_string(),
            &stream(),
            60,
            dir.path(),
            Arc::new(PanicRunner),
            shutdown,
        );
        let report = job.run().await;

        assert_eq!(report.attempts, 0);
        assert_eq!(report.last_outcome, Some(Outcome::Cancelled));
        assert_eq!(
            std::fs::read_dir(dir.path()).unwrap().count(),
            0,
            "no segment files may exist"
        );
    }

    #[test]
    fn state_machine_walkthrough() {
        let mut state = JobState::new();
        assert_eq!(state.phase, JobPhase::Idle);
        state.start();
        assert_eq!(state.phase, JobPhase::Running);
        state.record_attempt(Outcome::Success);
        assert_eq!(state.next_index, 1);
        state.cancel();
        assert_eq!(state.phase, JobPhase::Stopping);
        assert_eq!(state.next_index, 1, "cancellation is not an attempt");
        state.terminate();
        assert_eq!(state.phase, JobPhase::Terminated);
        assert_eq!(state.last_outcome, Some(Outcome::Cancelled));
    }
}
