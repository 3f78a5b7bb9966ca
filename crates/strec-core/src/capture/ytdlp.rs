//! yt-dlp segment runner: spawns yt-dlp with ffmpeg as the external
//! downloader, bounded to the segment duration, and kills the subprocess
//! when shutdown triggers mid-capture.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};

use crate::cancel::ShutdownToken;

use super::{CaptureError, SegmentOutcome, SegmentRequest, SegmentRunner};

/// How many trailing stderr lines to keep as failure diagnostics.
const STDERR_TAIL_LINES: usize = 12;

/// Production runner invoking `yt-dlp` with `ffmpeg` as external downloader.
pub struct YtDlpRunner {
    program: PathBuf,
    downloader: PathBuf,
}

impl YtDlpRunner {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            downloader: PathBuf::from("ffmpeg"),
        }
    }

    /// Runner with explicit tool paths (e.g. from a non-PATH install).
    pub fn with_programs(program: impl Into<PathBuf>, downloader: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            downloader: downloader.into(),
        }
    }

    /// Verifies both tools run before any job starts.
    pub async fn ensure_available(&self) -> Result<(), CaptureError> {
        probe_tool(&self.program, "--version").await?;
        probe_tool(&self.downloader, "-version").await?;
        Ok(())
    }

    fn tool_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Default for YtDlpRunner {
    fn default() -> Self {
        Self::new()
    }
}

async fn probe_tool(program: &Path, version_arg: &str) -> Result<(), CaptureError> {
    let status = Command::new(program)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CaptureError::DependencyMissing {
            tool: program.display().to_string(),
            reason: format!("version probe exited with {}", status),
        }),
        Err(err) => Err(CaptureError::DependencyMissing {
            tool: program.display().to_string(),
            reason: err.to_string(),
        }),
    }
}

/// Drains a stderr pipe, keeping only the trailing lines. Runs concurrently
/// with the subprocess so a chatty tool can never fill the pipe and stall.
async fn collect_stderr_tail(stderr: ChildStderr) -> String {
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }
    tail.into_iter().collect::<Vec<_>>().join(" | ")
}

#[async_trait]
impl SegmentRunner for YtDlpRunner {
    async fn run_segment(
        &self,
        request: &SegmentRequest,
        output_path: &Path,
        shutdown: &ShutdownToken,
    ) -> SegmentOutcome {
        if shutdown.is_triggered() {
            return SegmentOutcome::Cancelled;
        }

        let mut cmd = Command::new(&self.program);
        cmd.arg("-f")
            .arg(&request.quality)
            .arg("--quiet")
            .arg("--no-progress")
            .arg("--external-downloader")
            .arg(&self.downloader)
            .arg("--external-downloader-args")
            .arg(format!("-y -t {}", request.duration_secs))
            .arg("-o")
            .arg(output_path)
            .arg(&request.url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return SegmentOutcome::Failed(CaptureError::Spawn {
                    tool: self.tool_name(),
                    source: err,
                })
            }
        };

        let stderr_task = child.stderr.take().map(|s| tokio::spawn(collect_stderr_tail(s)));

        tokio::select! {
            status = child.wait() => {
                let detail = match stderr_task {
                    Some(task) => task.await.unwrap_or_default(),
                    None => String::new(),
                };
                match status {
                    Ok(status) if status.success() => SegmentOutcome::Completed,
                    Ok(status) => SegmentOutcome::Failed(CaptureError::Tool {
                        tool: self.tool_name(),
                        status,
                        detail,
                    }),
                    Err(err) => SegmentOutcome::Failed(CaptureError::Spawn {
                        tool: self.tool_name(),
                        source: err,
                    }),
                }
            }
            _ = shutdown.cancelled() => {
                if let Err(err) = child.start_kill() {
                    tracing::warn!("could not kill capture subprocess: {}", err);
                }
                let _ = child.wait().await;
                if let Some(task) = stderr_task {
                    let _ = task.await;
                }
                SegmentOutcome::Cancelled
            }
        }
    }
}
