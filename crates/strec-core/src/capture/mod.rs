//! Capture runner: one external-tool invocation per segment.
//!
//! The runner is the seam between the job loop and the outside world; tests
//! substitute a stub so the whole pipeline runs without the real tool.

mod error;
mod ytdlp;

pub use error::CaptureError;
pub use ytdlp::YtDlpRunner;

use async_trait::async_trait;
use std::path::Path;

use crate::cancel::ShutdownToken;

/// Everything the runner needs to fetch one segment.
#[derive(Debug, Clone)]
pub struct SegmentRequest {
    /// Source URL.
    pub url: String,
    /// Quality selector, passed through verbatim.
    pub quality: String,
    /// Segment length in seconds, enforced by the tool itself.
    pub duration_secs: u64,
}

/// Outcome of one segment attempt. Failure never propagates as Err: the job
/// loop logs it and moves on, so the runner reports it as data instead.
#[derive(Debug)]
pub enum SegmentOutcome {
    /// The tool exited cleanly; a completed file exists at the output path.
    Completed,
    /// The tool failed to start or exited non-zero. Any partial output file
    /// is left for the startup reaper.
    Failed(CaptureError),
    /// Shutdown was requested; the in-flight subprocess was killed.
    Cancelled,
}

/// Runs the external capture tool for a single segment.
#[async_trait]
pub trait SegmentRunner: Send + Sync {
    /// Captures `request.duration_secs` seconds of media to `output_path`.
    ///
    /// Must honor `shutdown`: when it triggers mid-capture the subprocess is
    /// terminated (not awaited to natural completion) and the outcome is
    /// `Cancelled`.
    async fn run_segment(
        &self,
        request: &SegmentRequest,
        output_path: &Path,
        shutdown: &ShutdownToken,
    ) -> SegmentOutcome;
}
