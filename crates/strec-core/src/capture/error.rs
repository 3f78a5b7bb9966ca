//! Capture error taxonomy: fatal tool absence vs per-segment failures.

use thiserror::Error;

/// Errors from the capture tool. `DependencyMissing` is fatal at startup;
/// the other variants describe a single failed segment attempt and are
/// contained by the job loop.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture tool (or its downloader) is not usable on this system.
    #[error("required tool `{tool}` is not available: {reason}")]
    DependencyMissing { tool: String, reason: String },

    /// Spawning the subprocess failed (tool vanished, fork error).
    #[error("could not launch `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The subprocess ran but exited non-zero; `detail` carries the tail of
    /// its stderr for the log line.
    #[error("`{tool}` exited with {status}: {detail}")]
    Tool {
        tool: String,
        status: std::process::ExitStatus,
        detail: String,
    },
}
