use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::naming;

/// Segment length used when neither the config nor the stream sets one.
pub const DEFAULT_SEGMENT_DURATION_SECS: u64 = 3600;

fn default_output_dir() -> PathBuf {
    PathBuf::from("recordings")
}

fn default_quality() -> String {
    "best".to_string()
}

fn default_segment_duration() -> u64 {
    DEFAULT_SEGMENT_DURATION_SECS
}

/// One stream to capture. Immutable once loaded; duplicates are legal and
/// run as independent jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Source URL handed to the capture tool.
    pub url: String,
    /// Optional display name; derived from the URL when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Quality selector passed through to the capture tool verbatim.
    #[serde(default = "default_quality")]
    pub quality: String,
    /// Per-stream segment length override in seconds.
    #[serde(default)]
    pub segment_duration: Option<u64>,
}

impl StreamConfig {
    /// Filesystem-safe name used in log lines and segment filenames.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => naming::sanitize_stream_name(name),
            None => naming::stream_name_from_url(&self.url),
        }
    }

    /// Segment length for this stream, falling back to the global default.
    pub fn effective_segment_secs(&self, default_secs: u64) -> u64 {
        self.segment_duration.unwrap_or(default_secs)
    }
}

/// Global configuration loaded from `~/.config/strec/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Streams to capture; one concurrent job each.
    #[serde(default)]
    pub streams: Vec<StreamConfig>,
    /// Directory segment files are written into; created if absent.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Log file path; defaults to the XDG state dir when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Default segment length in seconds.
    #[serde(default = "default_segment_duration")]
    pub segment_duration: u64,
    /// When true, `strec run` prompts for a start time unless a flag
    /// already decided the schedule.
    #[serde(default)]
    pub schedule_enabled: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            streams: Vec::new(),
            output_dir: default_output_dir(),
            log_file: None,
            segment_duration: DEFAULT_SEGMENT_DURATION_SECS,
            schedule_enabled: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("strec")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RecorderConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RecorderConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<RecorderConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: RecorderConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &RecorderConfig) -> Result<()> {
    if cfg.segment_duration == 0 {
        bail!("segment_duration must be a positive number of seconds");
    }
    for stream in &cfg.streams {
        if stream.url.trim().is_empty() {
            bail!("stream entry with empty url");
        }
        if stream.segment_duration == Some(0) {
            bail!(
                "stream \"{}\" has a zero segment_duration",
                stream.display_name()
            );
        }
    }
    Ok(())
}
