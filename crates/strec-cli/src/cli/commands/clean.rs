//! `strec clean` – run the partial-file reaper once.

use anyhow::Result;
use std::path::PathBuf;

use strec_core::config::RecorderConfig;
use strec_core::reaper;

pub fn run_clean(cfg: &RecorderConfig, output_dir: Option<PathBuf>) -> Result<()> {
    let dir = output_dir.unwrap_or_else(|| cfg.output_dir.clone());
    let removed = reaper::clean_partial_files(&dir)?;
    println!("Removed {} partial file(s) from {}", removed, dir.display());
    Ok(())
}
