//! `strec streams` – show the configured streams.

use strec_core::config::RecorderConfig;

pub fn run_streams(cfg: &RecorderConfig) {
    if cfg.streams.is_empty() {
        println!(
            "No streams configured. Add [[streams]] entries to the config file."
        );
        return;
    }
    println!("{} configured stream(s):", cfg.streams.len());
    for stream in &cfg.streams {
        println!(
            "  {}  {}  quality={}  segment={}s",
            stream.display_name(),
            stream.url,
            stream.quality,
            stream.effective_segment_secs(cfg.segment_duration)
        );
    }
}
