//! Segment file naming: sanitized stream names, timestamped filenames.

use chrono::{DateTime, Local};
use url::Url;

/// Suffix the capture tool leaves on in-progress output files.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Extension of completed segment files.
pub const SEGMENT_EXT: &str = "mp4";

/// Longest stream-name stem we allow inside a segment filename. Keeps the
/// composed name (stem + timestamp + index + extension) well under NAME_MAX.
const STEM_MAX: usize = 96;

/// True for directory entries left behind by an interrupted capture.
pub fn is_partial_artifact(file_name: &str) -> bool {
    file_name.ends_with(PARTIAL_SUFFIX)
}

/// Reduces a stream name to filesystem-safe characters.
///
/// Keeps ASCII alphanumerics, `-`, `.` and `_`; everything else becomes `_`.
/// Consecutive underscores collapse, leading/trailing `.` and `_` are
/// trimmed, and the result is capped at [`STEM_MAX`] bytes. An empty result
/// falls back to `"stream"`.
pub fn sanitize_stream_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            out.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let capped = if trimmed.len() > STEM_MAX {
        let mut take = STEM_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        &trimmed[..take]
    } else {
        trimmed
    };

    if capped.is_empty() {
        "stream".to_string()
    } else {
        capped.to_string()
    }
}

/// Derives a stream name from its source URL: host plus the last non-empty
/// path segment, sanitized. Unparseable input is sanitized as-is.
pub fn stream_name_from_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return sanitize_stream_name(raw);
    };

    let host = url.host_str().unwrap_or("stream");
    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    match last_segment {
        Some(seg) => sanitize_stream_name(&format!("{}_{}", host, seg)),
        None => sanitize_stream_name(host),
    }
}

/// Composes the output filename for one segment attempt.
///
/// The attempt index disambiguates two attempts of the same stream landing
/// in the same clock second, so the name is unique per (stream, attempt).
pub fn segment_file_name(stream_name: &str, attempt_index: u64, timestamp: DateTime<Local>) -> String {
    format!(
        "{}_{}_seg{:05}.{}",
        stream_name,
        timestamp.format("%Y-%m-%d_%H-%M-%S"),
        attempt_index,
        SEGMENT_EXT,
    )
}

/// Makes a display name per job unique across the whole run by suffixing a
/// counter onto repeats. Duplicate stream entries are legal in the config;
/// two jobs must still never produce the same output filename.
pub fn uniquify_stream_names(names: Vec<String>) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                name
            } else {
                format!("{}-{}", name, count)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_stream_name("news 24/7 live!"), "news_24_7_live");
    }

    #[test]
    fn sanitize_collapses_and_trims() {
        assert_eq!(sanitize_stream_name("__a///b__"), "a_b");
        assert_eq!(sanitize_stream_name("..dots.."), "dots");
    }

    #[test]
    fn sanitize_empty_falls_back() {
        assert_eq!(sanitize_stream_name("///"), "stream");
        assert_eq!(sanitize_stream_name(""), "stream");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "x".repeat(400);
        assert_eq!(sanitize_stream_name(&long).len(), 96);
    }

    #[test]
    fn name_from_url_uses_host_and_last_segment() {
        assert_eq!(
            stream_name_from_url("https://www.example.com/live/channel1"),
            "www.example.com_channel1"
        );
        assert_eq!(stream_name_from_url("https://example.com/"), "example.com");
    }

    #[test]
    fn name_from_unparseable_url_is_sanitized() {
        assert_eq!(stream_name_from_url("not a url"), "not_a_url");
    }

    #[test]
    fn segment_names_differ_within_one_clock_tick() {
        let ts = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let a = segment_file_name("cam", 0, ts);
        let b = segment_file_name("cam", 1, ts);
        assert_ne!(a, b);
        assert_eq!(a, "cam_2025-03-14_09-26-53_seg00000.mp4");
        assert_eq!(b, "cam_2025-03-14_09-26-53_seg00001.mp4");
    }

    #[test]
    fn partial_detection() {
        assert!(is_partial_artifact("cam_2025-01-01_00-00-00_seg00000.mp4.part"));
        assert!(!is_partial_artifact("cam_2025-01-01_00-00-00_seg00000.mp4"));
    }

    #[test]
    fn uniquify_suffixes_repeats_only() {
        let names = vec!["cam".to_string(), "cam".to_string(), "news".to_string()];
        assert_eq!(uniquify_stream_names(names), vec!["cam", "cam-2", "news"]);
    }
}
