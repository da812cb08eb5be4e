//! Date and time normalization shared by the carrier parsers
//!
//! Recognized source formats, in priority order: `M月D日`, `YYYY/M/D`, `M/D`.
//! Everything normalizes to "M/D"; the year is dropped because deliveries
//! are assumed to be current-year. Text with no recognizable date yields an
//! empty string, which discards the entry upstream.

use regex::Regex;
use std::sync::OnceLock;

fn date_jp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})月(\d{1,2})日").expect("valid regex pattern"))
}

fn date_ymd() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})/(\d{1,2})/(\d{1,2})").expect("valid regex pattern"))
}

fn date_md() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})/(\d{1,2})").expect("valid regex pattern"))
}

fn time_hm() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid regex pattern"))
}

/// Normalize the first recognized date in `text` to "M/D".
/// Returns an empty string when no pattern matches.
pub fn normalize_date(text: &str) -> String {
    if let Some(captures) = date_jp().captures(text) {
        return format!("{}/{}", &captures[1], &captures[2]);
    }
    if let Some(captures) = date_ymd().captures(text) {
        return format!("{}/{}", &captures[2], &captures[3]);
    }
    if let Some(captures) = date_md().captures(text) {
        return format!("{}/{}", &captures[1], &captures[2]);
    }
    String::new()
}

/// First "H:MM" / "HH:MM" time in `text`, if any.
pub fn find_time(text: &str) -> Option<String> {
    time_hm().find(text).map(|m| m.as_str().to_string())
}
