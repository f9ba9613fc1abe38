//! Presentation helpers shared by every listing view.

use crate::models::Resolution;
use regex::Regex;
use std::sync::OnceLock;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

const MEDIUM_IMAGE_WIDTH: u32 = 640;
const MAX_SLUG_LENGTH: usize = 70;

/// Formats a unix timestamp relative to the current time, e.g. `"5m ago"`.
pub fn format_time_ago(unix_seconds: i64) -> String {
    format_time_ago_at(unix_seconds, chrono::Utc::now().timestamp())
}

/// Same as [`format_time_ago`] with an explicit `now`. Timestamps in the
/// future read as `"just now"`.
pub fn format_time_ago_at(unix_seconds: i64, now: i64) -> String {
    let elapsed = now.saturating_sub(unix_seconds);

    if elapsed < MINUTE {
        "just now".to_string()
    } else if elapsed < HOUR {
        format!("{}m ago", elapsed / MINUTE)
    } else if elapsed < DAY {
        format!("{}h ago", elapsed / HOUR)
    } else if elapsed < MONTH {
        format!("{}d ago", elapsed / DAY)
    } else if elapsed < YEAR {
        format!("{}mo ago", elapsed / MONTH)
    } else {
        format!("{}y ago", elapsed / YEAR)
    }
}

/// Picks the 640px-wide rendition, falling back to the last (largest) one.
pub fn get_medium_image(resolutions: Option<&[Resolution]>) -> Option<&Resolution> {
    let resolutions = resolutions?;
    resolutions
        .iter()
        .find(|r| r.width == MEDIUM_IMAGE_WIDTH)
        .or_else(|| resolutions.last())
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\s-]+").expect("separator pattern is valid"))
}

fn non_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("non-word pattern is valid"))
}

/// URL slug for a post title: lowercase, underscores between words, at most
/// 70 characters.
pub fn generate_post_slug(title: Option<&str>) -> String {
    let Some(title) = title else {
        return String::new();
    };

    let lowered = title.to_lowercase();
    let underscored = separator_pattern().replace_all(&lowered, "_");
    let cleaned = non_word_pattern().replace_all(&underscored, "");
    // Only ASCII survives the filter, so byte and char lengths agree.
    let trimmed = cleaned.trim_matches('_');
    let truncated = &trimmed[..trimmed.len().min(MAX_SLUG_LENGTH)];
    truncated.trim_end_matches('_').to_string()
}
