//! Derived statistics for a parsed conversation: summary line and active duration.

use crate::models::{LogEntry, Placeholders};

/// Summary length before ellipsis
const SUMMARY_MAX_CHARS: usize = 60;
/// Lower bound of the idle threshold, and its value when no samples exist
const MIN_IDLE_THRESHOLD_MS: i64 = 10 * 60 * 1000;
const IDLE_PERCENTILE: f64 = 0.95;

pub const EMPTY_SUMMARY: &str = "Empty conversation";

/// Summary from the first user-authored entry.
///
/// Whitespace is collapsed, the first 60 characters kept and capitalized, and `...`
/// appended if anything was cut. Falls back to "Empty conversation".
pub fn conversation_summary(entries: &[LogEntry]) -> String {
    let first_user = entries.iter().find(|e| e.is_user());

    if let Some(content) = first_user.and_then(|e| e.content()) {
        let text = collapse_whitespace(&content.flatten(Placeholders::Images, " "));
        if !text.is_empty() {
            let head: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
            let mut summary = capitalize(head.trim());
            if text.chars().count() > SUMMARY_MAX_CHARS {
                summary.push_str("...");
            }
            return summary;
        }
    }

    EMPTY_SUMMARY.to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Estimate engaged time in milliseconds.
///
/// Intervals ending in an assistant entry always count. Intervals ending in a user
/// entry count only below the idle threshold: the 95th percentile of assistant→user
/// gaps, never less than ten minutes.
pub fn active_duration(entries: &[LogEntry]) -> i64 {
    if entries.len() < 2 {
        return 0;
    }

    let mut sorted: Vec<&LogEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp.map(|t| t.timestamp_millis()).unwrap_or(0));

    let mut reply_gaps: Vec<i64> = sorted
        .windows(2)
        .filter(|pair| pair[0].is_assistant() && pair[1].is_user())
        .filter_map(|pair| interval(pair[0], pair[1]))
        .collect();

    let threshold = idle_threshold(&mut reply_gaps);

    sorted
        .windows(2)
        .filter_map(|pair| {
            let gap = interval(pair[0], pair[1])?;
            if pair[1].is_assistant() || (pair[1].is_user() && gap < threshold) {
                Some(gap)
            } else {
                None
            }
        })
        .sum()
}

fn interval(earlier: &LogEntry, later: &LogEntry) -> Option<i64> {
    let start = earlier.timestamp?;
    let end = later.timestamp?;
    Some((end - start).num_milliseconds())
}

fn idle_threshold(gaps: &mut [i64]) -> i64 {
    if gaps.is_empty() {
        return MIN_IDLE_THRESHOLD_MS;
    }
    gaps.sort_unstable();
    let last = gaps[gaps.len() - 1];
    let index = (gaps.len() as f64 * IDLE_PERCENTILE).floor() as usize;
    // Out-of-range or zero percentile values fall back to the largest gap
    let percentile = gaps.get(index).copied().filter(|gap| *gap != 0).unwrap_or(last);
    percentile.max(MIN_IDLE_THRESHOLD_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: &str, millis: i64) -> LogEntry {
        serde_json::from_str(&format!(
            r#"{{"type":"{}","sessionId":"s","timestamp":{},"message":{{"content":"x"}}}}"#,
            kind,
            // Stay above the seconds/milliseconds threshold
            1_700_000_000_000_i64 + millis
        ))
        .unwrap()
    }

    fn user_text(text: &str) -> LogEntry {
        serde_json::from_value(serde_json::json!({
            "type": "user",
            "message": {"content": text}
        }))
        .unwrap()
    }

    #[test]
    fn test_active_duration_short_reply_counts() {
        let entries = vec![entry("user", 0), entry("assistant", 60_000), entry("user", 70_000)];
        assert_eq!(active_duration(&entries), 70_000);
    }

    #[test]
    fn test_active_duration_long_idle_excluded() {
        let entries = vec![
            entry("user", 0),
            entry("assistant", 30_000),
            entry("user", 30_000 + 3_600_000),
            entry("assistant", 30_000 + 3_600_000 + 5_000),
        ];
        // Only gap sample is one hour, so the threshold is one hour and the gap is not below it
        assert_eq!(active_duration(&entries), 35_000);
    }

    #[test]
    fn test_active_duration_sorts_by_time() {
        let entries = vec![entry("user", 70_000), entry("user", 0), entry("assistant", 60_000)];
        assert_eq!(active_duration(&entries), 70_000);
    }

    #[test]
    fn test_active_duration_other_types_not_counted() {
        let entries = vec![entry("user", 0), entry("tool", 1_000), entry("assistant", 3_000)];
        assert_eq!(active_duration(&entries), 2_000);
    }

    #[test]
    fn test_active_duration_needs_two_entries() {
        assert_eq!(active_duration(&[entry("user", 0)]), 0);
        assert_eq!(active_duration(&[]), 0);
    }

    #[test]
    fn test_idle_threshold_floor() {
        assert_eq!(idle_threshold(&mut []), MIN_IDLE_THRESHOLD_MS);
        assert_eq!(idle_threshold(&mut [10_000]), MIN_IDLE_THRESHOLD_MS);
    }

    #[test]
    fn test_idle_threshold_percentile() {
        let mut gaps: Vec<i64> = (1..=20).map(|m| m * 60_000).collect();
        // floor(20 * 0.95) = 19 -> the largest value
        assert_eq!(idle_threshold(&mut gaps), 20 * 60_000);

        let mut gaps: Vec<i64> = (1..=40).map(|m| m * 60_000).collect();
        // floor(40 * 0.95) = 38 -> 39 minutes
        assert_eq!(idle_threshold(&mut gaps), 39 * 60_000);
    }

    #[test]
    fn test_idle_threshold_zero_percentile_uses_largest() {
        let mut gaps = vec![0; 20];
        gaps.push(30 * 60_000);
        assert_eq!(idle_threshold(&mut gaps), 30 * 60_000);
    }

    #[test]
    fn test_summary_truncates_and_capitalizes() {
        let long = "fix the   parser so that it handles very long lines without crashing at all";
        let summary = conversation_summary(&[user_text(long)]);
        assert!(summary.starts_with("Fix the parser"));
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 63);
    }

    #[test]
    fn test_summary_short_text() {
        assert_eq!(conversation_summary(&[user_text("hello")]), "Hello");
    }

    #[test]
    fn test_summary_without_user_entry() {
        let entries = vec![entry("assistant", 0)];
        assert_eq!(conversation_summary(&entries), EMPTY_SUMMARY);
    }

    #[test]
    fn test_summary_image_only() {
        let e: LogEntry = serde_json::from_str(
            r#"{"type":"user","message":{"content":[{"type":"image","source":{}}]}}"#,
        )
        .unwrap();
        assert_eq!(conversation_summary(&[e]), "[Image]");
    }
}
