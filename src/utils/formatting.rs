use chrono::{DateTime, Utc};

use crate::models::ConversationRecord;
use crate::utils::terminal::strip_ansi_codes;

const PROJECT_NAME_MAX_CHARS: usize = 40;

/// Format a timestamp relative to now:
/// - Relative for <7 days: "5 minutes ago", "1 day ago"
/// - Absolute for ≥7 days: "Jan 15, 2025"
pub fn format_date(timestamp: Option<DateTime<Utc>>) -> String {
    format_date_at(timestamp, Utc::now())
}

pub(crate) fn format_date_at(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "Unknown".to_string();
    };

    let seconds = now.signed_duration_since(timestamp).num_seconds();
    let minutes = seconds.div_euclid(60);
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);

    if seconds < 60 {
        plural(seconds, "second")
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 { format!("{} {} ago", n, unit) } else { format!("{} {}s ago", n, unit) }
}

/// Format a millisecond duration: "2d 3h", "1h 5m", "12m" or "< 1m"
pub fn format_duration(millis: i64) -> String {
    let minutes = millis / 1000 / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        "< 1m".to_string()
    }
}

/// Truncate long project names to 37 characters plus `...`
pub fn format_project_name(name: &str) -> String {
    if name.chars().count() > PROJECT_NAME_MAX_CHARS {
        let head: String = name.chars().take(PROJECT_NAME_MAX_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// First six characters of a session id with dashes removed
pub fn short_session_id(session_id: &str) -> String {
    session_id.chars().filter(|c| *c != '-').take(6).collect()
}

/// One-line description of a record with its summary indented underneath
pub fn format_conversation_line(record: &ConversationRecord) -> String {
    let mut parts = vec![
        short_session_id(&record.session_id),
        format_date(record.last_event_time),
        format!("{} messages", record.message_count),
    ];

    if let Some(matches) = record.match_count {
        parts.push(format!("{} matches", matches));
    }
    if let Some(active) = record.active_duration
        && active > 0
    {
        parts.push(format!("{} active", format_duration(active)));
    }

    let main_line = parts.join(" - ");
    match record.summary_text.as_deref().filter(|s| !s.is_empty()) {
        Some(summary) => format!("{}\n  {}", main_line, strip_ansi_codes(summary)),
        None => main_line,
    }
}
