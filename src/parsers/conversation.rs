use std::path::Path;

use tracing::debug;

use super::stats::{active_duration, conversation_summary};
use crate::models::{ConversationRecord, LogEntry, MessagePreview, Placeholders};

/// Preview content longer than this is cut to 197 characters plus `...`
const PREVIEW_MAX_CHARS: usize = 200;

/// Parse JSONL content into conversation entries.
///
/// Blank lines, malformed JSON, non-object lines, summaries and meta entries are skipped
/// individually; parsing always continues with the next line.
pub fn parse_entries(content: &str) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // LogEntry would also accept a JSON array as a sequence of fields
        if !line.starts_with('{') {
            debug!(line = line_num + 1, "skipping non-object log line");
            skipped += 1;
            continue;
        }

        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) if entry.is_administrative() => {}
            Ok(entry) => entries.push(entry),
            Err(e) => {
                debug!(line = line_num + 1, error = %e, "skipping malformed log line");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!(entries = entries.len(), skipped, "parsed conversation log");
    }

    entries
}

/// Build record metadata from parsed entries.
///
/// Returns `None` when there are no entries or no entry carries a session id.
pub fn build_record(location: &Path, entries: &[LogEntry]) -> Option<ConversationRecord> {
    if entries.is_empty() {
        return None;
    }

    let session_id = entries.iter().find_map(|e| e.session_id.clone().filter(|s| !s.is_empty()))?;

    let timestamps = entries.iter().filter_map(|e| e.timestamp);
    let first_event_time = timestamps.clone().min();
    let last_event_time = timestamps.max();

    Some(ConversationRecord {
        location: location.to_path_buf(),
        project_label: project_label(location),
        session_id,
        message_count: entries.len(),
        first_event_time,
        last_event_time,
        active_duration: Some(active_duration(entries)),
        summary_text: Some(conversation_summary(entries)),
        match_count: None,
    })
}

/// Parse raw file content into a record
pub fn parse_conversation(location: &Path, content: &str) -> Option<ConversationRecord> {
    build_record(location, &parse_entries(content))
}

/// Human-readable project label from the log file's parent directory name.
///
/// `-Users-alice-code-app/x.jsonl` becomes `code/app`.
pub fn project_label(location: &Path) -> String {
    let dir_name = location
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    strip_user_prefix(&dir_name).replace('-', "/")
}

/// Drop a leading `-Users-<name>-` home directory segment
fn strip_user_prefix(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix("-Users-")
        && let Some(pos) = rest.find('-')
        && pos > 0
    {
        return &rest[pos + 1..];
    }
    name
}

/// Project every entry into a display preview
pub fn preview_entries(entries: &[LogEntry]) -> Vec<MessagePreview> {
    entries.iter().map(preview_entry).collect()
}

fn preview_entry(entry: &LogEntry) -> MessagePreview {
    let mut content = entry.text(Placeholders::All);
    if content.chars().count() > PREVIEW_MAX_CHARS {
        content = content.chars().take(PREVIEW_MAX_CHARS - 3).collect::<String>() + "...";
    }

    let role = entry
        .message
        .as_ref()
        .and_then(|m| m.role.clone())
        .or_else(|| entry.entry_type.clone());

    MessagePreview {
        entry_type: entry.kind().to_string(),
        // Undated entries display with the current time
        timestamp: entry.timestamp.unwrap_or_else(chrono::Utc::now),
        content: content.trim().to_string(),
        role,
    }
}

/// Number of entries whose searchable text contains `needle` (already lowercased)
pub fn count_matches(entries: &[LogEntry], needle: &str) -> usize {
    entries
        .iter()
        .filter(|e| e.text(Placeholders::None).to_lowercase().contains(needle))
        .count()
}
