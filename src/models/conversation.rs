use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one conversation log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationRecord {
    pub location: PathBuf,
    pub project_label: String,
    pub session_id: String,
    pub message_count: usize,
    pub first_event_time: Option<DateTime<Utc>>,
    pub last_event_time: Option<DateTime<Utc>>,
    /// Engaged time in milliseconds
    pub active_duration: Option<i64>,
    pub summary_text: Option<String>,
    /// Number of matching entries, set only on search results
    pub match_count: Option<usize>,
}

/// Display projection of a single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePreview {
    pub entry_type: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub role: Option<String>,
}

/// Successful upload response from the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    pub message: String,
}

/// Field the selector sorts by. Cycles in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    LastEventTime,
    MessageCount,
    ActiveDuration,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::LastEventTime => SortKey::MessageCount,
            SortKey::MessageCount => SortKey::ActiveDuration,
            SortKey::ActiveDuration => SortKey::LastEventTime,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::LastEventTime => "Last Message Time",
            SortKey::MessageCount => "Message Count",
            SortKey::ActiveDuration => "Active Time",
        }
    }
}

impl ConversationRecord {
    /// Last event time in milliseconds, with missing times ordered earliest
    pub fn last_event_millis(&self) -> i64 {
        self.last_event_time.map(|t| t.timestamp_millis()).unwrap_or(0)
    }

    /// Sort a slice of records in place by `key`
    pub fn sort_by_key(records: &mut [ConversationRecord], key: SortKey, descending: bool) {
        records.sort_by(|a, b| {
            let ordering = match key {
                SortKey::LastEventTime => b.last_event_millis().cmp(&a.last_event_millis()),
                SortKey::MessageCount => b.message_count.cmp(&a.message_count),
                SortKey::ActiveDuration => {
                    b.active_duration.unwrap_or(0).cmp(&a.active_duration.unwrap_or(0))
                }
            };
            if descending { ordering } else { ordering.reverse() }
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(name: &str, last: i64, messages: usize, active: i64) -> ConversationRecord {
        ConversationRecord {
            location: PathBuf::from(format!("/logs/{}.jsonl", name)),
            project_label: "project".to_string(),
            session_id: name.to_string(),
            message_count: messages,
            first_event_time: None,
            last_event_time: Some(Utc.timestamp_opt(last, 0).unwrap()),
            active_duration: Some(active),
            summary_text: None,
            match_count: None,
        }
    }

    fn ids(records: &[ConversationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.session_id.as_str()).collect()
    }

    #[test]
    fn test_sort_key_cycles() {
        let key = SortKey::default();
        assert_eq!(key, SortKey::LastEventTime);
        assert_eq!(key.next(), SortKey::MessageCount);
        assert_eq!(key.next().next(), SortKey::ActiveDuration);
        assert_eq!(key.next().next().next(), SortKey::LastEventTime);
    }

    #[test]
    fn test_sort_by_each_key() {
        let mut records = vec![record("a", 100, 5, 30), record("b", 300, 1, 10), record("c", 200, 9, 20)];

        ConversationRecord::sort_by_key(&mut records, SortKey::LastEventTime, true);
        assert_eq!(ids(&records), ["b", "c", "a"]);

        ConversationRecord::sort_by_key(&mut records, SortKey::MessageCount, true);
        assert_eq!(ids(&records), ["c", "a", "b"]);

        ConversationRecord::sort_by_key(&mut records, SortKey::ActiveDuration, false);
        assert_eq!(ids(&records), ["b", "c", "a"]);
    }

    #[test]
    fn test_missing_time_sorts_earliest() {
        let mut undated = record("none", 0, 1, 0);
        undated.last_event_time = None;
        let mut records = vec![undated, record("dated", 50, 1, 0)];

        ConversationRecord::sort_by_key(&mut records, SortKey::LastEventTime, true);
        assert_eq!(ids(&records), ["dated", "none"]);
    }
}
