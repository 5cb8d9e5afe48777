//! Data models for conversation logs.
//!
//! - [`LogEntry`] - One JSONL line of a conversation log, deserialized leniently
//! - [`ConversationRecord`] - Metadata derived from one log file
//! - [`MessagePreview`] - Display-truncated projection of an entry
//! - [`UploadResponse`] - Remote API response for an upload
//! - [`SortKey`] - Field the interactive selector orders records by

pub mod conversation;
pub mod entry;

pub use conversation::{ConversationRecord, MessagePreview, SortKey, UploadResponse};
pub use entry::{
    ContentBlock, ContentItem, ENTRY_TYPE_ASSISTANT, ENTRY_TYPE_SUMMARY, ENTRY_TYPE_THINKING,
    ENTRY_TYPE_USER, EntryMessage, LogEntry, MessageContent, Placeholders,
};
