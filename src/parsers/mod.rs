//! JSONL parsers for conversation log files
//!
//! # Error Handling Strategy
//!
//! Parsing follows a **graceful degradation** approach:
//!
//! - **Individual line failures**: Malformed JSON lines are logged at debug level and
//!   skipped. A bad line never aborts parsing of the rest of the file.
//!
//! - **Individual field failures**: Fields with an unexpected shape deserialize to `None`
//!   (see [`deserializers`]) so an otherwise valid entry still counts.
//!
//! - **Record-level failures**: A file with no qualifying entries or no session id yields
//!   no record at all rather than an empty one.

pub mod conversation;
pub mod deserializers;
pub mod stats;

pub use conversation::{
    build_record, count_matches, parse_conversation, parse_entries, preview_entries,
    project_label,
};
pub use stats::{active_duration, conversation_summary};
