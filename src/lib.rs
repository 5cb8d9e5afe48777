//! runlog - upload and export Claude Code conversation logs
//!
//! Claude Code stores every conversation as a JSONL file under
//! `~/.claude/projects/<encoded working directory>/`. This library provides:
//!
//! - Discovering and parsing the conversation logs of one working directory
//! - An interactive terminal selector with search and message preview
//! - Uploading a sanitized log to a remote sharing service, and deleting it again
//! - Exporting a conversation to a self-contained HTML page
//!
//! # Example
//!
//! ```no_run
//! use runlog::{ConversationStore, FsConversationStore};
//! use std::path::PathBuf;
//!
//! let store = FsConversationStore::new(PathBuf::from("/Users/alice/.claude/projects"));
//! let records = store.list_conversations(&PathBuf::from("/Users/alice/code/app"))?;
//! println!("Found {} conversations", records.len());
//! # Ok::<(), runlog::error::StoreError>(())
//! ```

pub mod cli;
pub mod error;
pub mod export;
pub mod models;
pub mod parsers;
pub mod remote;
pub mod store;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use models::{ConversationRecord, MessagePreview, SortKey, UploadResponse};
pub use parsers::parse_conversation;
pub use remote::{RemoteClient, sanitize_images, share_url};
pub use store::{ConversationStore, FsConversationStore};
pub use utils::environment::Config;
pub use utils::paths::{encode_path, format_path_with_tilde};
