//! Local conversation store
//!
//! # Error Handling Strategy
//!
//! - **Root-level failures**: a missing log root is [`StoreError::NotFound`] and reaches
//!   the caller. Nothing can be listed without it.
//!
//! - **File-level failures**: unreadable files are logged at `warn` and left out of the
//!   listing. One bad file never hides the rest of the project.
//!
//! - **Line-level failures**: delegated to [`crate::parsers`], which skips malformed and
//!   administrative lines individually.

pub mod discovery;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::{ConversationRecord, LogEntry, MessagePreview, SortKey};
use crate::parsers::{build_record, count_matches, parse_entries, preview_entries};

pub use discovery::{conversation_files, project_dir};

/// Read access to conversation records for one working directory
pub trait ConversationStore {
    /// All records of the project, newest first
    fn list_conversations(&self, working_dir: &Path) -> Result<Vec<ConversationRecord>, StoreError>;

    /// Records containing `term` (case-insensitive), most matches first
    ///
    /// A blank term returns the unfiltered listing.
    fn search(&self, term: &str, working_dir: &Path) -> Result<Vec<ConversationRecord>, StoreError>;

    /// Up to `count` previews of the record at `location`, starting at `offset`
    ///
    /// Out-of-range offsets and unreadable files yield an empty list.
    fn get_messages(&self, location: &Path, offset: usize, count: usize) -> Vec<MessagePreview>;
}

/// Store backed by the `.jsonl` files under a log root directory
#[derive(Debug, Clone)]
pub struct FsConversationStore {
    root: PathBuf,
}

impl FsConversationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw file content of a record, as uploaded or exported
    pub fn read_content(&self, location: &Path) -> Result<String, StoreError> {
        fs::read_to_string(location).map_err(|e| StoreError::io(location, e))
    }

    /// Parse every readable log file of the project
    fn load_entries(&self, working_dir: &Path) -> Result<Vec<(PathBuf, Vec<LogEntry>)>, StoreError> {
        let files = conversation_files(&self.root, working_dir)?;
        let mut loaded = Vec::with_capacity(files.len());

        for file in files {
            match fs::read_to_string(&file) {
                Ok(content) => loaded.push((file, parse_entries(&content))),
                Err(e) => warn!(file = %file.display(), error = %e, "skipping unreadable log file"),
            }
        }

        Ok(loaded)
    }
}

impl ConversationStore for FsConversationStore {
    fn list_conversations(&self, working_dir: &Path) -> Result<Vec<ConversationRecord>, StoreError> {
        let mut records: Vec<ConversationRecord> = self
            .load_entries(working_dir)?
            .iter()
            .filter_map(|(file, entries)| {
                let record = build_record(file, entries);
                if record.is_none() {
                    debug!(file = %file.display(), "no conversation in log file");
                }
                record
            })
            .collect();

        ConversationRecord::sort_by_key(&mut records, SortKey::LastEventTime, true);
        Ok(records)
    }

    fn search(&self, term: &str, working_dir: &Path) -> Result<Vec<ConversationRecord>, StoreError> {
        if term.trim().is_empty() {
            return self.list_conversations(working_dir);
        }
        let needle = term.to_lowercase();

        let mut results: Vec<ConversationRecord> = self
            .load_entries(working_dir)?
            .iter()
            .filter_map(|(file, entries)| {
                let matches = count_matches(entries, &needle);
                if matches == 0 {
                    return None;
                }
                let mut record = build_record(file, entries)?;
                record.match_count = Some(matches);
                Some(record)
            })
            .collect();

        results.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then_with(|| b.last_event_millis().cmp(&a.last_event_millis()))
        });
        debug!(term, results = results.len(), "search complete");

        Ok(results)
    }

    fn get_messages(&self, location: &Path, offset: usize, count: usize) -> Vec<MessagePreview> {
        let content = match fs::read_to_string(location) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %location.display(), error = %e, "failed to read messages");
                return Vec::new();
            }
        };

        let entries = parse_entries(&content);
        if offset >= entries.len() {
            return Vec::new();
        }
        let end = offset.saturating_add(count).min(entries.len());
        preview_entries(&entries[offset..end])
    }
}
