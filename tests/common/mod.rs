//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use runlog::encode_path;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const SESSION_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Builder for a temporary Claude projects directory
pub struct ProjectsDirBuilder {
    temp_dir: TempDir,
}

impl ProjectsDirBuilder {
    /// Create a new builder with an empty projects directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the projects directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add the log directory for `working_dir` with the given files
    pub fn with_project(self, working_dir: &Path, files: &[LogFileBuilder]) -> Self {
        let project_dir = self.temp_dir.path().join(encode_path(working_dir));
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        for file in files {
            file.create_in(&project_dir);
        }

        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ProjectsDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `.jsonl` conversation log
pub struct LogFileBuilder {
    filename: String,
    lines: Vec<String>,
}

impl LogFileBuilder {
    pub fn new(filename: &str) -> Self {
        Self { filename: filename.to_string(), lines: Vec::new() }
    }

    pub fn with_entry(mut self, entry: EntryBuilder) -> Self {
        self.lines.push(entry.to_json());
        self
    }

    /// Add a raw line, valid JSON or not
    pub fn with_raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Create the file in the given directory and return its path
    pub fn create_in(&self, dir: &Path) -> PathBuf {
        let file_path = dir.join(&self.filename);
        fs::write(&file_path, self.lines.join("\n")).expect("Failed to write log file");
        file_path
    }
}

/// Builder for conversation log entries
pub struct EntryBuilder {
    entry_type: String,
    content: Value,
    timestamp: String,
    session_id: String,
}

impl EntryBuilder {
    /// A user message
    pub fn user(text: &str) -> Self {
        Self {
            entry_type: "user".to_string(),
            content: json!(text),
            timestamp: "2025-01-15T10:00:00Z".to_string(),
            session_id: SESSION_ID.to_string(),
        }
    }

    /// An assistant message with a single text block
    pub fn assistant(text: &str) -> Self {
        Self {
            entry_type: "assistant".to_string(),
            content: json!([{ "type": "text", "text": text }]),
            timestamp: "2025-01-15T10:00:05Z".to_string(),
            session_id: SESSION_ID.to_string(),
        }
    }

    /// A summary line, which is never counted as a message
    pub fn summary(text: &str) -> Self {
        Self {
            entry_type: "summary".to_string(),
            content: json!(text),
            timestamp: String::new(),
            session_id: String::new(),
        }
    }

    /// Replace the content with explicit content blocks
    pub fn blocks(mut self, blocks: Value) -> Self {
        self.content = blocks;
        self
    }

    /// Set the RFC3339 timestamp
    pub fn at(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn session(mut self, session_id: &str) -> Self {
        self.session_id = session_id.to_string();
        self
    }

    pub fn to_json(&self) -> String {
        if self.entry_type == "summary" {
            return json!({ "type": "summary", "summary": self.content }).to_string();
        }

        json!({
            "type": self.entry_type,
            "sessionId": self.session_id,
            "timestamp": self.timestamp,
            "message": { "role": self.entry_type, "content": self.content },
        })
        .to_string()
    }
}

/// Image block as Claude Code writes it for pasted screenshots
pub fn image_block() -> Value {
    json!({
        "type": "image",
        "source": { "type": "base64", "media_type": "image/png", "data": "iVBORw0KGgo=" }
    })
}

/// Projects directory with one working directory holding two conversations
pub fn sample_projects_dir(working_dir: &Path) -> TempDir {
    ProjectsDirBuilder::new()
        .with_project(
            working_dir,
            &[
                LogFileBuilder::new("older.jsonl")
                    .with_entry(
                        EntryBuilder::user("How do I parse JSON in Rust?")
                            .session("11111111-1111-1111-1111-111111111111")
                            .at("2025-01-10T09:00:00Z"),
                    )
                    .with_entry(
                        EntryBuilder::assistant("Use serde_json to parse JSON.")
                            .session("11111111-1111-1111-1111-111111111111")
                            .at("2025-01-10T09:01:00Z"),
                    ),
                LogFileBuilder::new("newer.jsonl")
                    .with_entry(EntryBuilder::summary("Fixing the build"))
                    .with_entry(
                        EntryBuilder::user("The build fails with a linker error")
                            .session("22222222-2222-2222-2222-222222222222")
                            .at("2025-01-12T14:00:00Z"),
                    )
                    .with_entry(
                        EntryBuilder::assistant("Check the linker error output first.")
                            .session("22222222-2222-2222-2222-222222222222")
                            .at("2025-01-12T14:02:00Z"),
                    )
                    .with_entry(
                        EntryBuilder::user("It mentions JSON again")
                            .session("22222222-2222-2222-2222-222222222222")
                            .at("2025-01-12T14:05:00Z"),
                    ),
            ],
        )
        .build()
}
