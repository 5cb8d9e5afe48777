//! Runtime configuration from environment variables and the persisted client id.
//!
//! Loading configuration never touches the filesystem. The client id is read or
//! generated only when a remote command asks for it, and only inside an existing
//! log root.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::ConfigError;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.runlog.io";
pub const API_ENDPOINT_VAR: &str = "RUNLOG_API_ENDPOINT";
pub const CLAUDE_DIR_VAR: &str = "CLAUDE_DIR";
pub const CLIENT_ID_FILENAME: &str = "client_id.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_endpoint: String,
    /// Root of the conversation logs (`~/.claude/projects` by default)
    pub claude_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Load configuration using `lookup` to read variables
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_endpoint = lookup(API_ENDPOINT_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let claude_dir = match lookup(CLAUDE_DIR_VAR).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_claude_dir(lookup("HOME"))?,
        };

        Ok(Self { api_endpoint, claude_dir })
    }

    /// Per-installation identity sent with every remote request
    pub fn client_id(&self) -> Result<String, ConfigError> {
        load_or_create_client_id(&self.claude_dir)
    }
}

fn default_claude_dir(home: Option<String>) -> Result<PathBuf, ConfigError> {
    let home = home
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(ConfigError::HomeNotSet)?;
    Ok(home.join(".claude").join("projects"))
}

/// Read the client id stored under `claude_dir`, generating and saving one if absent
///
/// A missing `claude_dir` is an error; it is never created here.
pub fn load_or_create_client_id(claude_dir: &Path) -> Result<String, ConfigError> {
    if !claude_dir.is_dir() {
        return Err(ConfigError::ClaudeDirMissing { path: claude_dir.to_path_buf() });
    }
    let path = claude_dir.join(CLIENT_ID_FILENAME);

    if path.exists() {
        let stored = fs::read_to_string(&path).map_err(|source| ConfigError::ClientId {
            action: "read",
            path: path.clone(),
            source,
        })?;
        let trimmed = stored.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let client_id = Uuid::new_v4().to_string();
    fs::write(&path, &client_id).map_err(|source| ConfigError::ClientId {
        action: "write",
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "generated new client id");

    Ok(client_id)
}
