use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::StoreError;
use crate::utils::encode_path;

/// Maximum number of log files read for one project (prevents resource exhaustion)
pub const MAX_CONVERSATION_FILES: usize = 10_000;

/// Find the `.jsonl` log files belonging to `working_dir` under the store `root`
///
/// Only the project directory whose name equals [`encode_path`] of the working
/// directory is scanned, one level deep. Files are returned in name order.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when `root` does not exist. A missing project
/// directory is not an error and yields an empty list.
///
/// Symlinked files are skipped with a warning, as are entries that cannot be read.
pub fn conversation_files(root: &Path, working_dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !root.exists() {
        return Err(StoreError::NotFound { path: root.to_path_buf() });
    }
    if !root.is_dir() {
        return Err(StoreError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let project_dir = project_dir(root, working_dir);
    if !project_dir.is_dir() {
        debug!(dir = %project_dir.display(), "no project directory for working directory");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&project_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %project_dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "jsonl") {
            continue;
        }
        if entry.path_is_symlink() {
            warn!(file = %path.display(), "skipping log file (symlink not allowed)");
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        if files.len() >= MAX_CONVERSATION_FILES {
            warn!(
                dir = %project_dir.display(),
                limit = MAX_CONVERSATION_FILES,
                "too many log files, ignoring the rest"
            );
            break;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// The store directory holding logs for `working_dir`
pub fn project_dir(root: &Path, working_dir: &Path) -> PathBuf {
    root.join(encode_path(working_dir))
}
