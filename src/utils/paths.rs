use std::borrow::Cow;
use std::env;
use std::path::{Component, Path};

/// Encodes a working directory into the log store's project directory name
///
/// Every normal path segment is joined with `-` and the result prefixed with `-`.
/// The mapping is deterministic, so the current directory always finds its own logs.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use runlog::encode_path;
///
/// let path = PathBuf::from("/Users/foo/projects/runlog");
/// assert_eq!(encode_path(&path), "-Users-foo-projects-runlog");
/// ```
pub fn encode_path(path: &Path) -> String {
    let segments: Vec<Cow<'_, str>> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect();

    format!("-{}", segments.join("-"))
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use runlog::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/Documents");
/// // Returns "~/Documents" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
