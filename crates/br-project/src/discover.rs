//! Locating model files on disk.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively search `root` for a regular file named exactly `file_name`.
///
/// Entries are visited in file-name order so the first hit is deterministic
/// when several copies exist. Unreadable directories are skipped.
pub fn find_file(root: &Path, file_name: &str) -> Option<PathBuf> {
    let found = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.into_path());

    match &found {
        Some(path) => tracing::debug!(path = %path.display(), "located model file"),
        None => tracing::debug!(root = %root.display(), file_name, "model file not found"),
    }
    found
}
