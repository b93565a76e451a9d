//! br-scan: find files whose fixed line holds a backslash inside an f-string.
//!
//! The tree is walked in file-name order; every file named exactly
//! [`LineQuery::file_name`] is read and its [`LineQuery::line_number`]-th
//! line (1-based) is checked for an `f"` or `f'` marker and a `\`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

pub const DEFAULT_FILE_NAME: &str = "_chemicals.py";
pub const DEFAULT_LINE_NUMBER: usize = 389;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Search root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Line numbers start at 1")]
    ZeroLine,
}

pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineQuery {
    pub file_name: String,
    /// 1-based.
    pub line_number: usize,
}

impl Default for LineQuery {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            line_number: DEFAULT_LINE_NUMBER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    pub path: PathBuf,
    pub line_number: usize,
    pub line: String,
}

/// True for a line carrying an f-string opener and a backslash.
pub fn is_suspect_line(line: &str) -> bool {
    (line.contains("f\"") || line.contains("f'")) && line.contains('\\')
}

/// All matches under `root`, in walk order.
pub fn scan(root: &Path, query: &LineQuery) -> ScanResult<Vec<LineMatch>> {
    Ok(matches(root, query)?.collect())
}

/// The first match under `root`; the walk stops there.
pub fn find_first(root: &Path, query: &LineQuery) -> ScanResult<Option<LineMatch>> {
    Ok(matches(root, query)?.next())
}

fn matches<'q>(
    root: &Path,
    query: &'q LineQuery,
) -> ScanResult<impl Iterator<Item = LineMatch> + 'q> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    if query.line_number == 0 {
        return Err(ScanError::ZeroLine);
    }

    Ok(WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(move |entry| {
            entry.file_type().is_file() && entry.file_name() == query.file_name.as_str()
        })
        .filter_map(move |entry| check_file(entry.path(), query.line_number)))
}

fn check_file(path: &Path, line_number: usize) -> Option<LineMatch> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %path.display(), %err, "skipping unreadable file");
            return None;
        }
    };
    let line = content.lines().nth(line_number - 1)?;
    is_suspect_line(line).then(|| LineMatch {
        path: path.to_path_buf(),
        line_number,
        line: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_needs_both_markers() {
        assert!(is_suspect_line(r#"    name = f"{a}\n{b}""#));
        assert!(is_suspect_line(r"    name = f'{a}\t'"));
        assert!(!is_suspect_line(r#"    name = f"{a}""#));
        assert!(!is_suspect_line(r#"    path = "C:\\dir""#));
    }

    #[test]
    fn default_query_targets_chemicals_module() {
        let query = LineQuery::default();
        assert_eq!(query.file_name, "_chemicals.py");
        assert_eq!(query.line_number, 389);
    }
}
