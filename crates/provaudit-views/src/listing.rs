//! File listings for the currently selected directory or ranking entry.

use crate::filter::{path_in_directory, FilterMode};
use provaudit_types::{first_valid_match, AuditStatus, ScanResult};

/// One file row with its derived status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    /// `None` when the path has no valid match.
    pub status: Option<AuditStatus>,
}

impl FileEntry {
    /// Status marker shown next to the path: `?` pending, `✓` accepted,
    /// `✗` ignored, `-` no auditable match.
    pub fn marker(&self) -> char {
        match self.status {
            None => '-',
            Some(AuditStatus::Pending) => '?',
            Some(AuditStatus::Accepted) => '✓',
            Some(AuditStatus::Ignored) => '✗',
        }
    }
}

fn entry_for(result: &ScanResult, path: &str) -> FileEntry {
    let status = result
        .files
        .get(path)
        .and_then(|matches| first_valid_match(matches))
        .map(|m| m.audit_status());
    FileEntry {
        path: path.to_string(),
        status,
    }
}

/// Files under a directory node, filtered and sorted by path.
pub fn directory_files(result: &ScanResult, dir_path: &str, mode: FilterMode) -> Vec<FileEntry> {
    result
        .files
        .iter()
        .filter(|(path, _)| path_in_directory(dir_path, path))
        .filter(|(_, matches)| mode.admits(matches))
        .map(|(path, _)| entry_for(result, path))
        .collect()
}

/// Files of a ranking entry, filtered, keeping the entry's order.
pub fn entry_files(result: &ScanResult, files: &[String], mode: FilterMode) -> Vec<FileEntry> {
    files
        .iter()
        .filter(|path| {
            result
                .files
                .get(path.as_str())
                .is_some_and(|matches| mode.admits(matches))
        })
        .map(|path| entry_for(result, path))
        .collect()
}

/// Longest common path-component suffix between the scanned path and the
/// upstream match path; `None` when the final components already differ.
pub fn matched_path_suffix(local: &str, upstream: &str) -> Option<String> {
    let local_parts: Vec<&str> = local.split('/').collect();
    let upstream_parts: Vec<&str> = upstream.split('/').collect();

    let common: Vec<&str> = local_parts
        .iter()
        .rev()
        .zip(upstream_parts.iter().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| *a)
        .collect();

    if common.is_empty() {
        return None;
    }
    Some(common.into_iter().rev().collect::<Vec<_>>().join("/"))
}
