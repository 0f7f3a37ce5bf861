//! Derived, disposable projections over a scan result.
//!
//! Everything in this crate is pure: indices and counts are rebuilt wholesale
//! from the store whenever the view or filter changes, and never own audit
//! state. The filter/view context is passed in explicitly; there is no shared
//! global state.

#![forbid(unsafe_code)]

pub mod filter;
pub mod listing;
pub mod ranking;
pub mod summary;
pub mod tree;

pub use filter::{count_files, path_in_directory, FilterMode, FilterState, ViewMode};
pub use listing::{directory_files, entry_files, matched_path_suffix, FileEntry};
pub use ranking::{ComponentRanking, RankEntry};
pub use summary::{audit_progress, AuditProgress, Summary};
pub use tree::{DirectoryNode, DirectoryTree, TreeRow, TreeState};
