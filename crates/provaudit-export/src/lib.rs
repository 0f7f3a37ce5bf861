//! CSV report engine.
//!
//! Walks the scan result and writes one row per path, resolving purl
//! references into hosting-provider deep links. Remote lookups go through the
//! [`BranchResolver`] seam with a per-export cache and degrade to a fixed
//! fallback revision; only destination IO failures abort an export.

#![forbid(unsafe_code)]

mod links;
mod report;

use camino::Utf8PathBuf;

pub use links::{
    match_deep_links, BranchCache, BranchLookupError, BranchResolver, DeepLinkBuilder,
    FixedBranch, GithubLinks, FALLBACK_REVISION,
};
pub use report::{max_range_columns, write_report, CancelToken, ExportProgress, ExportSummary};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("create {path}: {source}")]
    Create {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write report: {0}")]
    Write(#[from] csv::Error),

    #[error("write {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("an export is already running")]
    AlreadyRunning,

    #[error("export cancelled")]
    Cancelled,

    #[error("export worker terminated abnormally")]
    Worker,
}
