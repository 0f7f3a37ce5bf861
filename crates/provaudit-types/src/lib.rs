//! Stable DTOs used across the provaudit workspace.
//!
//! This crate is intentionally boring:
//! - data types for the scan-result document and its audit trail
//! - normalized line-range specifiers
//! - structured purl references for hosting-provider deep links
//!
//! Nothing here does IO; loading and persistence live in `provaudit-store`.

#![forbid(unsafe_code)]

pub mod lines;
pub mod purl;
pub mod scan;

pub use lines::{LineRange, LineSpec};
pub use purl::{Provider, PurlRef};
pub use scan::{
    AuditDecision, AuditStatus, FileMatch, License, MatchKind, Outcome, ScanResult,
    first_valid_match, is_valid_file_url,
};
