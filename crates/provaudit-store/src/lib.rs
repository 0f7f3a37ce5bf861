//! Scan-result store: load the result document, append audit decisions, and
//! persist the whole document back in place.
//!
//! This crate is allowed to do filesystem IO. It is the single source of
//! truth for audit state: views and exports read from it, but only
//! [`ScanStore::record_decision`] mutates a match.

#![forbid(unsafe_code)]

mod error;

use camino::{Utf8Path, Utf8PathBuf};
use provaudit_types::{AuditDecision, Outcome, ScanResult};
use time::OffsetDateTime;

pub use error::{AuditError, LoadError, PersistError};

/// Owns the parsed scan result and the path it came from.
pub struct ScanStore {
    source: Utf8PathBuf,
    result: ScanResult,
}

impl ScanStore {
    /// Load and parse the scan-result document. A structurally invalid
    /// document (anything but an object of match arrays) is fatal; malformed
    /// sub-fields inside matches are tolerated and handled lazily by readers.
    pub fn load(path: &Utf8Path) -> Result<ScanStore, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_owned(),
            source,
        })?;
        let result = serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            path: path.to_owned(),
            source,
        })?;
        Ok(ScanStore {
            source: path.to_owned(),
            result,
        })
    }

    /// Build a store around an already-parsed result, persisting to `source`.
    pub fn new(result: ScanResult, source: Utf8PathBuf) -> ScanStore {
        ScanStore { source, result }
    }

    pub fn result(&self) -> &ScanResult {
        &self.result
    }

    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    /// Cloned snapshot for the background export task. Exports tolerate the
    /// snapshot going stale while the foreground keeps deciding.
    pub fn snapshot(&self) -> ScanResult {
        self.result.clone()
    }

    /// Append an audit decision to the first valid match of `path` and
    /// persist the store.
    ///
    /// The decision history is append-only: prior entries are never touched.
    /// When persistence fails the decision stays applied in memory and the
    /// error tells the caller the document on disk is stale; `save` can be
    /// retried.
    pub fn record_decision(
        &mut self,
        path: &str,
        outcome: Outcome,
        assessment: Option<String>,
    ) -> Result<(), AuditError> {
        let Some(target) = self.result.first_valid_mut(path) else {
            return Err(AuditError::NoAuditableMatch {
                path: path.to_string(),
            });
        };

        let assessment = assessment
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        target.audit.push(AuditDecision {
            decision: outcome,
            assessment,
            timestamp: OffsetDateTime::now_utc(),
        });

        self.save().map_err(|source| AuditError::Persist { source })
    }

    /// Serialize the entire result back to the source path.
    ///
    /// The write goes through a sibling temp file and a rename so a partial
    /// write can never be mistaken for a successful save.
    pub fn save(&self) -> Result<(), PersistError> {
        let data = serde_json::to_vec_pretty(&self.result).map_err(PersistError::Serialize)?;

        let tmp = Utf8PathBuf::from(format!("{}.tmp", self.source));
        std::fs::write(&tmp, &data).map_err(|source| PersistError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.source).map_err(|source| PersistError::Write {
            path: self.source.clone(),
            source,
        })
    }
}
