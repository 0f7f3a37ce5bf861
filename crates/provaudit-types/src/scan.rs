use crate::lines::LineSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Match classification as reported by the scanner.
///
/// Only `file` and `snippet` matches are auditable; every other value the
/// scanner may emit collapses to `None` and is ignored by views and counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    File,
    Snippet,
    #[default]
    #[serde(other)]
    None,
}

impl MatchKind {
    /// Whether a match of this kind participates in display, counting, and audit.
    pub fn is_valid(self) -> bool {
        matches!(self, MatchKind::File | MatchKind::Snippet)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::File => "file",
            MatchKind::Snippet => "snippet",
            MatchKind::None => "none",
        }
    }
}

/// Auditor verdict recorded in a decision entry.
///
/// Unrecognized values in existing documents are tolerated and read back as
/// `Unknown`; they never contribute an Accepted/Ignored status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Identified,
    Ignored,
    #[serde(other)]
    Unknown,
}

/// One append-only audit-trail entry on a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditDecision {
    pub decision: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Status derived from the most recent decision entry only.
///
/// Earlier entries are kept for the audit trail but never influence status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AuditStatus {
    #[default]
    Pending,
    Accepted,
    Ignored,
}

impl AuditStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditStatus::Pending => "Pending",
            AuditStatus::Accepted => "Accepted",
            AuditStatus::Ignored => "Ignored",
        }
    }
}

/// License attribution attached to a match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct License {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyleft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osadl_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patent_hints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One scanner finding for a file.
///
/// Wire names follow the scan-result document. Fields the audit workflow
/// never inspects (`health`, `server`, `copyrights`, ...) are preserved in
/// `extra` so full-overwrite persistence round-trips the whole document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileMatch {
    #[serde(default)]
    pub id: MatchKind,

    /// Path of the matched file inside the upstream component.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,

    /// Remote content locator; empty or absent when the scan ran without a
    /// credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// Package identifiers, ordered; the first entry is the primary one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purl: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,

    /// Matched line specifier, normalized at load time.
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oss_lines: Option<LineSpec>,

    /// Append-only decision history.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit: Vec<AuditDecision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl FileMatch {
    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// Derived status: the latest decision entry wins, everything older is
    /// audit trail only.
    pub fn audit_status(&self) -> AuditStatus {
        match self.audit.last() {
            None => AuditStatus::Pending,
            Some(entry) => match entry.decision {
                Outcome::Identified => AuditStatus::Accepted,
                Outcome::Ignored => AuditStatus::Ignored,
                Outcome::Unknown => AuditStatus::Pending,
            },
        }
    }

    /// Assessment text of the latest decision, if any.
    pub fn latest_assessment(&self) -> Option<&str> {
        self.audit.last().and_then(|d| d.assessment.as_deref())
    }
}

/// The first `file`/`snippet` match in a list.
///
/// This is the single authority every component uses for display, counting,
/// and audit actions; later matches in the list are never consulted.
pub fn first_valid_match(matches: &[FileMatch]) -> Option<&FileMatch> {
    matches.iter().find(|m| m.is_valid())
}

/// A usable remote content locator: https only, nothing else.
pub fn is_valid_file_url(url: &str) -> bool {
    let trimmed = url.trim();
    trimmed.len() > "https://".len() && trimmed.starts_with("https://")
}

/// Parsed scan result: file path mapped to its ordered match list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ScanResult {
    pub files: BTreeMap<String, Vec<FileMatch>>,
}

impl ScanResult {
    /// First valid match for a path, or `None` when the path is unknown or
    /// carries no auditable match.
    pub fn first_valid(&self, path: &str) -> Option<&FileMatch> {
        self.files.get(path).and_then(|m| first_valid_match(m))
    }

    pub fn first_valid_mut(&mut self, path: &str) -> Option<&mut FileMatch> {
        self.files
            .get_mut(path)
            .and_then(|matches| matches.iter_mut().find(|m| m.is_valid()))
    }

    /// Paths whose first valid match exists, in map (sorted) order.
    pub fn valid_paths(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|(_, matches)| first_valid_match(matches).is_some())
            .map(|(path, _)| path.as_str())
    }

    /// Whether the scan was produced with a credential: every valid match in
    /// the document must carry a usable content locator.
    pub fn generated_with_credentials(&self) -> bool {
        self.files
            .values()
            .flatten()
            .filter(|m| m.is_valid())
            .all(|m| is_valid_file_url(m.file_url.as_deref().unwrap_or("")))
    }
}
