//! Report writing: one CSV row per scanned path.

use crate::links::{match_deep_links, BranchCache, BranchResolver};
use crate::ExportError;
use camino::{Utf8Path, Utf8PathBuf};
use provaudit_types::{first_valid_match, MatchKind, ScanResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Advisory progress message; receivers may lag or disappear freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    pub processed: usize,
    pub total: usize,
}

/// Cooperative cancellation shared between the foreground and the export
/// worker.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    pub destination: Utf8PathBuf,
}

/// Deep-link column count for the whole report: the maximum count of
/// concrete ranges over **all** snippet matches in the dataset, never less
/// than one. Computed in a pass before any row is written so every row has
/// the same width.
pub fn max_range_columns(result: &ScanResult) -> usize {
    result
        .files
        .values()
        .flatten()
        .filter(|m| m.id == MatchKind::Snippet)
        .filter_map(|m| m.oss_lines.as_ref())
        .map(|spec| spec.concrete_ranges().len())
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Write the CSV report for `result` to `destination`.
///
/// Every path appears exactly once, including paths with no valid match.
/// Remote branch lookups go through `resolver` behind a per-export cache and
/// degrade to the fallback revision; only destination IO failures (or
/// cancellation) abort.
pub fn write_report(
    result: &ScanResult,
    destination: &Utf8Path,
    resolver: &dyn BranchResolver,
    progress: Option<&Sender<ExportProgress>>,
    cancel: &CancelToken,
) -> Result<ExportSummary, ExportError> {
    let file = std::fs::File::create(destination).map_err(|source| ExportError::Create {
        path: destination.to_owned(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let link_columns = max_range_columns(result);

    let mut header = vec![
        "File Path".to_string(),
        "Match Type".to_string(),
        "PURL".to_string(),
        "License".to_string(),
        "Status".to_string(),
        "Comment".to_string(),
        "Line Ranges".to_string(),
    ];
    if link_columns > 1 {
        for i in 1..=link_columns {
            header.push(format!("Deeplink {i}"));
        }
    } else {
        header.push("Deeplink".to_string());
    }
    writer.write_record(&header)?;

    let mut branches = BranchCache::new(resolver);
    let total = result.files.len();

    for (processed, (path, matches)) in result.files.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let record = match first_valid_match(matches) {
            None => {
                let mut record = vec![
                    path.clone(),
                    "no-match".to_string(),
                    String::new(),
                    String::new(),
                    "Pending".to_string(),
                    String::new(),
                    String::new(),
                ];
                record.extend(std::iter::repeat_n(String::new(), link_columns));
                record
            }
            Some(m) => {
                let licenses = m
                    .licenses
                    .iter()
                    .map(|l| l.name.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                let line_ranges = m
                    .oss_lines
                    .as_ref()
                    .map(|spec| spec.canonical())
                    .unwrap_or_default();

                let mut record = vec![
                    path.clone(),
                    m.id.as_str().to_string(),
                    m.purl.join("; "),
                    licenses,
                    m.audit_status().as_str().to_string(),
                    m.latest_assessment().unwrap_or_default().to_string(),
                    line_ranges,
                ];
                record.extend(match_deep_links(m, link_columns, &mut branches));
                record
            }
        };

        writer.write_record(&record)?;

        if let Some(sender) = progress {
            // Advisory only; a gone receiver never stalls the export.
            let _ = sender.send(ExportProgress {
                processed: processed + 1,
                total,
            });
        }
    }

    writer.flush().map_err(|source| ExportError::Io {
        path: destination.to_owned(),
        source,
    })?;

    Ok(ExportSummary {
        rows: total,
        destination: destination.to_owned(),
    })
}
