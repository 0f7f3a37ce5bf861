//! Dataset-wide counters for the status pane and the progress line.

use provaudit_types::{first_valid_match, AuditStatus, MatchKind, ScanResult};

/// Totals over the whole scan result, first-valid-match rule applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_paths: usize,
    pub matched: usize,
    pub file_matches: usize,
    pub snippet_matches: usize,
    pub no_match: usize,
    pub pending: usize,
    pub accepted: usize,
    pub ignored: usize,
}

impl Summary {
    pub fn compute(result: &ScanResult) -> Summary {
        let mut summary = Summary {
            total_paths: result.files.len(),
            ..Summary::default()
        };

        for matches in result.files.values() {
            let Some(m) = first_valid_match(matches) else {
                continue;
            };
            summary.matched += 1;
            match m.id {
                MatchKind::File => summary.file_matches += 1,
                MatchKind::Snippet => summary.snippet_matches += 1,
                MatchKind::None => {}
            }
            match m.audit_status() {
                AuditStatus::Pending => summary.pending += 1,
                AuditStatus::Accepted => summary.accepted += 1,
                AuditStatus::Ignored => summary.ignored += 1,
            }
        }

        summary.no_match = summary.total_paths - summary.matched;
        summary
    }
}

/// Audit progress over the auditable files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuditProgress {
    /// Files whose first valid match has at least one decision entry.
    pub decided: usize,
    pub total: usize,
    pub percent: u32,
}

pub fn audit_progress(result: &ScanResult) -> AuditProgress {
    let mut decided = 0;
    let mut total = 0;

    for matches in result.files.values() {
        let Some(m) = first_valid_match(matches) else {
            continue;
        };
        total += 1;
        if !m.audit.is_empty() {
            decided += 1;
        }
    }

    let percent = if total > 0 {
        (decided * 100 / total) as u32
    } else {
        0
    };

    AuditProgress {
        decided,
        total,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provaudit_types::{AuditDecision, FileMatch, Outcome};
    use time::macros::datetime;

    fn decision(outcome: Outcome) -> AuditDecision {
        AuditDecision {
            decision: outcome,
            assessment: None,
            timestamp: datetime!(2025-04-04 16:00:00 UTC),
        }
    }

    fn fixture() -> ScanResult {
        let mut result = ScanResult::default();
        result.files.insert(
            "a.go".into(),
            vec![FileMatch {
                id: MatchKind::File,
                audit: vec![decision(Outcome::Identified)],
                ..FileMatch::default()
            }],
        );
        result.files.insert(
            "b.go".into(),
            vec![FileMatch {
                id: MatchKind::Snippet,
                audit: vec![decision(Outcome::Ignored)],
                ..FileMatch::default()
            }],
        );
        result.files.insert(
            "c.go".into(),
            vec![FileMatch {
                id: MatchKind::Snippet,
                ..FileMatch::default()
            }],
        );
        result
            .files
            .insert("plain.txt".into(), vec![FileMatch::default()]);
        result
    }

    #[test]
    fn summary_counts_by_kind_and_status() {
        let summary = Summary::compute(&fixture());
        assert_eq!(summary.total_paths, 4);
        assert_eq!(summary.matched, 3);
        assert_eq!(summary.file_matches, 1);
        assert_eq!(summary.snippet_matches, 2);
        assert_eq!(summary.no_match, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.ignored, 1);
    }

    #[test]
    fn progress_counts_any_decision_as_reviewed() {
        let progress = audit_progress(&fixture());
        assert_eq!(progress.decided, 2);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percent, 66);
    }

    #[test]
    fn progress_on_empty_dataset_is_zero() {
        let progress = audit_progress(&ScanResult::default());
        assert_eq!(progress, AuditProgress::default());
    }
}
