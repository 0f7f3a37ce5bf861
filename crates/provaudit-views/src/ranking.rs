//! Component ranking: files grouped by the primary purl of their first valid
//! match, ordered by descending file count.

use crate::filter::FilterMode;
use provaudit_types::{first_valid_match, ScanResult};
use std::collections::BTreeMap;

/// One ranked component and the files it matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankEntry {
    pub purl: String,
    pub files: Vec<String>,
    pub count: usize,
}

/// Disposable ranking projection; rebuilt wholesale, never owns audit state.
#[derive(Clone, Debug, Default)]
pub struct ComponentRanking {
    pub entries: Vec<RankEntry>,
}

impl ComponentRanking {
    /// Group every valid-match path under the first purl of its first valid
    /// match. Grouping goes through a `BTreeMap` and ties break on the purl
    /// string, so the ordering is fully deterministic.
    pub fn build(result: &ScanResult) -> ComponentRanking {
        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for (path, matches) in &result.files {
            let Some(m) = first_valid_match(matches) else {
                continue;
            };
            let Some(primary) = m.purl.first() else {
                continue;
            };
            groups.entry(primary.as_str()).or_default().push(path.clone());
        }

        let mut entries: Vec<RankEntry> = groups
            .into_iter()
            .map(|(purl, files)| RankEntry {
                purl: purl.to_string(),
                count: files.len(),
                files,
            })
            .collect();

        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.purl.cmp(&b.purl)));

        ComponentRanking { entries }
    }

    /// Filtered count for one entry. Entries only hold valid-match files, so
    /// `Matched` counts them all and `Pending` the undecided subset.
    pub fn filtered_count(result: &ScanResult, entry: &RankEntry, mode: FilterMode) -> usize {
        entry
            .files
            .iter()
            .filter(|path| {
                result
                    .files
                    .get(path.as_str())
                    .is_some_and(|matches| mode.admits(matches))
            })
            .count()
    }

    /// Entries visible under the filter: a zero-count entry is hidden.
    pub fn visible<'a>(
        &'a self,
        result: &ScanResult,
        mode: FilterMode,
    ) -> Vec<(&'a RankEntry, usize)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let count = Self::filtered_count(result, entry, mode);
                (count > 0).then_some((entry, count))
            })
            .collect()
    }

    pub fn entry(&self, purl: &str) -> Option<&RankEntry> {
        self.entries.iter().find(|e| e.purl == purl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provaudit_types::{AuditDecision, FileMatch, MatchKind, Outcome};
    use time::macros::datetime;

    fn matched(purls: &[&str]) -> Vec<FileMatch> {
        vec![FileMatch {
            id: MatchKind::Snippet,
            purl: purls.iter().map(|p| p.to_string()).collect(),
            ..FileMatch::default()
        }]
    }

    fn fixture() -> ScanResult {
        let mut result = ScanResult::default();
        result.files.insert(
            "a.go".into(),
            matched(&["pkg:github/big/component", "pkg:github/other/secondary"]),
        );
        result
            .files
            .insert("b.go".into(), matched(&["pkg:github/big/component"]));
        result
            .files
            .insert("c.go".into(), matched(&["pkg:github/small/one"]));
        result.files.insert("no-purl.go".into(), matched(&[]));
        result
            .files
            .insert("invalid.go".into(), vec![FileMatch::default()]);
        result
    }

    #[test]
    fn groups_by_primary_purl_of_first_valid_match() {
        let ranking = ComponentRanking::build(&fixture());
        assert_eq!(ranking.entries.len(), 2);
        assert_eq!(ranking.entries[0].purl, "pkg:github/big/component");
        assert_eq!(ranking.entries[0].count, 2);
        assert_eq!(ranking.entries[1].purl, "pkg:github/small/one");
        // Secondary purls never group; purl-less and invalid matches drop out.
        assert!(ranking.entry("pkg:github/other/secondary").is_none());
    }

    #[test]
    fn ties_break_on_ascending_purl() {
        let mut result = ScanResult::default();
        result
            .files
            .insert("x.go".into(), matched(&["pkg:github/zz/late"]));
        result
            .files
            .insert("y.go".into(), matched(&["pkg:github/aa/early"]));
        let ranking = ComponentRanking::build(&result);
        let purls: Vec<&str> = ranking.entries.iter().map(|e| e.purl.as_str()).collect();
        assert_eq!(purls, vec!["pkg:github/aa/early", "pkg:github/zz/late"]);
    }

    #[test]
    fn visibility_follows_filtered_count() {
        let mut result = fixture();
        // Decide the only file of the small component.
        result
            .first_valid_mut("c.go")
            .expect("match")
            .audit
            .push(AuditDecision {
                decision: Outcome::Ignored,
                assessment: None,
                timestamp: datetime!(2025-03-03 09:00:00 UTC),
            });

        let ranking = ComponentRanking::build(&result);

        let matched: Vec<(&str, usize)> = ranking
            .visible(&result, FilterMode::Matched)
            .into_iter()
            .map(|(e, n)| (e.purl.as_str(), n))
            .collect();
        assert_eq!(
            matched,
            vec![("pkg:github/big/component", 2), ("pkg:github/small/one", 1)]
        );

        let pending: Vec<(&str, usize)> = ranking
            .visible(&result, FilterMode::Pending)
            .into_iter()
            .map(|(e, n)| (e.purl.as_str(), n))
            .collect();
        assert_eq!(pending, vec![("pkg:github/big/component", 2)]);
    }
}
