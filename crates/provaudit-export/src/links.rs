//! Hosting-provider deep links and the default-branch cache.

use provaudit_types::{FileMatch, LineRange, MatchKind, Provider, PurlRef};
use std::collections::BTreeMap;

/// Revision used when no revision is pinned and the remote lookup fails.
/// Older repositories use it directly; the host redirects where it moved.
pub const FALLBACK_REVISION: &str = "master";

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BranchLookupError(pub String);

/// Remote default-branch lookup. Implementations are expected to enforce a
/// short timeout and no retries; callers always degrade on error.
pub trait BranchResolver {
    fn default_branch(&self, owner: &str, repo: &str) -> Result<String, BranchLookupError>;
}

impl<T: BranchResolver + ?Sized> BranchResolver for Box<T> {
    fn default_branch(&self, owner: &str, repo: &str) -> Result<String, BranchLookupError> {
        (**self).default_branch(owner, repo)
    }
}

/// Resolver that never goes remote; doubles as the offline fallback.
pub struct FixedBranch(pub String);

impl BranchResolver for FixedBranch {
    fn default_branch(&self, _owner: &str, _repo: &str) -> Result<String, BranchLookupError> {
        Ok(self.0.clone())
    }
}

/// Per-export memo of `owner/repo` to branch name.
///
/// Repeated files from the same repository incur at most one remote call per
/// export; a failed lookup caches the fallback so it is not retried either.
pub struct BranchCache<'a> {
    resolver: &'a dyn BranchResolver,
    cached: BTreeMap<String, String>,
}

impl<'a> BranchCache<'a> {
    pub fn new(resolver: &'a dyn BranchResolver) -> BranchCache<'a> {
        BranchCache {
            resolver,
            cached: BTreeMap::new(),
        }
    }

    pub fn branch(&mut self, owner: &str, repo: &str) -> String {
        let key = format!("{owner}/{repo}");
        if let Some(branch) = self.cached.get(&key) {
            return branch.clone();
        }
        let branch = self
            .resolver
            .default_branch(owner, repo)
            .unwrap_or_else(|_| FALLBACK_REVISION.to_string());
        self.cached.insert(key, branch.clone());
        branch
    }
}

/// URL construction for one hosting provider.
///
/// New providers plug in here; the report engine never changes.
pub trait DeepLinkBuilder {
    fn provider(&self) -> Provider;

    /// File-view URL for a revision and in-repository path.
    fn file_url(&self, purl: &PurlRef, revision: &str, file: &str) -> String;

    /// Line-anchor suffix for one concrete range.
    fn line_anchor(&self, range: LineRange) -> String;
}

pub struct GithubLinks;

impl DeepLinkBuilder for GithubLinks {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    fn file_url(&self, purl: &PurlRef, revision: &str, file: &str) -> String {
        format!(
            "https://github.com/{}/{}/blob/{}/{}",
            purl.owner, purl.repo, revision, file
        )
    }

    fn line_anchor(&self, range: LineRange) -> String {
        if range.start == range.end {
            format!("#L{}", range.start)
        } else {
            format!("#L{}-L{}", range.start, range.end)
        }
    }
}

fn builder_for(provider: Provider) -> Option<&'static dyn DeepLinkBuilder> {
    match provider {
        Provider::Github => Some(&GithubLinks),
    }
}

/// Deep links for one match, padded with empty cells to `columns`.
///
/// Snippet matches with concrete ranges get one anchored link per range;
/// file matches and snippets without concrete ranges get exactly one
/// anchor-less link. Matches without a supported purl stay empty.
pub fn match_deep_links(
    m: &FileMatch,
    columns: usize,
    branches: &mut BranchCache<'_>,
) -> Vec<String> {
    let mut links = vec![String::new(); columns];

    let Some(purl) = PurlRef::first_supported(&m.purl) else {
        return links;
    };
    let Some(builder) = builder_for(purl.provider) else {
        return links;
    };

    let revision = match &purl.revision {
        Some(pinned) => pinned.clone(),
        None => branches.branch(&purl.owner, &purl.repo),
    };
    let base = builder.file_url(&purl, &revision, &m.file);

    let ranges = if m.id == MatchKind::Snippet {
        m.oss_lines
            .as_ref()
            .map(|spec| spec.concrete_ranges())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    if ranges.is_empty() {
        if columns > 0 {
            links[0] = base;
        }
    } else {
        for (slot, range) in links.iter_mut().zip(ranges) {
            *slot = format!("{base}{}", builder.line_anchor(range));
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use provaudit_types::LineSpec;
    use std::cell::Cell;

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl BranchResolver for CountingResolver {
        fn default_branch(&self, _owner: &str, _repo: &str) -> Result<String, BranchLookupError> {
            self.calls.set(self.calls.get() + 1);
            Ok("main".to_string())
        }
    }

    struct FailingResolver;

    impl BranchResolver for FailingResolver {
        fn default_branch(&self, _owner: &str, _repo: &str) -> Result<String, BranchLookupError> {
            Err(BranchLookupError("unreachable".to_string()))
        }
    }

    fn snippet(purl: &str, lines: &str) -> FileMatch {
        FileMatch {
            id: MatchKind::Snippet,
            file: "src/lib.c".to_string(),
            purl: vec![purl.to_string()],
            oss_lines: Some(LineSpec::parse(lines)),
            ..FileMatch::default()
        }
    }

    #[test]
    fn pinned_snippet_gets_one_anchored_link_per_range() {
        let m = snippet("pkg:github/owner/repo@abc123", "10-12,40");
        let resolver = FailingResolver;
        let mut cache = BranchCache::new(&resolver);
        let links = match_deep_links(&m, 2, &mut cache);
        assert_eq!(
            links,
            vec![
                "https://github.com/owner/repo/blob/abc123/src/lib.c#L10-L12",
                "https://github.com/owner/repo/blob/abc123/src/lib.c#L40",
            ]
        );
    }

    #[test]
    fn file_match_gets_single_anchorless_link() {
        let m = FileMatch {
            id: MatchKind::File,
            file: "util.c".to_string(),
            purl: vec!["pkg:github/owner/repo@v1".to_string()],
            oss_lines: Some(LineSpec::parse("10-12,40")),
            ..FileMatch::default()
        };
        let resolver = FailingResolver;
        let mut cache = BranchCache::new(&resolver);
        let links = match_deep_links(&m, 3, &mut cache);
        assert_eq!(links[0], "https://github.com/owner/repo/blob/v1/util.c");
        assert_eq!(links[1], "");
        assert_eq!(links[2], "");
    }

    #[test]
    fn unbounded_snippet_gets_single_anchorless_link() {
        let m = snippet("pkg:github/owner/repo@v1", "all");
        let resolver = FailingResolver;
        let mut cache = BranchCache::new(&resolver);
        let links = match_deep_links(&m, 1, &mut cache);
        assert_eq!(links, vec!["https://github.com/owner/repo/blob/v1/src/lib.c"]);
    }

    #[test]
    fn unpinned_purl_resolves_and_caches_the_branch() {
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let mut cache = BranchCache::new(&resolver);

        let m = snippet("pkg:github/owner/repo", "7");
        let first = match_deep_links(&m, 1, &mut cache);
        let second = match_deep_links(&m, 1, &mut cache);

        assert_eq!(first, vec!["https://github.com/owner/repo/blob/main/src/lib.c#L7"]);
        assert_eq!(first, second);
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn failed_lookup_degrades_to_fallback_revision() {
        let resolver = FailingResolver;
        let mut cache = BranchCache::new(&resolver);
        let m = snippet("pkg:github/owner/repo", "all");
        let links = match_deep_links(&m, 1, &mut cache);
        assert_eq!(
            links,
            vec!["https://github.com/owner/repo/blob/master/src/lib.c"]
        );
    }

    #[test]
    fn unsupported_purls_stay_unlinked() {
        let m = snippet("pkg:npm/left-pad@1.3.0", "3");
        let resolver = FailingResolver;
        let mut cache = BranchCache::new(&resolver);
        assert_eq!(match_deep_links(&m, 2, &mut cache), vec!["", ""]);
    }

    #[test]
    fn extra_ranges_beyond_columns_are_dropped() {
        let m = snippet("pkg:github/owner/repo@r", "1-2,4,6-8");
        let resolver = FailingResolver;
        let mut cache = BranchCache::new(&resolver);
        let links = match_deep_links(&m, 2, &mut cache);
        assert_eq!(links.len(), 2);
        assert!(links[1].ends_with("#L4"));
    }
}
