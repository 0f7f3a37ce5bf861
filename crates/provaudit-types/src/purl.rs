//! Structured purl references for hosting-provider deep links.
//!
//! Only the subset of the purl grammar needed for deep-link generation is
//! parsed: `pkg:<type>/<owner>/<repo>[@revision][?qualifiers][#subpath]`.
//! Unsupported types and malformed identifiers yield `None`; they are simply
//! not linkable, never an error.

use std::fmt;

/// Hosting providers with a known file-view URL shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    Github,
}

impl Provider {
    pub fn from_purl_type(purl_type: &str) -> Option<Provider> {
        match purl_type {
            "github" => Some(Provider::Github),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Github => "github",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed package identifier pointing at a hosted repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurlRef {
    pub provider: Provider,
    pub owner: String,
    pub repo: String,
    /// Pinned revision (commit or tag), when the purl carries one.
    pub revision: Option<String>,
}

impl PurlRef {
    pub fn parse(purl: &str) -> Option<PurlRef> {
        let rest = purl.trim().strip_prefix("pkg:")?;
        let (purl_type, rest) = rest.split_once('/')?;
        let provider = Provider::from_purl_type(purl_type)?;

        // Qualifiers and subpaths carry no routing information for links.
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);

        let (name_part, revision) = match rest.rsplit_once('@') {
            Some((name, revision)) if !revision.is_empty() => {
                (name, Some(revision.to_string()))
            }
            _ => (rest, None),
        };

        let (owner, repo) = name_part.split_once('/')?;
        if owner.is_empty() || repo.is_empty() {
            return None;
        }

        Some(PurlRef {
            provider,
            owner: owner.to_string(),
            repo: repo.to_string(),
            revision,
        })
    }

    /// First identifier in the list that references a supported provider.
    pub fn first_supported(purls: &[String]) -> Option<PurlRef> {
        purls.iter().find_map(|purl| PurlRef::parse(purl))
    }
}
