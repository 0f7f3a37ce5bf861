//! Filter and view-mode state machine plus the shared counting rule.

use provaudit_types::{first_valid_match, AuditStatus, FileMatch, ScanResult};
use std::str::FromStr;

/// Which index the tree pane is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Directories,
    Ranking,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Directories => "directories",
            ViewMode::Ranking => "ranking",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directories" => Ok(ViewMode::Directories),
            "ranking" => Ok(ViewMode::Ranking),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// Visibility filter applied to files in either view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    Matched,
    Pending,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Matched => "matched",
            FilterMode::Pending => "pending",
        }
    }

    /// Whether a path with this match list is counted under the filter.
    ///
    /// `All` counts every file regardless of match validity; `Matched` and
    /// `Pending` apply the first-valid-match rule, with `Pending` further
    /// restricted to matches whose derived status is still pending.
    pub fn admits(self, matches: &[FileMatch]) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Matched => first_valid_match(matches).is_some(),
            FilterMode::Pending => first_valid_match(matches)
                .is_some_and(|m| m.audit_status() == AuditStatus::Pending),
        }
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterMode::All),
            "matched" => Ok(FilterMode::Matched),
            "pending" => Ok(FilterMode::Pending),
            other => Err(format!("unknown filter mode: {other}")),
        }
    }
}

/// Combined view/filter context.
///
/// The ranking view never shows `All`; entering it while `All` is active
/// forces `Matched`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    view: ViewMode,
    filter: FilterMode,
}

impl FilterState {
    pub fn new(view: ViewMode, filter: FilterMode) -> FilterState {
        let mut state = FilterState {
            view: ViewMode::Directories,
            filter,
        };
        state.set_view(view);
        state
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Advance the filter: `all -> matched -> pending -> all` in directory
    /// view, `matched -> pending -> matched` in ranking view.
    pub fn cycle(&mut self) {
        self.filter = match (self.view, self.filter) {
            (ViewMode::Directories, FilterMode::All) => FilterMode::Matched,
            (ViewMode::Directories, FilterMode::Matched) => FilterMode::Pending,
            (ViewMode::Directories, FilterMode::Pending) => FilterMode::All,
            (ViewMode::Ranking, FilterMode::Matched) => FilterMode::Pending,
            (ViewMode::Ranking, _) => FilterMode::Matched,
        };
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        if view == ViewMode::Ranking && self.filter == FilterMode::All {
            self.filter = FilterMode::Matched;
        }
    }

    pub fn toggle_view(&mut self) {
        self.set_view(match self.view {
            ViewMode::Directories => ViewMode::Ranking,
            ViewMode::Ranking => ViewMode::Directories,
        });
    }
}

/// Directory membership rule, applied uniformly everywhere.
///
/// The root (empty path) holds exactly the files without a `/`; any other
/// directory holds every file nested under it, recursively.
pub fn path_in_directory(dir_path: &str, file_path: &str) -> bool {
    if dir_path.is_empty() {
        !file_path.contains('/')
    } else {
        file_path
            .strip_prefix(dir_path)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Filtered file count for a directory node.
///
/// Recomputed per node per refresh; no incremental maintenance.
pub fn count_files(result: &ScanResult, dir_path: &str, mode: FilterMode) -> usize {
    result
        .files
        .iter()
        .filter(|(path, _)| path_in_directory(dir_path, path))
        .filter(|(_, matches)| mode.admits(matches))
        .count()
}
