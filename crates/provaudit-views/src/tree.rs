//! Directory hierarchy derived from scan-result paths.
//!
//! Only directories become nodes; files contribute to counts through their
//! ancestry. The tree is rebuilt wholesale on every view/filter change, and
//! expansion state lives outside the nodes so rebuilds never lose it.

use crate::filter::{count_files, FilterMode};
use provaudit_types::ScanResult;
use std::collections::BTreeSet;

/// Synthetic directory node. The root has an empty name and path; ancestry is
/// derivable from `path`, so nodes carry no parent reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }
}

/// Expansion state, keyed by node path, kept apart from the rebuilt tree.
#[derive(Clone, Debug, Default)]
pub struct TreeState {
    expanded: BTreeSet<String>,
}

impl TreeState {
    /// Root starts expanded so top-level directories are visible.
    pub fn new() -> TreeState {
        let mut expanded = BTreeSet::new();
        expanded.insert(String::new());
        TreeState { expanded }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn toggle(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
    }

    pub fn expand_all(&mut self, tree: &DirectoryTree) {
        fn walk(node: &DirectoryNode, expanded: &mut BTreeSet<String>) {
            expanded.insert(node.path.clone());
            for child in &node.children {
                walk(child, expanded);
            }
        }
        walk(&tree.root, &mut self.expanded);
    }
}

/// One display row of the tree pane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub count: usize,
    pub expanded: bool,
}

#[derive(Clone, Debug, Default)]
pub struct DirectoryTree {
    pub root: DirectoryNode,
}

impl DirectoryTree {
    /// Build the hierarchy from every path with a valid first match.
    ///
    /// Two synthesized nodes cover degenerate inputs: an "All Files" node
    /// when no path has any directory component, and a "." node (first
    /// child) when some valid match sits directly in the scan root.
    pub fn build(result: &ScanResult) -> DirectoryTree {
        let mut root = DirectoryNode::default();

        let valid_paths: Vec<&str> = result.valid_paths().collect();

        for path in &valid_paths {
            let segments: Vec<&str> = path.split('/').collect();
            let mut current = &mut root;
            // The final segment is the file; it never becomes a node.
            for (i, segment) in segments[..segments.len() - 1].iter().enumerate() {
                if segment.is_empty() {
                    continue;
                }
                let idx = match current.child_index(segment) {
                    Some(idx) => idx,
                    None => {
                        current.children.push(DirectoryNode {
                            name: segment.to_string(),
                            path: segments[..=i].join("/"),
                            children: Vec::new(),
                        });
                        current.children.len() - 1
                    }
                };
                current = &mut current.children[idx];
            }
        }

        if root.children.is_empty() && !valid_paths.is_empty() {
            root.children.push(DirectoryNode {
                name: "All Files".to_string(),
                path: String::new(),
                children: Vec::new(),
            });
        }

        if valid_paths.iter().any(|p| !p.contains('/')) {
            root.children.insert(
                0,
                DirectoryNode {
                    name: ".".to_string(),
                    path: String::new(),
                    children: Vec::new(),
                },
            );
        }

        DirectoryTree { root }
    }

    /// Find a node by its path.
    pub fn find(&self, path: &str) -> Option<&DirectoryNode> {
        fn walk<'a>(node: &'a DirectoryNode, path: &str) -> Option<&'a DirectoryNode> {
            if node.path == path {
                return Some(node);
            }
            node.children.iter().find_map(|c| walk(c, path))
        }
        if path.is_empty() {
            return Some(&self.root);
        }
        self.root.children.iter().find_map(|c| walk(c, path))
    }

    /// Flatten to display rows under the current filter and expansion state.
    ///
    /// Siblings sort lexicographically at render time; under `matched` and
    /// `pending` a zero-count directory disappears along with its subtree,
    /// while `all` always shows structurally present nodes.
    pub fn rows(&self, result: &ScanResult, state: &TreeState, mode: FilterMode) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(&self.root, 0, result, state, mode, &mut rows);
        rows
    }

    fn push_rows(
        &self,
        node: &DirectoryNode,
        depth: usize,
        result: &ScanResult,
        state: &TreeState,
        mode: FilterMode,
        rows: &mut Vec<TreeRow>,
    ) {
        let mut order: Vec<&DirectoryNode> = node.children.iter().collect();
        order.sort_by(|a, b| a.name.cmp(&b.name));

        for child in order {
            let count = count_files(result, &child.path, mode);
            if mode != FilterMode::All && count == 0 {
                continue;
            }
            let expanded = state.is_expanded(&child.path);
            rows.push(TreeRow {
                path: child.path.clone(),
                name: child.name.clone(),
                depth,
                count,
                expanded,
            });
            if expanded {
                self.push_rows(child, depth + 1, result, state, mode, rows);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provaudit_types::{AuditDecision, FileMatch, MatchKind, Outcome};
    use time::macros::datetime;

    fn scan(paths: &[(&str, MatchKind)]) -> ScanResult {
        let mut result = ScanResult::default();
        for (path, kind) in paths {
            result.files.insert(
                path.to_string(),
                vec![FileMatch {
                    id: *kind,
                    ..FileMatch::default()
                }],
            );
        }
        result
    }

    #[test]
    fn builds_directories_only_and_reuses_nodes() {
        let result = scan(&[
            ("src/a.go", MatchKind::File),
            ("src/util/b.go", MatchKind::Snippet),
            ("src/util/c.go", MatchKind::File),
            ("docs/readme.md", MatchKind::File),
        ]);
        let tree = DirectoryTree::build(&result);

        // Paths arrive in map (sorted) order, so "docs" is created first.
        let names: Vec<&str> = tree.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "src"]);

        let src = tree.find("src").expect("src node");
        assert_eq!(src.children.len(), 1);
        assert_eq!(src.children[0].path, "src/util");
        // Files never become nodes.
        assert!(tree.find("src/a.go").is_none());
    }

    #[test]
    fn invalid_matches_do_not_shape_the_tree() {
        let result = scan(&[
            ("vendor/x.go", MatchKind::None),
            ("src/a.go", MatchKind::File),
        ]);
        let tree = DirectoryTree::build(&result);
        assert!(tree.find("vendor").is_none());
        assert!(tree.find("src").is_some());
    }

    #[test]
    fn all_bare_filenames_synthesize_all_files_and_dot() {
        let result = scan(&[("a.go", MatchKind::File), ("b.go", MatchKind::Snippet)]);
        let tree = DirectoryTree::build(&result);
        let names: Vec<&str> = tree.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![".", "All Files"]);
    }

    #[test]
    fn root_level_file_synthesizes_dot_as_first_child() {
        let result = scan(&[("src/a.go", MatchKind::File), ("main.go", MatchKind::File)]);
        let tree = DirectoryTree::build(&result);
        let names: Vec<&str> = tree.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![".", "src"]);
        // The "." node counts only the bare files.
        assert_eq!(count_files(&result, "", FilterMode::Matched), 1);
    }

    #[test]
    fn no_valid_matches_means_empty_tree() {
        let result = scan(&[("a.txt", MatchKind::None)]);
        let tree = DirectoryTree::build(&result);
        assert!(tree.root.children.is_empty());
    }

    #[test]
    fn rows_sort_siblings_and_respect_expansion() {
        let result = scan(&[
            ("zeta/a.go", MatchKind::File),
            ("alpha/b.go", MatchKind::File),
            ("alpha/inner/c.go", MatchKind::File),
        ]);
        let tree = DirectoryTree::build(&result);
        let mut state = TreeState::new();

        let rows = tree.rows(&result, &state, FilterMode::Matched);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        // Collapsed children stay hidden.
        assert_eq!(names, vec!["alpha", "zeta"]);

        state.toggle("alpha");
        let rows = tree.rows(&result, &state, FilterMode::Matched);
        let names: Vec<(usize, &str)> = rows.iter().map(|r| (r.depth, r.name.as_str())).collect();
        assert_eq!(names, vec![(0, "alpha"), (1, "inner"), (0, "zeta")]);
    }

    #[test]
    fn zero_count_directories_hide_outside_all_mode() {
        let mut result = scan(&[("src/a.go", MatchKind::File), ("docs/b.md", MatchKind::File)]);
        // Decide everything under docs.
        result
            .first_valid_mut("docs/b.md")
            .expect("match")
            .audit
            .push(AuditDecision {
                decision: Outcome::Identified,
                assessment: None,
                timestamp: datetime!(2025-06-01 08:00:00 UTC),
            });

        let tree = DirectoryTree::build(&result);
        let state = TreeState::new();

        let pending: Vec<String> = tree
            .rows(&result, &state, FilterMode::Pending)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(pending, vec!["src".to_string()]);

        let all: Vec<String> = tree
            .rows(&result, &state, FilterMode::All)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(all, vec!["docs".to_string(), "src".to_string()]);
    }

    #[test]
    fn scenario_single_nested_file_counts() {
        // The canonical walkthrough: one nested file, then a decision.
        let doc = r#"{"a/b.go": [{"id": "file"}]}"#;
        let mut result: ScanResult = serde_json::from_str(doc).expect("parse");
        let tree = DirectoryTree::build(&result);

        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[0].name, "a");
        assert_eq!(count_files(&result, "a", FilterMode::Matched), 1);
        assert_eq!(count_files(&result, "a", FilterMode::Pending), 1);

        result
            .first_valid_mut("a/b.go")
            .expect("match")
            .audit
            .push(AuditDecision {
                decision: Outcome::Identified,
                assessment: None,
                timestamp: datetime!(2025-06-01 08:00:00 UTC),
            });

        assert_eq!(count_files(&result, "a", FilterMode::Pending), 0);
        assert_eq!(count_files(&result, "a", FilterMode::Matched), 1);
    }
}
