use serde::{Deserialize, Serialize};

use super::{Children, FileTreeNode, NodeState};
use crate::models::{EntryType, FileStatus};

/// Complete tree state for one selected repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub roots: Vec<FileTreeNode>,
    pub selected_path: Option<String>,
    pub is_loading: bool,
}

/// A node as it appears in the flattened, rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleRow {
    pub index_path: Vec<usize>,
    pub depth: usize,
    pub name: String,
    pub path: String,
    pub kind: EntryType,
    pub status: FileStatus,
    pub state: NodeState,
    pub is_selected: bool,
}

impl TreeSnapshot {
    /// Walk sibling indices from the roots down through materialized
    /// children. `None` when any index is out of bounds or the walk passes
    /// through a node without children.
    pub fn node_at(&self, index_path: &[usize]) -> Option<&FileTreeNode> {
        let (first, rest) = index_path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &index in rest {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }

    /// Mutable variant of [`node_at`](Self::node_at). Only nodes on the
    /// walked path are touched.
    pub fn node_at_mut(&mut self, index_path: &[usize]) -> Option<&mut FileTreeNode> {
        let (first, rest) = index_path.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for &index in rest {
            node = match &mut node.children {
                Children::Materialized(nodes) => nodes.get_mut(index)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Depth-first search of the materialized portion of the tree.
    pub fn find_by_path(&self, path: &str) -> Option<&FileTreeNode> {
        fn find<'a>(nodes: &'a [FileTreeNode], path: &str) -> Option<&'a FileTreeNode> {
            for node in nodes {
                if node.path == path {
                    return Some(node);
                }
                if let Some(found) = node.children().and_then(|children| find(children, path)) {
                    return Some(found);
                }
            }
            None
        }
        find(&self.roots, path)
    }

    pub fn is_selected(&self, node: &FileTreeNode) -> bool {
        self.selected_path.as_deref() == Some(node.path.as_str())
    }

    pub fn selected_node(&self) -> Option<&FileTreeNode> {
        self.selected_path.as_deref().and_then(|path| self.find_by_path(path))
    }

    /// Rows a tree view shows: every root, plus the children of each
    /// expanded directory, in order.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut index_path = Vec::new();
        self.collect_visible(&self.roots, &mut index_path, &mut rows);
        rows
    }

    fn collect_visible(&self, nodes: &[FileTreeNode], index_path: &mut Vec<usize>, rows: &mut Vec<VisibleRow>) {
        for (index, node) in nodes.iter().enumerate() {
            index_path.push(index);
            rows.push(VisibleRow {
                index_path: index_path.clone(),
                depth: index_path.len() - 1,
                name: node.name.clone(),
                path: node.path.clone(),
                kind: node.kind,
                status: node.status,
                state: node.state(),
                is_selected: self.is_selected(node),
            });
            if node.is_expanded {
                if let Some(children) = node.children() {
                    self.collect_visible(children, index_path, rows);
                }
            }
            index_path.pop();
        }
    }

    /// Collapse every directory, keeping materialized children.
    /// Returns whether anything changed.
    pub fn collapse_all(&mut self) -> bool {
        fn collapse(nodes: &mut [FileTreeNode]) -> bool {
            let mut changed = false;
            for node in nodes {
                // Pending directories stay expanded until their fetch resolves
                if node.is_expanded && !node.is_loading() {
                    node.is_expanded = false;
                    changed = true;
                }
                if let Children::Materialized(children) = &mut node.children {
                    changed |= collapse(children);
                }
            }
            changed
        }
        collapse(&mut self.roots)
    }

    /// Expand every directory whose children are already materialized.
    /// Nothing is fetched, so unloaded and failed directories stay as they
    /// are. Returns whether anything changed.
    pub fn expand_all(&mut self) -> bool {
        fn expand(nodes: &mut [FileTreeNode]) -> bool {
            let mut changed = false;
            for node in nodes {
                if let Children::Materialized(children) = &mut node.children {
                    if !node.is_expanded {
                        node.is_expanded = true;
                        changed = true;
                    }
                    changed |= expand(children);
                }
            }
            changed
        }
        expand(&mut self.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TreeEntry;

    fn sample() -> TreeSnapshot {
        let mut src = FileTreeNode::from(TreeEntry::directory("src", "/src"));
        let mut util = FileTreeNode::from(TreeEntry::directory("util", "/src/util"));
        util.children = Children::Materialized(vec![FileTreeNode::from(TreeEntry::file(
            "format.ts",
            "/src/util/format.ts",
        ))]);
        src.is_expanded = true;
        src.children = Children::Materialized(vec![
            util,
            FileTreeNode::from(TreeEntry::file("index.ts", "/src/index.ts")),
        ]);

        TreeSnapshot {
            roots: vec![src, FileTreeNode::from(TreeEntry::file("README.md", "/README.md"))],
            selected_path: Some("/src/index.ts".to_string()),
            is_loading: false,
        }
    }

    #[test]
    fn node_at_walks_index_paths() {
        let snapshot = sample();
        assert_eq!(snapshot.node_at(&[0]).unwrap().path, "/src");
        assert_eq!(snapshot.node_at(&[0, 1]).unwrap().path, "/src/index.ts");
        assert_eq!(snapshot.node_at(&[0, 0, 0]).unwrap().path, "/src/util/format.ts");
        assert_eq!(snapshot.node_at(&[1]).unwrap().path, "/README.md");
    }

    #[test]
    fn node_at_rejects_out_of_bounds_and_empty_paths() {
        let snapshot = sample();
        assert!(snapshot.node_at(&[]).is_none());
        assert!(snapshot.node_at(&[2]).is_none());
        assert!(snapshot.node_at(&[0, 5]).is_none());
        // README.md has no children to descend into
        assert!(snapshot.node_at(&[1, 0]).is_none());
    }

    #[test]
    fn node_at_mut_only_touches_the_walked_node() {
        let mut snapshot = sample();
        let before = snapshot.clone();

        snapshot.node_at_mut(&[0, 0]).unwrap().is_expanded = true;

        assert!(snapshot.node_at(&[0, 0]).unwrap().is_expanded);
        assert_eq!(snapshot.roots[1], before.roots[1]);
        assert_eq!(snapshot.node_at(&[0, 1]), before.node_at(&[0, 1]));
    }

    #[test]
    fn find_by_path_searches_materialized_nodes() {
        let snapshot = sample();
        assert_eq!(
            snapshot.find_by_path("/src/util/format.ts").unwrap().name,
            "format.ts"
        );
        assert!(snapshot.find_by_path("/src/missing.ts").is_none());
        assert_eq!(snapshot.selected_node().unwrap().name, "index.ts");
    }

    #[test]
    fn visible_rows_skip_collapsed_subtrees() {
        let snapshot = sample();
        let rows = snapshot.visible_rows();
        let paths: Vec<_> = rows.iter().map(|r| r.path.as_str()).collect();
        // util is materialized but collapsed, so format.ts is hidden
        assert_eq!(paths, vec!["/src", "/src/util", "/src/index.ts", "/README.md"]);
        assert_eq!(rows[2].index_path, vec![0, 1]);
        assert_eq!(rows[2].depth, 1);
        assert!(rows[2].is_selected);
        assert!(!rows[3].is_selected);
    }

    #[test]
    fn collapse_all_keeps_children() {
        let mut snapshot = sample();
        assert!(snapshot.collapse_all());
        assert!(!snapshot.node_at(&[0]).unwrap().is_expanded);
        assert!(snapshot.node_at(&[0]).unwrap().is_materialized());
        assert!(!snapshot.collapse_all());
    }

    #[test]
    fn expand_all_opens_only_materialized_directories() {
        let mut snapshot = sample();
        snapshot.roots.push(FileTreeNode::from(TreeEntry::directory("docs", "/docs")));
        snapshot.collapse_all();

        assert!(snapshot.expand_all());
        assert!(snapshot.node_at(&[0]).unwrap().is_expanded);
        assert!(snapshot.node_at(&[0, 0]).unwrap().is_expanded);
        let docs = snapshot.node_at(&[2]).unwrap();
        assert!(!docs.is_expanded);
        assert_eq!(docs.children, Children::Unmaterialized);

        let paths: Vec<_> = snapshot.visible_rows().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec!["/src", "/src/util", "/src/util/format.ts", "/src/index.ts", "/README.md", "/docs"]
        );
        assert!(!snapshot.expand_all());
    }
}
