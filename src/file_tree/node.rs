use serde::{Deserialize, Serialize};

use crate::models::{EntryType, FileStatus, TreeEntry};

/// Materialization state of a directory's children.
///
/// Keeps "not loaded yet" apart from "loaded and empty": only
/// `Materialized` carries a child sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "nodes", rename_all = "snake_case")]
pub enum Children {
    /// Never fetched (always the case for files)
    Unmaterialized,
    /// Fetch in flight
    Pending,
    /// Last fetch failed; children are still absent
    Failed,
    Materialized(Vec<FileTreeNode>),
}

/// One entry of the mirrored repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeNode {
    pub name: String,
    pub path: String,
    pub kind: EntryType,
    pub size: Option<u64>,
    pub status: FileStatus,
    pub is_expanded: bool,
    pub children: Children,
}

impl From<TreeEntry> for FileTreeNode {
    fn from(entry: TreeEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
            kind: entry.entry_type,
            size: entry.size,
            status: entry.status,
            is_expanded: false,
            children: Children::Unmaterialized,
        }
    }
}

impl FileTreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryType::File
    }

    /// Materialized children, `None` until the directory has been loaded.
    pub fn children(&self) -> Option<&[FileTreeNode]> {
        match &self.children {
            Children::Materialized(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.children, Children::Materialized(_))
    }

    pub fn is_loading(&self) -> bool {
        self.children == Children::Pending
    }

    pub fn state(&self) -> NodeState {
        if self.is_file() {
            return NodeState::Leaf;
        }
        match (self.is_expanded, &self.children) {
            (_, Children::Pending) => NodeState::Loading,
            (true, Children::Failed) => NodeState::Failed,
            (true, _) => NodeState::Expanded,
            (false, _) => NodeState::Collapsed,
        }
    }
}

/// Display state of a node, derived from expansion and materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Leaf,
    Collapsed,
    Loading,
    Expanded,
    Failed,
}
