//! Tree and repository-related DTOs.
//!
//! - `TreeEntry`: Single file/directory returned by a listing
//! - `FileStatus`: Working-copy status of an entry
//! - `RepositoryInfo`: Repo metadata (header display)
//! - `CommitInfo`: Basic commit info (HEAD commit in repository info)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    pub entry_type: EntryType,
    pub size: Option<u64>,
    #[serde(default)]
    pub status: FileStatus,
}

#[cfg(test)]
impl TreeEntry {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            entry_type: EntryType::File,
            size: None,
            status: FileStatus::Clean,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            entry_type: EntryType::Directory,
            size: None,
            status: FileStatus::Clean,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
}

/// Working-copy status relative to HEAD. A directory is `Modified` when
/// anything beneath it differs from HEAD.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Clean,
    Modified,
    Added,
    Deleted,
    Untracked,
}

impl FileStatus {
    /// Only in the working copy or index, never in HEAD.
    pub fn is_new(self) -> bool {
        matches!(self, Self::Added | Self::Untracked)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub oid: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
    pub relative_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub repo_id: String,
    pub name: String,
    pub path: String,
    pub head_branch: Option<String>,
    pub head_commit: Option<CommitInfo>,
    pub is_bare: bool,
    pub is_empty: bool,
}
