use git2::{ErrorCode, ObjectType, Repository, Status, StatusOptions};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;
use crate::models::{EntryType, FileStatus, TreeEntry};

impl GitRepository {
    /// Immediate entries of the HEAD tree at `path` (the root when `None`,
    /// empty or "/"), decorated with their working-copy status. Files and
    /// directories that exist only in the index or working copy are listed
    /// too. Paths are relative to the repository root.
    pub fn get_tree_entries(&self, path: Option<&str>, show_hidden: bool) -> Result<Vec<TreeEntry>> {
        self.with_repo(|repo| {
            let head = match repo.head() {
                Ok(head) => head,
                // A fresh repository has no commits yet, so nothing to list.
                Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            };
            let commit = head.peel_to_commit()?;
            let tree = commit.tree()?;
            let statuses = working_copy_statuses(repo)?;

            let base_path = path.map(|p| p.trim_matches('/')).unwrap_or("");
            let prefix = if base_path.is_empty() {
                String::new()
            } else {
                format!("{}/", base_path)
            };

            let target_tree = if base_path.is_empty() {
                Some(tree)
            } else {
                match tree.get_path(Path::new(base_path)) {
                    Ok(entry) => {
                        let obj = entry.to_object(repo)?;
                        Some(obj.peel_to_tree().map_err(|_| {
                            AppError::InvalidPath(format!("{} is not a directory", base_path))
                        })?)
                    }
                    // Directory that only exists in the working copy
                    Err(_) if statuses.iter().any(|(p, s)| s.is_new() && p.starts_with(&prefix)) => None,
                    Err(_) => return Err(AppError::PathNotFound(base_path.to_string())),
                }
            };

            let mut entries = Vec::new();

            for entry in target_tree.iter().flat_map(|t| t.iter()) {
                let name = entry.name().unwrap_or("").to_string();
                if name.is_empty() || (!show_hidden && name.starts_with('.')) {
                    continue;
                }

                let entry_path = format!("{}{}", prefix, name);

                // Submodules cannot be browsed from the parent tree, list them as files
                let entry_type = match entry.kind() {
                    Some(ObjectType::Blob) | Some(ObjectType::Commit) => EntryType::File,
                    Some(ObjectType::Tree) => EntryType::Directory,
                    _ => continue,
                };

                let size = if entry.kind() == Some(ObjectType::Blob) {
                    entry.to_object(repo).ok().and_then(|obj| {
                        obj.as_blob().map(|b| b.size() as u64)
                    })
                } else {
                    None
                };

                let status = match entry_type {
                    EntryType::File => statuses.get(&entry_path).copied().unwrap_or_default(),
                    EntryType::Directory => directory_status(&statuses, &entry_path),
                };

                entries.push(TreeEntry {
                    name,
                    path: entry_path,
                    entry_type,
                    size,
                    status,
                });
            }

            append_new_entries(repo, &statuses, &prefix, show_hidden, &mut entries);

            // Sort: directories first, then files, alphabetically
            entries.sort_by(|a, b| {
                match (&a.entry_type, &b.entry_type) {
                    (EntryType::Directory, EntryType::File) => std::cmp::Ordering::Less,
                    (EntryType::File, EntryType::Directory) => std::cmp::Ordering::Greater,
                    _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                }
            });

            Ok(entries)
        })
    }
}

/// Every path that differs from HEAD, keyed by its repository-relative path.
/// Bare repositories have no working copy and report nothing.
fn working_copy_statuses(repo: &Repository) -> Result<HashMap<String, FileStatus>> {
    if repo.is_bare() {
        return Ok(HashMap::new());
    }

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut options))?;
    let mut changed = HashMap::new();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else {
            continue;
        };
        let status = file_status(entry.status());
        if status != FileStatus::Clean {
            changed.insert(path.to_string(), status);
        }
    }
    Ok(changed)
}

fn file_status(status: Status) -> FileStatus {
    if status.is_index_new() {
        FileStatus::Added
    } else if status.is_wt_new() {
        FileStatus::Untracked
    } else if status.is_index_deleted() || status.is_wt_deleted() {
        FileStatus::Deleted
    } else if status.intersects(
        Status::INDEX_MODIFIED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE
            | Status::WT_MODIFIED
            | Status::WT_RENAMED
            | Status::WT_TYPECHANGE
            | Status::CONFLICTED,
    ) {
        FileStatus::Modified
    } else {
        FileStatus::Clean
    }
}

fn directory_status(statuses: &HashMap<String, FileStatus>, dir_path: &str) -> FileStatus {
    let prefix = format!("{}/", dir_path);
    if statuses.keys().any(|path| path.starts_with(&prefix)) {
        FileStatus::Modified
    } else {
        FileStatus::Clean
    }
}

/// Add the added and untracked paths directly under `prefix` that HEAD does
/// not know about. A new directory is `Added` when everything in it is
/// staged, otherwise `Untracked`.
fn append_new_entries(
    repo: &Repository,
    statuses: &HashMap<String, FileStatus>,
    prefix: &str,
    show_hidden: bool,
    entries: &mut Vec<TreeEntry>,
) {
    let mut new_dirs: BTreeMap<String, FileStatus> = BTreeMap::new();

    for (path, &status) in statuses {
        if !status.is_new() {
            continue;
        }
        let Some(rest) = path.strip_prefix(prefix) else {
            continue;
        };
        let (name, is_dir) = match rest.split_once('/') {
            Some((dir, _)) => (dir, true),
            None => (rest, false),
        };
        if name.is_empty() || (!show_hidden && name.starts_with('.')) {
            continue;
        }

        if is_dir {
            new_dirs
                .entry(name.to_string())
                .and_modify(|s| {
                    if *s != status {
                        *s = FileStatus::Untracked;
                    }
                })
                .or_insert(status);
            continue;
        }

        if entries.iter().any(|e| e.path == *path) {
            continue;
        }
        let size = repo
            .workdir()
            .and_then(|dir| fs::metadata(dir.join(path)).ok())
            .map(|meta| meta.len());
        entries.push(TreeEntry {
            name: name.to_string(),
            path: path.clone(),
            entry_type: EntryType::File,
            size,
            status,
        });
    }

    for (name, status) in new_dirs {
        let path = format!("{}{}", prefix, name);
        // Tracked directories that gained new files are already listed
        if entries.iter().any(|e| e.path == path) {
            continue;
        }
        entries.push(TreeEntry {
            name,
            path,
            entry_type: EntryType::Directory,
            size: None,
            status,
        });
    }
}
