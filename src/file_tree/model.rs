use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};

use super::{Children, FileTreeNode, TreeSnapshot, VisibleRow};
use crate::browser::SharedBrowser;
use crate::error::TreeError;

struct TreeState {
    snapshot: TreeSnapshot,
    repository_id: Option<String>,
    /// Bumped by every `load_roots`; fetches tagged with an older value are
    /// discarded when they resolve.
    generation: u64,
}

struct Inner {
    browser: SharedBrowser,
    state: Mutex<TreeState>,
    revision: watch::Sender<u64>,
}

/// Consistent read of the whole model, taken under one lock.
#[derive(Debug, Clone, Serialize)]
pub struct TreeView {
    pub repository_id: Option<String>,
    pub generation: u64,
    pub show_hidden: bool,
    pub snapshot: TreeSnapshot,
    pub rows: Vec<VisibleRow>,
}

/// Lazily materialized view of one repository's file tree.
///
/// Cloning yields another handle to the same tree. The state lock is never
/// held while the browsing service is awaited, so a toggle or a repository
/// switch can run while another fetch is outstanding. All operations are
/// total: failures are logged and leave the tree in a defined state.
#[derive(Clone)]
pub struct FileTreeModel {
    inner: Arc<Inner>,
}

impl FileTreeModel {
    pub fn new(browser: SharedBrowser) -> Self {
        let (revision, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(Inner {
                browser,
                state: Mutex::new(TreeState {
                    snapshot: TreeSnapshot::default(),
                    repository_id: None,
                    generation: 0,
                }),
                revision,
            }),
        }
    }

    /// Revision counter bumped after every mutation of the tree.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn notify(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }

    pub async fn view(&self) -> TreeView {
        let state = self.inner.state.lock().await;
        TreeView {
            repository_id: state.repository_id.clone(),
            generation: state.generation,
            show_hidden: self.inner.browser.show_hidden(),
            rows: state.snapshot.visible_rows(),
            snapshot: state.snapshot.clone(),
        }
    }

    pub async fn selected_node(&self) -> Option<FileTreeNode> {
        self.inner.state.lock().await.snapshot.selected_node().cloned()
    }

    pub async fn repository_id(&self) -> Option<String> {
        self.inner.state.lock().await.repository_id.clone()
    }

    /// Replace the tree with the top level of `repository_id`.
    ///
    /// The previous tree is discarded as soon as the load is dispatched.
    /// Switching to another repository also clears the selection. On failure
    /// the roots stay empty.
    pub async fn load_roots(&self, repository_id: &str) {
        let repository_id = repository_id.trim();
        if repository_id.is_empty() {
            tracing::warn!("Ignoring tree load for a blank repository id");
            return;
        }

        let generation = {
            let mut state = self.inner.state.lock().await;
            state.generation += 1;
            if state.repository_id.as_deref() != Some(repository_id) {
                state.snapshot.selected_path = None;
            }
            state.repository_id = Some(repository_id.to_string());
            state.snapshot.roots = Vec::new();
            state.snapshot.is_loading = true;
            state.generation
        };
        self.notify();

        tracing::debug!("Loading tree roots for {} (generation {})", repository_id, generation);
        let result = self.inner.browser.list_roots(repository_id).await;

        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            let stale = TreeError::StaleOperation(format!(
                "roots of {} resolved for generation {}, now {}",
                repository_id, generation, state.generation
            ));
            tracing::debug!("{}", stale);
            return;
        }

        state.snapshot.roots = match result {
            Ok(entries) => entries.into_iter().map(FileTreeNode::from).collect(),
            Err(e) => {
                tracing::error!("Failed to load tree for {}: {}", repository_id, TreeError::FetchFailed(e));
                Vec::new()
            }
        };
        state.snapshot.is_loading = false;
        drop(state);
        self.notify();
    }

    /// Reload the current repository. No-op before the first load.
    pub async fn refresh(&self) {
        let repository_id = self.repository_id().await;
        match repository_id {
            Some(repository_id) => self.load_roots(&repository_id).await,
            None => tracing::debug!("Nothing to refresh, no repository loaded"),
        }
    }

    /// Expand or collapse the directory at `index_path`.
    ///
    /// The first expansion fetches the directory's contents. Files, stale
    /// index paths and directories whose fetch is still in flight are
    /// no-ops. Collapsing keeps the fetched children, so re-expanding never
    /// fetches again.
    pub async fn toggle_directory(&self, index_path: &[usize]) {
        let (generation, repository_id, path) = {
            let mut state = self.inner.state.lock().await;
            let generation = state.generation;
            let Some(repository_id) = state.repository_id.clone() else {
                tracing::debug!("{}", TreeError::StaleOperation("no repository loaded".to_string()));
                return;
            };
            let Some(node) = state.snapshot.node_at_mut(index_path) else {
                tracing::debug!(
                    "{}",
                    TreeError::StaleOperation(format!("no node at {:?}", index_path))
                );
                return;
            };

            if node.is_file() {
                return;
            }
            if node.is_loading() {
                tracing::debug!("Fetch for {} already in flight", node.path);
                return;
            }
            if node.is_expanded {
                node.is_expanded = false;
                drop(state);
                self.notify();
                return;
            }
            node.is_expanded = true;
            if node.is_materialized() {
                drop(state);
                self.notify();
                return;
            }

            node.children = Children::Pending;
            (generation, repository_id, node.path.clone())
        };
        self.notify();

        let result = self.inner.browser.list_directory(&repository_id, &path).await;

        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            let stale = TreeError::StaleOperation(format!(
                "listing of {} resolved for generation {}, now {}",
                path, generation, state.generation
            ));
            tracing::debug!("{}", stale);
            return;
        }
        let Some(node) = state
            .snapshot
            .node_at_mut(index_path)
            .filter(|node| node.path == path)
        else {
            tracing::debug!(
                "{}",
                TreeError::StaleOperation(format!("{} moved away from {:?}", path, index_path))
            );
            return;
        };

        match result {
            Ok(entries) => {
                node.children = Children::Materialized(entries.into_iter().map(FileTreeNode::from).collect());
            }
            Err(e) => {
                tracing::error!("Failed to list {}: {}", path, TreeError::FetchFailed(e));
                node.children = Children::Failed;
            }
        }
        drop(state);
        self.notify();
    }

    /// Make `path` the single selected path. Selecting the current
    /// selection again changes nothing.
    pub async fn select_path(&self, path: &str) {
        let mut state = self.inner.state.lock().await;
        if state.snapshot.selected_path.as_deref() == Some(path) {
            return;
        }
        state.snapshot.selected_path = Some(path.to_string());
        drop(state);
        self.notify();
    }

    pub async fn clear_selection(&self) {
        let mut state = self.inner.state.lock().await;
        if state.snapshot.selected_path.take().is_some() {
            drop(state);
            self.notify();
        }
    }

    /// Collapse every expanded directory without discarding children.
    pub async fn collapse_all(&self) {
        let mut state = self.inner.state.lock().await;
        if state.snapshot.collapse_all() {
            drop(state);
            self.notify();
        }
    }

    /// Expand every directory that is already loaded. Never fetches.
    pub async fn expand_all(&self) {
        let mut state = self.inner.state.lock().await;
        if state.snapshot.expand_all() {
            drop(state);
            self.notify();
        }
    }

    /// Flip whether dot-prefixed entries are listed and reload the current
    /// repository with the new setting. Returns the new setting.
    pub async fn toggle_hidden(&self) -> bool {
        let show_hidden = !self.inner.browser.show_hidden();
        self.inner.browser.set_show_hidden(show_hidden);
        tracing::debug!("Hidden entries {}", if show_hidden { "shown" } else { "hidden" });
        self.refresh().await;
        show_hidden
    }
}
