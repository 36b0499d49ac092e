//! Repository browsing service consumed by the file tree model.
//!
//! `RepositoryBrowser` is the narrow interface the model depends on: list
//! the top level of a repository, or the immediate contents of one
//! directory. `GitBrowser` implements it over HEAD trees, resolving
//! repository ids through the `RepositoryRegistry`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AppError, Result};
use crate::git::GitRepository;
use crate::models::{RepositoryInfo, RepositoryRecord, TreeEntry};
use crate::registry::RepositoryRegistry;

#[async_trait]
pub trait RepositoryBrowser: Send + Sync {
    /// Top-level entries of the repository, in display order.
    async fn list_roots(&self, repository_id: &str) -> Result<Vec<TreeEntry>>;

    /// Immediate entries of `directory_path`, in display order.
    async fn list_directory(&self, repository_id: &str, directory_path: &str) -> Result<Vec<TreeEntry>>;

    /// Whether dot-prefixed entries are included in listings.
    fn show_hidden(&self) -> bool;

    fn set_show_hidden(&self, show_hidden: bool);
}

pub type SharedBrowser = Arc<dyn RepositoryBrowser>;

pub struct GitBrowser {
    registry: RepositoryRegistry,
    show_hidden: AtomicBool,
    /// repo id -> opened repository, revalidated against the registry on use
    open_repos: Mutex<HashMap<String, Arc<GitRepository>>>,
}

impl GitBrowser {
    pub fn new(registry: RepositoryRegistry, show_hidden: bool) -> Self {
        Self {
            registry,
            show_hidden: AtomicBool::new(show_hidden),
            open_repos: Mutex::new(HashMap::new()),
        }
    }

    /// All registered repositories, read off the async runtime.
    pub async fn records(&self) -> Result<Vec<RepositoryRecord>> {
        let registry = self.registry.clone();
        run_blocking(move || registry.list()).await
    }

    fn open_repos(&self) -> Result<MutexGuard<'_, HashMap<String, Arc<GitRepository>>>> {
        self.open_repos
            .lock()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))
    }

    /// Resolve `repository_id` through the registry on every call. A cached
    /// repository is reused only while its record still points at the same
    /// working copy; re-pointed or removed records evict it.
    async fn repository(&self, repository_id: &str) -> Result<Arc<GitRepository>> {
        let registry = self.registry.clone();
        let id = repository_id.to_string();
        let record = match run_blocking(move || registry.lookup(&id)).await {
            Ok(record) => record,
            Err(e) => {
                if self.open_repos()?.remove(repository_id).is_some() {
                    tracing::debug!("Evicted repository {}: {}", repository_id, e);
                }
                return Err(e);
            }
        };

        let cached = self.open_repos()?.get(repository_id).cloned();
        if let Some(repo) = cached {
            if repo.path == record.path {
                return Ok(repo);
            }
            tracing::debug!(
                "Repository {} moved from {} to {}",
                repository_id,
                repo.path,
                record.path
            );
        }

        let path = record.path.clone();
        let repo = Arc::new(run_blocking(move || GitRepository::open(&path)).await?);
        tracing::debug!("Opened repository {} at {}", repository_id, record.path);
        self.open_repos()?
            .insert(repository_id.to_string(), repo.clone());
        Ok(repo)
    }

    pub async fn info(&self, repository_id: &str) -> Result<RepositoryInfo> {
        let repo = self.repository(repository_id).await?;
        let repository_id = repository_id.to_string();
        run_blocking(move || repo.info(&repository_id)).await
    }

    async fn list(&self, repository_id: &str, path: Option<String>) -> Result<Vec<TreeEntry>> {
        let repo = self.repository(repository_id).await?;
        let show_hidden = self.show_hidden();
        run_blocking(move || repo.get_tree_entries(path.as_deref(), show_hidden)).await
    }
}

async fn run_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

#[async_trait]
impl RepositoryBrowser for GitBrowser {
    async fn list_roots(&self, repository_id: &str) -> Result<Vec<TreeEntry>> {
        self.list(repository_id, None).await
    }

    async fn list_directory(&self, repository_id: &str, directory_path: &str) -> Result<Vec<TreeEntry>> {
        self.list(repository_id, Some(directory_path.to_string())).await
    }

    fn show_hidden(&self) -> bool {
        self.show_hidden.load(Ordering::Relaxed)
    }

    fn set_show_hidden(&self, show_hidden: bool) {
        self.show_hidden.store(show_hidden, Ordering::Relaxed);
    }
}
