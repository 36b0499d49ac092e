//! Repository registry backed by the Solo Git state directory.
//!
//! Each registered repository is a JSON record at
//! `<state_dir>/repositories/<repo_id>.json` whose `path` points at the
//! working copy on disk. The registry only reads; registration happens
//! elsewhere.

use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::RepositoryRecord;

#[derive(Debug, Clone)]
pub struct RepositoryRegistry {
    state_dir: PathBuf,
}

impl RepositoryRegistry {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Default location: `~/.sologit/state`.
    pub fn default_state_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".sologit").join("state"))
    }

    fn repositories_dir(&self) -> PathBuf {
        self.state_dir.join("repositories")
    }

    pub fn lookup(&self, repo_id: &str) -> Result<RepositoryRecord> {
        validate_repo_id(repo_id)?;

        let path = self.repositories_dir().join(format!("{}.json", repo_id));
        if !path.exists() {
            return Err(AppError::RepoNotFound(repo_id.to_string()));
        }

        let contents = fs::read_to_string(&path)?;
        let record: RepositoryRecord = serde_json::from_str(&contents)?;
        Ok(record)
    }

    /// All registered repositories, sorted by name.
    pub fn list(&self) -> Result<Vec<RepositoryRecord>> {
        let dir = self.repositories_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!("Skipping unreadable record {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<RepositoryRecord>(&contents) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping malformed record {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(records)
    }
}

fn validate_repo_id(repo_id: &str) -> Result<()> {
    let trimmed = repo_id.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
    {
        return Err(AppError::InvalidPath(repo_id.to_string()));
    }
    Ok(())
}
