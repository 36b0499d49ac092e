//! Registered repository record, stored as
//! `<state_dir>/repositories/<repo_id>.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub repo_id: String,
    pub name: String,
    pub path: String,
    #[serde(default = "default_trunk")]
    pub trunk_branch: String,
    #[serde(default)]
    pub current_commit: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_trunk() -> String {
    "main".to_string()
}
