//! Raw repository browsing endpoints.
//!
//! - GET /api/v1/repositories                 registered repositories
//! - GET /api/v1/repositories/{id}            repository info (HEAD branch/commit)
//! - GET /api/v1/repositories/{id}/tree?path= immediate entries of a directory

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::browser::{GitBrowser, RepositoryBrowser};
use crate::error::Result;
use crate::models::{RepositoryInfo, RepositoryRecord, TreeEntry};

pub fn routes(browser: Arc<GitBrowser>) -> Router {
    Router::new()
        .route("/api/v1/repositories", get(list_repositories))
        .route("/api/v1/repositories/{id}", get(get_repository_info))
        .route("/api/v1/repositories/{id}/tree", get(get_tree))
        .with_state(browser)
}

async fn list_repositories(State(browser): State<Arc<GitBrowser>>) -> Result<Json<Vec<RepositoryRecord>>> {
    let records = browser.records().await?;
    Ok(Json(records))
}

async fn get_repository_info(
    State(browser): State<Arc<GitBrowser>>,
    Path(id): Path<String>,
) -> Result<Json<RepositoryInfo>> {
    let info = browser.info(&id).await?;
    Ok(Json(info))
}

#[derive(Debug, Deserialize)]
struct TreeQuery {
    path: Option<String>,
}

async fn get_tree(
    State(browser): State<Arc<GitBrowser>>,
    Path(id): Path<String>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<TreeEntry>>> {
    let entries = match query.path.as_deref() {
        Some(path) if !path.trim_matches('/').is_empty() => browser.list_directory(&id, path).await?,
        _ => browser.list_roots(&id).await?,
    };
    Ok(Json(entries))
}
