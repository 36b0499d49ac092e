//! File tree endpoints driving the shared `FileTreeModel`.
//!
//! - GET  /api/v1/tree               current snapshot and visible rows
//! - GET  /api/v1/tree/selected      the selected node, null when not loaded
//! - POST /api/v1/tree/load          { repository_id }
//! - POST /api/v1/tree/refresh
//! - POST /api/v1/tree/toggle        { index_path: [usize] }
//! - POST /api/v1/tree/select        { path } (null clears the selection)
//! - POST /api/v1/tree/collapse-all
//! - POST /api/v1/tree/expand-all    expands loaded directories only
//! - POST /api/v1/tree/toggle-hidden show or hide dotfiles and reload
//!
//! Every mutating endpoint answers with the resulting `TreeView`. Tree operations
//! never fail; stale toggles simply leave the view unchanged.

use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::Deserialize;

use crate::file_tree::{FileTreeModel, FileTreeNode, TreeView};

pub fn routes(model: FileTreeModel) -> Router {
    Router::new()
        .route("/api/v1/tree", get(get_tree))
        .route("/api/v1/tree/load", post(load_tree))
        .route("/api/v1/tree/refresh", post(refresh_tree))
        .route("/api/v1/tree/toggle", post(toggle_directory))
        .route("/api/v1/tree/select", post(select_path))
        .route("/api/v1/tree/selected", get(get_selected))
        .route("/api/v1/tree/collapse-all", post(collapse_all))
        .route("/api/v1/tree/expand-all", post(expand_all))
        .route("/api/v1/tree/toggle-hidden", post(toggle_hidden))
        .with_state(model)
}

async fn get_tree(State(model): State<FileTreeModel>) -> Json<TreeView> {
    Json(model.view().await)
}

async fn get_selected(State(model): State<FileTreeModel>) -> Json<Option<FileTreeNode>> {
    Json(model.selected_node().await)
}

#[derive(Debug, Deserialize)]
struct LoadRequest {
    repository_id: String,
}

async fn load_tree(
    State(model): State<FileTreeModel>,
    Json(request): Json<LoadRequest>,
) -> Json<TreeView> {
    model.load_roots(&request.repository_id).await;
    Json(model.view().await)
}

async fn refresh_tree(State(model): State<FileTreeModel>) -> Json<TreeView> {
    model.refresh().await;
    Json(model.view().await)
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    index_path: Vec<usize>,
}

async fn toggle_directory(
    State(model): State<FileTreeModel>,
    Json(request): Json<ToggleRequest>,
) -> Json<TreeView> {
    model.toggle_directory(&request.index_path).await;
    Json(model.view().await)
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    path: Option<String>,
}

async fn select_path(
    State(model): State<FileTreeModel>,
    Json(request): Json<SelectRequest>,
) -> Json<TreeView> {
    match request.path.as_deref() {
        Some(path) => model.select_path(path).await,
        None => model.clear_selection().await,
    }
    Json(model.view().await)
}

async fn collapse_all(State(model): State<FileTreeModel>) -> Json<TreeView> {
    model.collapse_all().await;
    Json(model.view().await)
}

async fn expand_all(State(model): State<FileTreeModel>) -> Json<TreeView> {
    model.expand_all().await;
    Json(model.view().await)
}

async fn toggle_hidden(State(model): State<FileTreeModel>) -> Json<TreeView> {
    model.toggle_hidden().await;
    Json(model.view().await)
}
