//! Application error types and HTTP response mapping.
//!
//! - `AppError`: failures of the repository browsing service and registry.
//!   Implements Axum's `IntoResponse` so handlers can return it directly.
//! - `TreeError`: the two failure kinds of the file tree model. These never
//!   leave the model; they are logged and turned into no-ops there.
//!
//! Error mappings:
//! - `RepoNotFound`, `PathNotFound` → 404
//! - `InvalidPath` → 400
//! - `Git`, `Io`, `Json`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::RepoNotFound(_) | AppError::PathNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::Git(_) | AppError::Io(_) | AppError::Json(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures inside the file tree model.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The browsing service call errored.
    #[error("Fetch failed: {0}")]
    FetchFailed(#[source] AppError),

    /// The operation was computed against a tree shape or generation that
    /// is no longer current.
    #[error("Stale operation: {0}")]
    StaleOperation(String),
}
