//! API route handlers - the presenting surface over the tree model.
//!
//! Each submodule defines routes for a feature area:
//! - `tree`: File tree model operations (load, toggle, select, ...)
//! - `repository`: Registered repositories and raw directory listings

pub mod repository;
pub mod tree;

use axum::Router;
use std::sync::Arc;

use crate::browser::GitBrowser;
use crate::file_tree::FileTreeModel;

pub fn create_router(model: FileTreeModel, browser: Arc<GitBrowser>) -> Router {
    Router::new()
        .merge(tree::routes(model))
        .merge(repository::routes(browser))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::tree::tests::fixture_repo;
    use crate::registry::RepositoryRegistry;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Fixture {
        router: Router,
        _repo: TempDir,
        _state: TempDir,
    }

    fn fixture() -> Fixture {
        let repo = fixture_repo();
        let state = TempDir::new().unwrap();
        let dir = state.path().join("repositories");
        fs::create_dir_all(&dir).unwrap();
        let record = json!({
            "repo_id": "demo",
            "name": "demo",
            "path": repo.path().to_string_lossy(),
        });
        fs::write(dir.join("demo.json"), record.to_string()).unwrap();

        let browser = Arc::new(GitBrowser::new(RepositoryRegistry::new(state.path()), false));
        let model = FileTreeModel::new(browser.clone());
        Fixture {
            router: create_router(model, browser),
            _repo: repo,
            _state: state,
        }
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn row_paths(view: &Value) -> Vec<String> {
        view["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["path"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn load_toggle_and_select_through_the_api() {
        let fixture = fixture();
        let router = &fixture.router;

        let (status, view) = send(router, Method::POST, "/api/v1/tree/load", Some(json!({"repository_id": "demo"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["repository_id"], "demo");
        assert_eq!(row_paths(&view), vec!["docs", "src", "README.md"]);

        let (_, view) = send(router, Method::POST, "/api/v1/tree/toggle", Some(json!({"index_path": [1]}))).await;
        assert_eq!(
            row_paths(&view),
            vec!["docs", "src", "src/util", "src/index.ts", "README.md"]
        );
        assert_eq!(view["rows"][1]["state"], "expanded");

        let (_, view) = send(router, Method::POST, "/api/v1/tree/select", Some(json!({"path": "src/index.ts"}))).await;
        assert_eq!(view["snapshot"]["selected_path"], "src/index.ts");
        assert_eq!(view["rows"][3]["is_selected"], true);

        let (_, view) = send(router, Method::POST, "/api/v1/tree/collapse-all", None).await;
        assert_eq!(row_paths(&view), vec!["docs", "src", "README.md"]);

        let (_, view) = send(router, Method::GET, "/api/v1/tree", None).await;
        assert_eq!(view["generation"], 1);
    }

    #[tokio::test]
    async fn stale_toggle_is_accepted_and_changes_nothing() {
        let fixture = fixture();
        let router = &fixture.router;
        send(router, Method::POST, "/api/v1/tree/load", Some(json!({"repository_id": "demo"}))).await;

        let (status, view) = send(router, Method::POST, "/api/v1/tree/toggle", Some(json!({"index_path": [9, 9]}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_paths(&view), vec!["docs", "src", "README.md"]);
    }

    #[tokio::test]
    async fn loading_an_unknown_repository_yields_an_empty_tree() {
        let fixture = fixture();
        let (status, view) = send(
            &fixture.router,
            Method::POST,
            "/api/v1/tree/load",
            Some(json!({"repository_id": "missing"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(view["rows"].as_array().unwrap().is_empty());
        assert_eq!(view["snapshot"]["is_loading"], false);
    }

    #[tokio::test]
    async fn repository_endpoints_list_and_browse() {
        let fixture = fixture();
        let router = &fixture.router;

        let (status, repos) = send(router, Method::GET, "/api/v1/repositories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(repos[0]["repo_id"], "demo");

        let (status, entries) = send(router, Method::GET, "/api/v1/repositories/demo/tree?path=src", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entries[0]["path"], "src/util");
        assert_eq!(entries[0]["entry_type"], "directory");

        let (status, info) = send(router, Method::GET, "/api/v1/repositories/demo", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(info["is_empty"], false);
    }

    #[tokio::test]
    async fn repository_errors_map_to_status_codes() {
        let fixture = fixture();
        let router = &fixture.router;

        let (status, body) = send(router, Method::GET, "/api/v1/repositories/missing/tree", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("missing"));

        let (status, _) = send(router, Method::GET, "/api/v1/repositories/demo/tree?path=README.md", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn toggle_hidden_and_expand_all_through_the_api() {
        let fixture = fixture();
        let router = &fixture.router;
        send(router, Method::POST, "/api/v1/tree/load", Some(json!({"repository_id": "demo"}))).await;

        let (status, view) = send(router, Method::POST, "/api/v1/tree/toggle-hidden", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["show_hidden"], true);
        assert_eq!(view["generation"], 2);
        assert_eq!(row_paths(&view), vec!["docs", "src", ".gitignore", "README.md"]);

        send(router, Method::POST, "/api/v1/tree/toggle", Some(json!({"index_path": [1]}))).await;
        send(router, Method::POST, "/api/v1/tree/collapse-all", None).await;
        let (_, view) = send(router, Method::POST, "/api/v1/tree/expand-all", None).await;
        assert_eq!(
            row_paths(&view),
            vec!["docs", "src", "src/util", "src/index.ts", ".gitignore", "README.md"]
        );

        let (_, view) = send(router, Method::POST, "/api/v1/tree/toggle-hidden", None).await;
        assert_eq!(view["show_hidden"], false);
        assert_eq!(row_paths(&view), vec!["docs", "src", "README.md"]);
    }

    #[tokio::test]
    async fn rows_carry_working_copy_status() {
        let fixture = fixture();
        let router = &fixture.router;
        fs::write(fixture._repo.path().join("README.md"), "# edited\n").unwrap();

        let (_, view) = send(router, Method::POST, "/api/v1/tree/load", Some(json!({"repository_id": "demo"}))).await;
        assert_eq!(view["rows"][0]["status"], "clean");
        assert_eq!(view["rows"][2]["path"], "README.md");
        assert_eq!(view["rows"][2]["status"], "modified");
    }

    #[tokio::test]
    async fn selected_node_is_null_until_materialized() {
        let fixture = fixture();
        let router = &fixture.router;
        send(router, Method::POST, "/api/v1/tree/load", Some(json!({"repository_id": "demo"}))).await;
        send(router, Method::POST, "/api/v1/tree/select", Some(json!({"path": "src/index.ts"}))).await;

        let (status, node) = send(router, Method::GET, "/api/v1/tree/selected", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(node, Value::Null);

        send(router, Method::POST, "/api/v1/tree/toggle", Some(json!({"index_path": [1]}))).await;
        let (_, node) = send(router, Method::GET, "/api/v1/tree/selected", None).await;
        assert_eq!(node["name"], "index.ts");
        assert_eq!(node["status"], "clean");
    }
}
