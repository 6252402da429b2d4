#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use ellinaki_backend::lexicon::Lexicon;
use ellinaki_backend::store::JsonStore;

static DATA_DIR: OnceLock<TempDir> = OnceLock::new();

fn data_dir() -> &'static TempDir {
    DATA_DIR.get_or_init(|| tempfile::tempdir().expect("tempdir"))
}

/// Fresh router over a process-shared temp data directory. Tests isolate
/// themselves by using distinct user ids.
pub async fn create_test_app() -> Router {
    let store = test_store();
    store.ensure_dirs().await.expect("data dirs");
    ellinaki_backend::build_app(store, Arc::new(Lexicon::seed()))
}

pub fn test_store() -> Arc<JsonStore> {
    Arc::new(JsonStore::new(data_dir().path()))
}

/// Greek words need percent-encoding before they can sit in a request path.
pub fn enc(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    };

    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}
