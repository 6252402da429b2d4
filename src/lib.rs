#![allow(dead_code)]

pub mod config;
pub mod lexicon;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::lexicon::Lexicon;
use crate::state::AppState;
use crate::store::JsonStore;

pub fn build_app(store: Arc<JsonStore>, lexicon: Arc<Lexicon>) -> axum::Router {
    let state = AppState::new(store, lexicon);
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn create_app() -> axum::Router {
    let config = Config::from_env();

    let store = Arc::new(JsonStore::new(&config.data_dir));
    if let Err(err) = store.ensure_dirs().await {
        tracing::warn!(error = %err, "data directory not ready");
    }

    let lexicon = match config.lexicon_path.as_deref() {
        Some(path) => Arc::new(Lexicon::load_or_seed(path)),
        None => Arc::new(Lexicon::seed()),
    };

    build_app(store, lexicon)
}
