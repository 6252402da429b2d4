use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::lexicon::Level;
use crate::response::{AppError, SuccessResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    level: Option<String>,
}

async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let level = match query.level.as_deref() {
        Some(raw) => match raw.parse::<Level>() {
            Ok(level) => Some(level),
            Err(_) => return AppError::validation("unknown level").into_response(),
        },
        None => None,
    };

    let lexicon = state.lexicon();
    let hits: Vec<_> = lexicon
        .search(query.q.as_deref().unwrap_or(""), level)
        .into_iter()
        .cloned()
        .collect();
    Json(SuccessResponse::new(hits)).into_response()
}
