mod health;
mod lists;
mod practice;
mod progress;
mod words;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::routes())
        .nest("/api/lists", lists::routes())
        .nest("/api/progress", progress::routes())
        .nest("/api/daily-practice", practice::routes())
        .nest("/api/words", words::routes())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}
