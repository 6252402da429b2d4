use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{AppError, SuccessResponse};
use crate::services::progress::ProgressError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:user_id", get(get_progress))
        .route("/:user_id/exercises", post(record_exercise))
        .route("/:user_id/memorized", get(memorized_words))
        .route("/:user_id/memorized", post(set_memorized))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemorizedRequest {
    greek: String,
    memorized: bool,
}

fn map_err(err: ProgressError) -> AppError {
    match err {
        ProgressError::Store(err) => {
            tracing::error!(error = %err, "progress store failure");
            AppError::internal("failed to access progress")
        }
    }
}

async fn get_progress(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    match state.progress().get_progress(&user_id).await {
        Ok(progress) => Json(SuccessResponse::new(progress)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn record_exercise(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    match state.progress().record_exercise(&user_id).await {
        Ok(progress) => Json(SuccessResponse::new(progress)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn memorized_words(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    match state.progress().memorized_words(&user_id).await {
        Ok(words) => Json(SuccessResponse::new(words)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn set_memorized(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<MemorizedRequest>,
) -> Response {
    if body.greek.trim().is_empty() {
        return AppError::validation("greek text is required").into_response();
    }
    match state
        .progress()
        .set_memorized(&user_id, body.greek.trim(), body.memorized)
        .await
    {
        Ok(words) => Json(SuccessResponse::new(words)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}
