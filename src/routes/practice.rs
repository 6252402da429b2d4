use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::lexicon::Level;
use crate::response::{AppError, SuccessResponse};
use crate::services::daily_practice::PracticeError;
use crate::services::lists::ListError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:user_id", get(get_practice))
        .route("/:user_id/setup", post(setup))
        .route("/:user_id/level", put(change_level))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelRequest {
    level: String,
}

impl LevelRequest {
    fn parse(&self) -> Result<Level, AppError> {
        self.level
            .parse::<Level>()
            .map_err(|_| AppError::validation("unknown level"))
    }
}

fn map_err(err: PracticeError) -> AppError {
    match err {
        PracticeError::Store(err) => {
            tracing::error!(error = %err, "daily practice store failure");
            AppError::internal("failed to access daily practice")
        }
        PracticeError::Lists(ListError::Store(err)) => {
            tracing::error!(error = %err, "list store failure");
            AppError::internal("failed to access word lists")
        }
        PracticeError::Lists(err) => {
            tracing::error!(error = %err, "unexpected list failure");
            AppError::internal("failed to access word lists")
        }
    }
}

async fn get_practice(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    match state.practice().get(&user_id).await {
        Ok(status) => Json(SuccessResponse::new(status)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn setup(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<LevelRequest>,
) -> Response {
    set_level(state, user_id, body).await
}

async fn change_level(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<LevelRequest>,
) -> Response {
    set_level(state, user_id, body).await
}

async fn set_level(state: AppState, user_id: String, body: LevelRequest) -> Response {
    let level = match body.parse() {
        Ok(level) => level,
        Err(err) => return err.into_response(),
    };
    match state.practice().set_level(&user_id, level).await {
        Ok(practice) => Json(SuccessResponse::new(practice)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}
