use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::lexicon::{Level, WordRecord};
use crate::response::{AppError, SuccessResponse};
use crate::services::lists::ListError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:user_id", get(get_lists))
        .route("/:user_id", post(create_list))
        .route("/:user_id/:list_id", put(rename_list))
        .route("/:user_id/:list_id", delete(delete_list))
        .route("/:user_id/:list_id/words", post(add_word))
        .route("/:user_id/:list_id/words/:greek", delete(remove_word))
        .route("/:user_id/:list_id/words/:greek/learned", post(mark_learned))
        .route(
            "/:user_id/:list_id/words/:greek/learned",
            delete(unmark_learned),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordRequest {
    greek: String,
    english: String,
    pos: Option<String>,
    level: Option<String>,
}

impl WordRequest {
    fn into_record(self) -> Result<WordRecord, AppError> {
        let level = match self.level.as_deref() {
            Some(raw) => Some(
                raw.parse::<Level>()
                    .map_err(|_| AppError::validation("unknown level"))?,
            ),
            None => None,
        };
        Ok(WordRecord {
            greek: self.greek,
            english: self.english,
            part_of_speech: self.pos,
            level,
        })
    }
}

fn map_err(err: ListError) -> AppError {
    match err {
        ListError::Validation(message) => AppError::validation(message),
        ListError::Conflict(message) => AppError::conflict(message),
        ListError::NotFound(message) => AppError::not_found(message),
        ListError::Store(err) => {
            tracing::error!(error = %err, "list store failure");
            AppError::internal("failed to access word lists")
        }
    }
}

async fn get_lists(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    match state.lists().get_lists(&user_id).await {
        Ok(lists) => Json(SuccessResponse::new(lists)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn create_list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<ListRequest>,
) -> Response {
    match state.lists().create_list(&user_id, &body.name).await {
        Ok(list) => Json(SuccessResponse::new(list)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn rename_list(
    State(state): State<AppState>,
    Path((user_id, list_id)): Path<(String, String)>,
    Json(body): Json<ListRequest>,
) -> Response {
    match state.lists().rename_list(&user_id, &list_id, &body.name).await {
        Ok(list) => Json(SuccessResponse::new(list)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn delete_list(
    State(state): State<AppState>,
    Path((user_id, list_id)): Path<(String, String)>,
) -> Response {
    match state.lists().delete_list(&user_id, &list_id).await {
        Ok(()) => Json(SuccessResponse::new(serde_json::json!({ "deleted": list_id })))
            .into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn add_word(
    State(state): State<AppState>,
    Path((user_id, list_id)): Path<(String, String)>,
    Json(body): Json<WordRequest>,
) -> Response {
    let word = match body.into_record() {
        Ok(word) => word,
        Err(err) => return err.into_response(),
    };
    match state.lists().add_word(&user_id, &list_id, &word).await {
        Ok(list) => Json(SuccessResponse::new(list)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn remove_word(
    State(state): State<AppState>,
    Path((user_id, list_id, greek)): Path<(String, String, String)>,
) -> Response {
    match state.lists().remove_word(&user_id, &list_id, &greek).await {
        Ok(list) => Json(SuccessResponse::new(list)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn mark_learned(
    State(state): State<AppState>,
    Path((user_id, list_id, greek)): Path<(String, String, String)>,
) -> Response {
    match state.lists().mark_learned(&user_id, &list_id, &greek).await {
        Ok(list) => Json(SuccessResponse::new(list)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}

async fn unmark_learned(
    State(state): State<AppState>,
    Path((user_id, list_id, greek)): Path<(String, String, String)>,
) -> Response {
    match state.lists().unmark_learned(&user_id, &list_id, &greek).await {
        Ok(list) => Json(SuccessResponse::new(list)).into_response(),
        Err(err) => map_err(err).into_response(),
    }
}
