use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
        .route("/info", get(info))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    start_time: String,
    lexicon_words: usize,
}

#[derive(Serialize)]
struct ProbeResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoResponse {
    service: &'static str,
    version: &'static str,
    start_time: String,
    uptime: u64,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn root(State(state): State<AppState>) -> Response {
    let start_time = DateTime::<Utc>::from(state.started_at_system())
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    Json(HealthResponse {
        status: "ok",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        start_time,
        lexicon_words: state.lexicon().len(),
    })
    .into_response()
}

async fn live() -> Response {
    Json(ProbeResponse {
        status: "healthy",
        timestamp: now_iso(),
    })
    .into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    Json(InfoResponse {
        service: "ellinaki-backend",
        version: env!("CARGO_PKG_VERSION"),
        start_time: DateTime::<Utc>::from(state.started_at_system())
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}
