use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/chat
///
/// Streams the upstream completion back as-is. Errors before the first byte
/// become JSON errors; a stream that breaks midway is only logged.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let upstream = state.relay.forward(body).await?;

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/event-stream")
        .to_string();

    let stream = upstream
        .bytes_stream()
        .inspect_err(|e| warn!(error = %e, "Chat upstream stream interrupted"));

    Ok(([(header::CONTENT_TYPE, content_type)], Body::from_stream(stream)).into_response())
}
