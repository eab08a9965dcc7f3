use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::actions::ActionError;
use crate::export::ExportError;
use crate::llm_client::RelayError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn export_status(e: &ExportError) -> (StatusCode, &'static str, String) {
    match e {
        ExportError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        _ => {
            tracing::error!("Export error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXPORT_ERROR",
                e.to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidBody(rejection) => {
                (rejection.status(), "INVALID_BODY", rejection.body_text())
            }
            AppError::Action(e) => match e {
                ActionError::UnknownAction(_) => {
                    (StatusCode::NOT_FOUND, "UNKNOWN_ACTION", e.to_string())
                }
                ActionError::MissingArgument { .. } => {
                    (StatusCode::BAD_REQUEST, "MISSING_ARGUMENT", e.to_string())
                }
                ActionError::DuplicateAction(_) => {
                    (StatusCode::CONFLICT, "DUPLICATE_ACTION", e.to_string())
                }
                ActionError::Export(inner) => export_status(inner),
            },
            AppError::Export(e) => export_status(e),
            AppError::Relay(e) => match e {
                RelayError::NotConfigured => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CHAT_NOT_CONFIGURED",
                    e.to_string(),
                ),
                RelayError::InvalidRequest(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                RelayError::Http(_) | RelayError::Api { .. } => {
                    tracing::error!("Chat relay error: {e}");
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
