use axum::{
    extract::{Path, State},
    Json,
};

use crate::context::ReadableContext;
use crate::document::DocumentField;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/context
pub async fn handle_get_context(State(state): State<AppState>) -> Json<ReadableContext> {
    Json(state.context.current())
}

/// GET /api/v1/context/document
pub async fn handle_get_document_snapshot(State(state): State<AppState>) -> String {
    state.context.snapshot()
}

/// GET /api/v1/context/fields/:field
pub async fn handle_get_field_snapshot(
    State(state): State<AppState>,
    Path(field): Path<String>,
) -> Result<String, AppError> {
    let field = DocumentField::parse(&field)
        .ok_or_else(|| AppError::NotFound(format!("Unknown document field '{field}'")))?;
    Ok(state.context.snapshot_field(field))
}
