use axum::{extract::State, Json};

use crate::document::DocumentChange;
use crate::state::AppState;

/// GET /api/v1/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<DocumentChange> {
    Json(state.store.read_change())
}
