use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::document::DocumentField;
use crate::errors::AppError;
use crate::export::file_name_for;
use crate::state::AppState;

/// GET /api/v1/exports/:file
///
/// Serves the most recent `downloadPdfs` output. Only the two export names are
/// accepted, so the path segment never reaches the filesystem unchecked.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let known = DocumentField::ALL
        .iter()
        .any(|f| file_name_for(f.export_name()) == file);
    if !known {
        return Err(AppError::NotFound(format!("Unknown export '{file}'")));
    }

    let bytes = state.sink.open(&file).await?;
    let disposition = format!("attachment; filename=\"{file}\"");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}
