//! PDF export of the session document.
//!
//! `PdfExporter` renders each document field with the fixed export geometry
//! (CPU-bound work in `spawn_blocking`), encodes the pages, and hands the file
//! to a `PdfSink`. Failures are returned to the caller; the document itself is
//! never touched by an export.

pub mod handlers;
pub mod pdf;
pub mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::document::{Document, DocumentField};
use crate::layout::{render, Page, PageGeometry, RenderError, RenderWarning};

pub use sink::{FileSink, PdfSink};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export '{0}' has not been generated yet")]
    NotFound(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF serialization failed: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("Export task failed: {0}")]
    Task(String),
}

/// A single emitted file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedFile {
    pub file_name: String,
    pub path: PathBuf,
    /// Pages in the written PDF (at least 1).
    pub page_count: usize,
    pub size_bytes: usize,
}

/// One exported document field, as reported back to the agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    pub field: DocumentField,
    #[serde(flatten)]
    pub file: EmittedFile,
    /// Wrapped lines laid out; 0 for an empty field.
    pub line_count: usize,
    pub warnings: Vec<RenderWarning>,
}

/// File name an export destination is saved under.
pub fn file_name_for(destination_name: &str) -> String {
    format!("{destination_name}.pdf")
}

/// Encodes `pages` as one PDF named `<destination_name>.pdf` and saves it via `sink`.
pub async fn emit(
    pages: Vec<Page>,
    geometry: &PageGeometry,
    destination_name: &str,
    sink: &dyn PdfSink,
) -> Result<EmittedFile, ExportError> {
    let page_count = pages.len().max(1);
    let geometry = geometry.clone();
    let bytes = tokio::task::spawn_blocking(move || pdf::encode_pdf(&pages, &geometry))
        .await
        .map_err(|e| ExportError::Task(format!("PDF encoding task failed: {e}")))??;

    let file_name = file_name_for(destination_name);
    let size_bytes = bytes.len();
    let path = sink.save(&file_name, bytes).await?;

    Ok(EmittedFile {
        file_name,
        path,
        page_count,
        size_bytes,
    })
}

/// Renders and emits document fields with a fixed geometry.
#[derive(Clone)]
pub struct PdfExporter {
    geometry: PageGeometry,
    sink: Arc<dyn PdfSink>,
}

impl PdfExporter {
    pub fn new(geometry: PageGeometry, sink: Arc<dyn PdfSink>) -> Self {
        Self { geometry, sink }
    }

    /// Exports the cover letter then the résumé, one file each.
    pub async fn export_document(
        &self,
        document: &Document,
    ) -> Result<Vec<ExportArtifact>, ExportError> {
        let mut artifacts = Vec::with_capacity(DocumentField::ALL.len());
        for field in DocumentField::ALL {
            artifacts.push(self.export_field(field, document.field(field)).await?);
        }
        Ok(artifacts)
    }

    pub async fn export_field(
        &self,
        field: DocumentField,
        text: &str,
    ) -> Result<ExportArtifact, ExportError> {
        let geometry = self.geometry.clone();
        let owned_text = text.to_string();
        let rendered = tokio::task::spawn_blocking(move || render(&owned_text, &geometry))
            .await
            .map_err(|e| ExportError::Task(format!("render task failed: {e}")))??;

        for warning in &rendered.warnings {
            warn!(field = ?field, warning = ?warning, "Exporting field with render warning");
        }

        let line_count = rendered.pages.iter().map(|p| p.lines.len()).sum();
        let file = emit(
            rendered.pages,
            &self.geometry,
            field.export_name(),
            self.sink.as_ref(),
        )
        .await?;

        info!(
            field = ?field,
            file = %file.file_name,
            pages = file.page_count,
            lines = line_count,
            "Field exported"
        );

        Ok(ExportArtifact {
            field,
            file,
            line_count,
            warnings: rendered.warnings,
        })
    }
}
