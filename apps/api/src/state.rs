use std::sync::Arc;

use anyhow::Result;

use crate::actions::ActionRegistry;
use crate::config::Config;
use crate::context::ContextExporter;
use crate::document::DocumentStore;
use crate::export::{FileSink, PdfExporter, PdfSink};
use crate::layout::PageGeometry;
use crate::llm_client::ChatRelay;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The session document. Handlers only read it; writes go through `registry`.
    pub store: DocumentStore,
    pub registry: Arc<ActionRegistry>,
    pub context: ContextExporter,
    /// Where `downloadPdfs` writes and `/exports` reads.
    pub sink: Arc<dyn PdfSink>,
    pub relay: ChatRelay,
}

impl AppState {
    /// Wires a fresh session: empty document, context attached, the four
    /// actions registered against the A4 export geometry.
    pub fn build(config: &Config) -> Result<Self> {
        let store = DocumentStore::new();
        let context = ContextExporter::attach(&store);
        let sink: Arc<dyn PdfSink> = Arc::new(FileSink::new(config.export_dir.clone()));
        let exporter = PdfExporter::new(
            PageGeometry::a4_export().with_markdown(config.export_markdown),
            sink.clone(),
        );
        let registry = ActionRegistry::with_canonical_actions(store.clone(), exporter)?;
        let relay = ChatRelay::new(
            config.openai_api_key.clone(),
            config.chat_api_url.clone(),
            config.chat_model.clone(),
        )?;

        Ok(Self {
            store,
            registry: Arc::new(registry),
            context,
            sink,
            relay,
        })
    }
}
