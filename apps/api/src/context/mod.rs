// Readable context: the plain-text view of the session an agent runtime is
// given on every turn. Republished whenever the document or profile changes.

pub mod exporter;
pub mod handlers;

use thiserror::Error;

pub use exporter::{
    parse_document, parse_field, serialize_document, serialize_field, ContextEntry,
    ContextExporter, ReadableContext,
};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Context string does not start with '{expected}'")]
    MissingLabel { expected: &'static str },

    #[error("Malformed context payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
