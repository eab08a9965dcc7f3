//! Action registry: the only writer of the document store.
//!
//! # Ordering
//! `invoke` holds a fair async mutex for its whole run, so invocations commit in
//! the order they were made and each runs to completion before the next
//! starts. Validation happens before the store is touched; the transition and
//! commit happen inside a single `DocumentStore::write`, so a failed action
//! leaves the document exactly as it was.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::actions::descriptor::ActionDescriptor;
use crate::actions::kinds::{Action, ActionKind};
use crate::actions::ActionError;
use crate::document::DocumentStore;
use crate::export::{ExportArtifact, PdfExporter};

/// Result of a successful invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub action: &'static str,
    /// Document revision after the action (unchanged for exports).
    pub revision: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<ExportArtifact>,
}

pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
    store: DocumentStore,
    exporter: PdfExporter,
    turn: Mutex<()>,
}

impl ActionRegistry {
    /// Creates a registry with no actions registered.
    pub fn new(store: DocumentStore, exporter: PdfExporter) -> Self {
        Self {
            descriptors: Vec::new(),
            store,
            exporter,
            turn: Mutex::new(()),
        }
    }

    /// Creates a registry with the four product actions registered.
    pub fn with_canonical_actions(
        store: DocumentStore,
        exporter: PdfExporter,
    ) -> Result<Self, ActionError> {
        let mut registry = Self::new(store, exporter);
        for kind in ActionKind::ALL {
            registry.register(kind)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, kind: ActionKind) -> Result<(), ActionError> {
        if self.descriptors.iter().any(|d| d.name == kind.name()) {
            return Err(ActionError::DuplicateAction(kind.name()));
        }
        debug!(action = kind.name(), "Action registered");
        self.descriptors.push(kind.descriptor());
        Ok(())
    }

    /// Registered actions, in registration order.
    pub fn list_actions(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    fn lookup(&self, name: &str) -> Result<&ActionDescriptor, ActionError> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))
    }

    /// Validates `args` against the named action and applies it.
    pub async fn invoke(
        &self,
        name: &str,
        args: &HashMap<String, String>,
    ) -> Result<ActionOutcome, ActionError> {
        let _turn = self.turn.lock().await;

        let descriptor = self.lookup(name)?;
        let action = descriptor.kind.parse(args).map_err(|e| {
            warn!(action = name, error = %e, "Action rejected");
            e
        })?;

        for key in args.keys() {
            if descriptor.parameter(key).is_none() {
                debug!(action = name, argument = %key, "Ignoring undeclared argument");
            }
        }

        match &action {
            Action::DownloadPdfs(_) => {
                let snapshot = self.store.read_change();
                let exports = self.exporter.export_document(&snapshot.document).await?;
                info!(
                    action = name,
                    revision = snapshot.revision,
                    files = exports.len(),
                    "Export action completed"
                );
                Ok(ActionOutcome {
                    action: descriptor.name,
                    revision: snapshot.revision,
                    exports,
                })
            }
            Action::CreateCoverLetterAndResume(_)
            | Action::UpdateCoverLetter(_)
            | Action::UpdateResume(_) => {
                let change = self.store.write(|document| action.apply(document));
                info!(action = name, revision = change.revision, "Action committed");
                Ok(ActionOutcome {
                    action: descriptor.name,
                    revision: change.revision,
                    exports: Vec::new(),
                })
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
