//! Serializes the session into labelled context strings and keeps them current.
//!
//! Field entries are `label + JSON string literal` (`Cover Letter:"..."`), so
//! the exact field text is always recoverable with [`parse_field`]. Nothing is
//! truncated or summarized.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::context::ContextError;
use crate::document::{Document, DocumentChange, DocumentField, DocumentStore, Subscription};
use crate::profile::Profile;

pub const PROFILE_LABEL: &str = "Profile:";

fn field_label(field: DocumentField) -> &'static str {
    match field {
        DocumentField::Letter => "Cover Letter:",
        DocumentField::Resume => "Resume:",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────────────

/// Whole-document snapshot: `{"letter": ..., "resume": ...}`.
pub fn serialize_document(document: &Document) -> String {
    json!({
        "letter": document.letter,
        "resume": document.resume,
    })
    .to_string()
}

pub fn parse_document(snapshot: &str) -> Result<Document, ContextError> {
    Ok(serde_json::from_str(snapshot)?)
}

/// `Cover Letter:"..."` / `Resume:"..."`.
pub fn serialize_field(field: DocumentField, text: &str) -> String {
    format!("{}{}", field_label(field), Value::String(text.to_string()))
}

/// Recovers the exact field text from [`serialize_field`] output.
pub fn parse_field(field: DocumentField, entry: &str) -> Result<String, ContextError> {
    let expected = field_label(field);
    let literal = entry
        .strip_prefix(expected)
        .ok_or(ContextError::MissingLabel { expected })?;
    Ok(serde_json::from_str::<String>(literal)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Published context
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextEntry {
    pub label: &'static str,
    pub value: String,
}

impl ContextEntry {
    pub fn render(&self) -> String {
        format!("{}{}", self.label, self.value)
    }
}

/// Everything the agent can read, tagged with the document revision it reflects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadableContext {
    pub revision: u64,
    pub entries: Vec<ContextEntry>,
}

impl ReadableContext {
    fn build(revision: u64, document: &Document, profile: Option<&Profile>) -> Self {
        let mut entries = Vec::with_capacity(3);

        if let Some(profile) = profile {
            match serde_json::to_string(profile) {
                Ok(value) => entries.push(ContextEntry {
                    label: PROFILE_LABEL,
                    value,
                }),
                Err(e) => warn!(error = %e, "Profile could not be serialized; omitting from context"),
            }
        }

        for field in DocumentField::ALL {
            entries.push(ContextEntry {
                label: field_label(field),
                value: Value::String(document.field(field).to_string()).to_string(),
            });
        }

        Self { revision, entries }
    }

    pub fn entry(&self, label: &str) -> Option<&ContextEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// One rendered entry per line.
    pub fn to_prompt_string(&self) -> String {
        self.entries
            .iter()
            .map(ContextEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct Published {
    revision: u64,
    document: Document,
    profile: Option<Profile>,
}

struct Inner {
    state: Mutex<Published>,
    latest: watch::Sender<ReadableContext>,
}

impl Inner {
    /// Takes a committed change. Older revisions than the one already
    /// published are ignored.
    fn accept(&self, change: &DocumentChange) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if change.revision < state.revision {
            return;
        }
        state.revision = change.revision;
        state.document = change.document.clone();
        self.publish(&state);
    }

    fn publish(&self, state: &Published) {
        let context = ReadableContext::build(state.revision, &state.document, state.profile.as_ref());
        debug!(
            revision = context.revision,
            entries = context.entries.len(),
            "Readable context republished"
        );
        self.latest.send_replace(context);
    }
}

/// Keeps a [`ReadableContext`] in step with a [`DocumentStore`].
///
/// Cloning shares the same subscription; the last clone dropped unsubscribes.
#[derive(Clone)]
pub struct ContextExporter {
    inner: Arc<Inner>,
    _subscription: Arc<Subscription>,
}

impl ContextExporter {
    pub fn attach(store: &DocumentStore) -> Self {
        let empty = Published {
            revision: 0,
            document: Document::default(),
            profile: None,
        };
        let (latest, _) = watch::channel(ReadableContext::build(0, &empty.document, None));
        let inner = Arc::new(Inner {
            state: Mutex::new(empty),
            latest,
        });

        let listener = inner.clone();
        let subscription = store.subscribe(move |change| listener.accept(change));
        // Catch up on anything committed before the subscription existed.
        inner.accept(&store.read_change());

        Self {
            inner,
            _subscription: Arc::new(subscription),
        }
    }

    /// Whole-document snapshot of the last published revision.
    pub fn snapshot(&self) -> String {
        serialize_document(&self.state().document)
    }

    pub fn snapshot_field(&self, field: DocumentField) -> String {
        serialize_field(field, self.state().document.field(field))
    }

    pub fn current(&self) -> ReadableContext {
        self.inner.latest.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ReadableContext> {
        self.inner.latest.subscribe()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state().profile.clone()
    }

    /// Replaces the profile entry and republishes. `None` removes the entry.
    pub fn set_profile(&self, profile: Option<Profile>) {
        let mut state = self.state();
        state.profile = profile;
        self.inner.publish(&state);
    }

    fn state(&self) -> std::sync::MutexGuard<'_, Published> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
