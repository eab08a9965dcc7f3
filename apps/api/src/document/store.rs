//! In-memory document store with publish-on-write subscriptions.
//!
//! There is exactly one `Document` per process. `write` is serialized behind a
//! single-writer lock: the mutator runs, the result becomes the current value,
//! and every listener is called with the new `DocumentChange` before `write`
//! returns. Listeners therefore see a gap-free, strictly increasing sequence of
//! revisions.
//!
//! Async consumers that only care about the latest value use [`DocumentStore::watch`].
//!
//! Listeners run while the writer lock is held. They must not call `write`,
//! `subscribe` or drop a `Subscription` of the same store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Document model
// ────────────────────────────────────────────────────────────────────────────

/// The two markdown fields under management.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub letter: String,
    pub resume: String,
}

impl Document {
    pub fn new(letter: impl Into<String>, resume: impl Into<String>) -> Self {
        Self {
            letter: letter.into(),
            resume: resume.into(),
        }
    }

    pub fn field(&self, field: DocumentField) -> &str {
        match field {
            DocumentField::Letter => &self.letter,
            DocumentField::Resume => &self.resume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    Letter,
    Resume,
}

impl DocumentField {
    pub const ALL: [DocumentField; 2] = [DocumentField::Letter, DocumentField::Resume];

    /// Human-readable label used in the agent's readable context.
    pub fn label(self) -> &'static str {
        match self {
            DocumentField::Letter => "Cover Letter",
            DocumentField::Resume => "Resume",
        }
    }

    /// Base name of the exported PDF for this field.
    pub fn export_name(self) -> &'static str {
        match self {
            DocumentField::Letter => "coverLetter",
            DocumentField::Resume => "resume",
        }
    }

    /// Parses the snake_case path form (`letter`, `resume`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "letter" => Some(DocumentField::Letter),
            "resume" => Some(DocumentField::Resume),
            _ => None,
        }
    }
}

/// A committed document state as seen by subscribers.
///
/// `revision` is 0 for the initial empty document and grows by exactly one per write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentChange {
    pub revision: u64,
    pub document: Document,
    pub committed_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

type Listener = Box<dyn Fn(&DocumentChange) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

struct Shared {
    current: RwLock<DocumentChange>,
    /// Single-writer lock. Also guards the listener table so a listener
    /// registered mid-write never sees a partial publish.
    writer: Mutex<Listeners>,
    latest: watch::Sender<DocumentChange>,
}

/// Cheaply cloneable handle to the session document.
#[derive(Clone)]
pub struct DocumentStore {
    shared: Arc<Shared>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Creates a store holding an empty document at revision 0.
    pub fn new() -> Self {
        let initial = DocumentChange {
            revision: 0,
            document: Document::default(),
            committed_at: Utc::now(),
        };
        let (latest, _) = watch::channel(initial.clone());
        Self {
            shared: Arc::new(Shared {
                current: RwLock::new(initial),
                writer: Mutex::new(Listeners::default()),
                latest,
            }),
        }
    }

    /// Returns the current document.
    pub fn read(&self) -> Document {
        self.read_change().document
    }

    /// Returns the current document together with its revision.
    pub fn read_change(&self) -> DocumentChange {
        self.shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn revision(&self) -> u64 {
        self.shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }

    /// Applies `mutator` to the current document, commits the result and
    /// notifies every subscriber before returning.
    pub fn write<F>(&self, mutator: F) -> DocumentChange
    where
        F: FnOnce(&Document) -> Document,
    {
        let listeners = self
            .shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = self.read_change();
        let change = DocumentChange {
            revision: previous.revision + 1,
            document: mutator(&previous.document),
            committed_at: Utc::now(),
        };

        *self
            .shared
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = change.clone();

        for listener in listeners.entries.values() {
            listener(&change);
        }
        self.shared.latest.send_replace(change.clone());

        debug!(
            revision = change.revision,
            letter_len = change.document.letter.len(),
            resume_len = change.document.resume.len(),
            listeners = listeners.entries.len(),
            "Document committed"
        );

        change
    }

    /// Registers a synchronous listener called once per committed write, in commit order.
    ///
    /// The listener stays registered until the returned handle is dropped or
    /// [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DocumentChange) + Send + Sync + 'static,
    {
        let mut listeners = self
            .shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Box::new(listener));

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Async view of the latest committed change. Intermediate values may be
    /// coalesced; use [`DocumentStore::subscribe`] when every write matters.
    pub fn watch(&self) -> watch::Receiver<DocumentChange> {
        self.shared.latest.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("revision", &self.revision())
            .finish()
    }
}

/// Handle returned by [`DocumentStore::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared
                .writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .remove(&self.id);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
