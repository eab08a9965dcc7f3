// Session document: the cover letter / résumé pair the agent edits.
// Mutated only through the action registry; everything else reads.

pub mod handlers;
pub mod store;

pub use store::{Document, DocumentChange, DocumentField, DocumentStore, Subscription};
