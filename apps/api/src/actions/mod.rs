// Agent-invocable actions: schema for discovery, typed command table,
// and the registry that commits them to the document store.

pub mod descriptor;
pub mod handlers;
pub mod kinds;
pub mod registry;

use thiserror::Error;

use crate::export::ExportError;

pub use descriptor::{ActionDescriptor, ParameterKind, ParameterSpec};
pub use kinds::{Action, ActionKind};
pub use registry::{ActionOutcome, ActionRegistry};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Action '{action}' is missing required argument '{argument}'")]
    MissingArgument {
        action: &'static str,
        argument: &'static str,
    },

    #[error("Action '{0}' is already registered")]
    DuplicateAction(&'static str),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

impl ActionError {
    /// True for errors raised before the document store was consulted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ActionError::UnknownAction(_)
                | ActionError::MissingArgument { .. }
                | ActionError::DuplicateAction(_)
        )
    }
}
