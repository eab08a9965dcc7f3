//! Discovery-facing action schema.
//!
//! This is what an agent runtime reads to learn which actions exist and what
//! arguments they take. It is derived from `ActionKind`; nothing dispatches on it.

use serde::Serialize;

use crate::actions::kinds::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Single-line free text.
    ShortText,
    /// Long-form markdown document text.
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
    #[serde(skip)]
    pub kind: ActionKind,
}

impl ActionDescriptor {
    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
