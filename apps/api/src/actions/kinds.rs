//! The fixed command table.
//!
//! Each `ActionKind` has a typed argument struct and a pure transition on
//! `Document`. Agent-supplied string maps are parsed into an `Action` once, at
//! the boundary; after that every dispatch is an exhaustive `match`.

use std::collections::HashMap;

use crate::actions::descriptor::{ActionDescriptor, ParameterKind, ParameterSpec};
use crate::actions::ActionError;
use crate::document::Document;

// Parameter names are part of the agent-facing contract.
pub const COVER_LETTER_MARKDOWN: &str = "coverLetterMarkdown";
pub const RESUME_MARKDOWN: &str = "resumeMarkdown";
pub const UPDATE_COVER_LETTER_MARKDOWN: &str = "updateCoverLetterMarkdown";
pub const UPDATE_RESUME_MARKDOWN: &str = "updateResumeMarkdown";
pub const COVER_LETTER_PDF_A4: &str = "coverLetterPdfA4";
pub const RESUME_PDF_A4_PAPER: &str = "resumePdfA4Paper";

const COVER_LETTER_DESCRIPTION: &str = "Markdown text for a cover letter to introduce yourself \
    and briefly summarize your professional background as a software developer.";
const RESUME_DESCRIPTION: &str = "Markdown text for a resume that displays your professional \
    background and relevant skills.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateCoverLetterAndResume,
    UpdateCoverLetter,
    UpdateResume,
    DownloadPdfs,
}

impl ActionKind {
    /// Canonical registration order.
    pub const ALL: [ActionKind; 4] = [
        ActionKind::CreateCoverLetterAndResume,
        ActionKind::DownloadPdfs,
        ActionKind::UpdateCoverLetter,
        ActionKind::UpdateResume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::CreateCoverLetterAndResume => "createCoverLetterAndResume",
            ActionKind::UpdateCoverLetter => "updateCoverLetter",
            ActionKind::UpdateResume => "updateResume",
            ActionKind::DownloadPdfs => "downloadPdfs",
        }
    }

    pub fn descriptor(self) -> ActionDescriptor {
        let (description, parameters) = match self {
            ActionKind::CreateCoverLetterAndResume => (
                "Create a cover letter and resume for a software developer job application.",
                vec![
                    markdown(COVER_LETTER_MARKDOWN, COVER_LETTER_DESCRIPTION),
                    markdown(RESUME_MARKDOWN, RESUME_DESCRIPTION),
                ],
            ),
            ActionKind::UpdateCoverLetter => (
                "Update cover letter for a software developer job application.",
                vec![markdown(
                    UPDATE_COVER_LETTER_MARKDOWN,
                    "Update markdown text for a cover letter to introduce yourself and briefly \
                     summarize your professional background as a software developer.",
                )],
            ),
            ActionKind::UpdateResume => (
                "Update resume for a software developer job application.",
                vec![markdown(
                    UPDATE_RESUME_MARKDOWN,
                    "Update markdown text for a resume that displays your professional \
                     background and relevant skills.",
                )],
            ),
            ActionKind::DownloadPdfs => (
                "Download pdfs of the cover letter and resume.",
                vec![
                    short_text(
                        COVER_LETTER_PDF_A4,
                        "A Pdf that contains the cover letter converted from markdown text \
                         and fits A4 paper.",
                    ),
                    short_text(
                        RESUME_PDF_A4_PAPER,
                        "A Pdf that contains the resume converted from markdown text and \
                         fits A4 paper.",
                    ),
                ],
            ),
        };

        ActionDescriptor {
            name: self.name(),
            description,
            parameters,
            kind: self,
        }
    }

    /// Parses an agent-supplied argument map into a typed action.
    ///
    /// Fails with `MissingArgument` naming the first absent required parameter,
    /// in declaration order. An empty string counts as present.
    pub fn parse(self, args: &HashMap<String, String>) -> Result<Action, ActionError> {
        let take = |param: &'static str| required(args, self, param);

        Ok(match self {
            ActionKind::CreateCoverLetterAndResume => {
                Action::CreateCoverLetterAndResume(CreateCoverLetterAndResumeArgs {
                    cover_letter_markdown: take(COVER_LETTER_MARKDOWN)?,
                    resume_markdown: take(RESUME_MARKDOWN)?,
                })
            }
            ActionKind::UpdateCoverLetter => Action::UpdateCoverLetter(UpdateCoverLetterArgs {
                markdown: take(UPDATE_COVER_LETTER_MARKDOWN)?,
            }),
            ActionKind::UpdateResume => Action::UpdateResume(UpdateResumeArgs {
                markdown: take(UPDATE_RESUME_MARKDOWN)?,
            }),
            ActionKind::DownloadPdfs => Action::DownloadPdfs(DownloadPdfsArgs {
                cover_letter_confirmation: take(COVER_LETTER_PDF_A4)?,
                resume_confirmation: take(RESUME_PDF_A4_PAPER)?,
            }),
        })
    }
}

fn markdown(name: &'static str, description: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        kind: ParameterKind::Markdown,
        required: true,
        description,
    }
}

fn short_text(name: &'static str, description: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        kind: ParameterKind::ShortText,
        required: true,
        description,
    }
}

fn required(
    args: &HashMap<String, String>,
    kind: ActionKind,
    param: &'static str,
) -> Result<String, ActionError> {
    args.get(param)
        .cloned()
        .ok_or(ActionError::MissingArgument {
            action: kind.name(),
            argument: param,
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Typed arguments
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCoverLetterAndResumeArgs {
    pub cover_letter_markdown: String,
    pub resume_markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCoverLetterArgs {
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResumeArgs {
    pub markdown: String,
}

/// Confirmation text only. The export always reads the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPdfsArgs {
    pub cover_letter_confirmation: String,
    pub resume_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateCoverLetterAndResume(CreateCoverLetterAndResumeArgs),
    UpdateCoverLetter(UpdateCoverLetterArgs),
    UpdateResume(UpdateResumeArgs),
    DownloadPdfs(DownloadPdfsArgs),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateCoverLetterAndResume(_) => ActionKind::CreateCoverLetterAndResume,
            Action::UpdateCoverLetter(_) => ActionKind::UpdateCoverLetter,
            Action::UpdateResume(_) => ActionKind::UpdateResume,
            Action::DownloadPdfs(_) => ActionKind::DownloadPdfs,
        }
    }

    /// The pure state transition for this action.
    pub fn apply(&self, document: &Document) -> Document {
        match self {
            Action::CreateCoverLetterAndResume(args) => Document {
                letter: args.cover_letter_markdown.clone(),
                resume: args.resume_markdown.clone(),
            },
            Action::UpdateCoverLetter(args) => Document {
                letter: args.markdown.clone(),
                ..document.clone()
            },
            Action::UpdateResume(args) => Document {
                resume: args.markdown.clone(),
                ..document.clone()
            },
            Action::DownloadPdfs(_) => document.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
