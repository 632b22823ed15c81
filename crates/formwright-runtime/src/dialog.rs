#![forbid(unsafe_code)]

//! Non-blocking dialogs.
//!
//! The session never waits on the user. It returns a [`DialogRequest`] and
//! remembers what it was asking about; the host shows the dialog however it
//! likes and later sends the answer back as a [`DialogResponse`].

use std::fmt;

use formwright_core::{FieldDraft, FieldId};

/// Prompt shown while editing a label.
pub const EDIT_LABEL_PROMPT: &str = "Edit field label:";

/// Something the host must ask the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogRequest {
    /// Yes/no question.
    Confirm { message: String },
    /// Free-text question with a pre-filled answer.
    Prompt { message: String, default: String },
}

impl DialogRequest {
    /// The question asked after a label passes validation.
    #[must_use]
    pub fn required_field(label: &str) -> Self {
        Self::Confirm {
            message: format!("Is \"{label}\" a required field?"),
        }
    }

    /// The rename prompt, pre-filled with the current label.
    #[must_use]
    pub fn edit_label(current: &str) -> Self {
        Self::Prompt {
            message: EDIT_LABEL_PROMPT.to_owned(),
            default: current.to_owned(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Confirm { message } | Self::Prompt { message, .. } => message,
        }
    }
}

/// The user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResponse {
    Confirm(bool),
    Text(String),
    /// Dismissed without an answer.
    Cancel,
}

/// What an open dialog is about. Kept by the session until answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingDialog {
    /// Waiting for the required flag of a field that is not created yet.
    Required(FieldDraft),
    /// Waiting for a new label for an existing field.
    Rename(FieldId),
}

impl fmt::Display for PendingDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required(draft) => write!(f, "required flag for {:?}", draft.trimmed_label()),
            Self::Rename(id) => write!(f, "new label for {id}"),
        }
    }
}
