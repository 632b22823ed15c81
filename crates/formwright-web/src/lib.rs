#![forbid(unsafe_code)]

//! `formwright-web` runs a builder session inside a browser page.
//!
//! Design goals:
//! - **Host-driven**: the page pushes messages and calls `step`; nothing here
//!   blocks or spawns.
//! - **Patch output**: each render produces `innerHTML` patches keyed by
//!   container id, collected in [`WebOutputs`].
//! - **Dialogs at the edge**: the session asks, the host answers with
//!   `window.confirm` / `window.prompt`, and the answer comes back as a
//!   message.
//!
//! The [`step_program::StepProgram`] runner is target-independent and fully
//! testable natively. The `wasm-bindgen` surface ([`FormBuilderApp`]) and the
//! `Storage`-backed persistence only exist on `wasm32`.

pub mod step_program;

#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use storage::WebStorage;
#[cfg(target_arch = "wasm32")]
pub use wasm::FormBuilderApp;

use formwright_render::{RenderPass, Views};
use formwright_runtime::DialogRequest;
use serde::Serialize;

pub use step_program::{StepProgram, StepResult};

/// Container for the editable preview.
pub const PREVIEW_CONTAINER: &str = "form-preview";
/// Container for the form list.
pub const FORM_LIST_CONTAINER: &str = "form-list";
/// Container for the response table.
pub const RESPONSES_CONTAINER: &str = "responses";
/// Element showing the label error message.
pub const ERROR_CONTAINER: &str = "label-error";

/// Web front-end error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebBackendError {
    /// A required DOM element is missing.
    MissingElement(String),
    /// The browser refused access to storage.
    StorageUnavailable(String),
    /// The session could not be opened.
    Session(String),
}

impl core::fmt::Display for WebBackendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingElement(id) => write!(f, "missing element: #{id}"),
            Self::StorageUnavailable(msg) => write!(f, "storage unavailable: {msg}"),
            Self::Session(msg) => write!(f, "session error: {msg}"),
        }
    }
}

impl std::error::Error for WebBackendError {}

impl From<formwright_runtime::SessionError> for WebBackendError {
    fn from(e: formwright_runtime::SessionError) -> Self {
        Self::Session(e.to_string())
    }
}

/// One `innerHTML` replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPatch {
    /// Id of the container element.
    pub container: &'static str,
    /// Full replacement markup. Empty clears the container.
    pub html: String,
}

/// A dialog the host must show, in a JSON-friendly shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DialogView {
    Confirm { message: String },
    Prompt { message: String, default: String },
}

impl From<&DialogRequest> for DialogView {
    fn from(request: &DialogRequest) -> Self {
        match request {
            DialogRequest::Confirm { message } => Self::Confirm {
                message: message.clone(),
            },
            DialogRequest::Prompt { message, default } => Self::Prompt {
                message: message.clone(),
                default: default.clone(),
            },
        }
    }
}

/// Captured presentation outputs for host consumption.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct WebOutputs {
    /// Log lines emitted by the session.
    pub logs: Vec<String>,
    /// Patches from every render since the last take, in order.
    pub patches: Vec<ViewPatch>,
    /// Current text of the error slot. `None` means empty.
    pub error_message: Option<String>,
    /// Dialog waiting for an answer.
    pub dialog: Option<DialogView>,
}

impl WebOutputs {
    /// Latest markup for `container`, if it was patched.
    #[must_use]
    pub fn latest(&self, container: &str) -> Option<&str> {
        self.patches
            .iter()
            .rev()
            .find(|p| p.container == container)
            .map(|p| p.html.as_str())
    }

    /// Serialize for the JS bridge.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Collects render passes and logs for the host.
#[derive(Debug, Default, Clone)]
pub struct WebPresenter {
    outputs: WebOutputs,
}

impl WebPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn outputs(&self) -> &WebOutputs {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut WebOutputs {
        &mut self.outputs
    }

    /// Take the captured outputs, leaving empty defaults.
    ///
    /// The error slot and the open dialog are state, not events, so they are
    /// carried over.
    pub fn take_outputs(&mut self) -> WebOutputs {
        let error_message = self.outputs.error_message.clone();
        let dialog = self.outputs.dialog.clone();
        let out = std::mem::take(&mut self.outputs);
        self.outputs.error_message = error_message;
        self.outputs.dialog = dialog;
        out
    }

    /// Turn a render pass into container patches.
    pub fn present(&mut self, pass: &RenderPass) {
        if pass.covers(Views::PREVIEW) {
            self.push_patch(PREVIEW_CONTAINER, pass.preview.as_ref());
        }
        if pass.covers(Views::FORM_LIST) {
            self.push_patch(FORM_LIST_CONTAINER, pass.form_list.as_ref());
        }
        if pass.covers(Views::RESPONSES) {
            self.push_patch(RESPONSES_CONTAINER, pass.responses.as_ref());
        }
    }

    fn push_patch(&mut self, container: &'static str, node: Option<&formwright_render::Node>) {
        let html = node.map(|n| n.to_html()).unwrap_or_default();
        self.outputs.patches.push(ViewPatch { container, html });
    }

    pub fn write_log(&mut self, line: &str) {
        self.outputs.logs.push(line.to_owned());
    }
}

/// Native builds compile the front end as a stub so the workspace checks on
/// non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FormBuilderApp;

#[cfg(not(target_arch = "wasm32"))]
impl FormBuilderApp {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_core::FieldDefinition;
    use formwright_render::render;
    use pretty_assertions::assert_eq;

    #[test]
    fn present_patches_requested_views_only() {
        let fields = vec![FieldDefinition::text("text-1", "Name", false)];
        let mut presenter = WebPresenter::new();
        presenter.present(&render(Views::PREVIEW | Views::RESPONSES, &fields, &[]));
        let out = presenter.take_outputs();
        let containers: Vec<_> = out.patches.iter().map(|p| p.container).collect();
        assert_eq!(containers, vec![PREVIEW_CONTAINER, RESPONSES_CONTAINER]);
        assert_eq!(out.latest(RESPONSES_CONTAINER), Some(""));
        assert!(out.latest(PREVIEW_CONTAINER).unwrap().contains("data-field-id=\"text-1\""));
        assert!(out.latest(FORM_LIST_CONTAINER).is_none());
    }

    #[test]
    fn take_keeps_error_and_dialog() {
        let mut presenter = WebPresenter::new();
        presenter.write_log("hello");
        presenter.outputs_mut().error_message = Some("bad".into());
        let first = presenter.take_outputs();
        assert_eq!(first.logs, vec!["hello"]);
        let second = presenter.take_outputs();
        assert!(second.logs.is_empty());
        assert_eq!(second.error_message.as_deref(), Some("bad"));
    }

    #[test]
    fn outputs_json_shape() {
        let out = WebOutputs {
            dialog: Some(DialogView::from(&DialogRequest::edit_label("Name"))),
            ..WebOutputs::default()
        };
        let json: serde_json::Value = serde_json::from_str(&out.to_json().unwrap()).unwrap();
        assert_eq!(json["dialog"]["kind"], "prompt");
        assert_eq!(json["dialog"]["default"], "Name");
        assert_eq!(json["error_message"], serde_json::Value::Null);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            WebBackendError::MissingElement("form-list".into()).to_string(),
            "missing element: #form-list"
        );
    }
}
