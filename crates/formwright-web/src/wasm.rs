#![forbid(unsafe_code)]

use formwright_core::{FieldDraft, FieldId, FieldKind, InputSurface, SystemClock};
use formwright_runtime::{DialogResponse, Msg, Session, SessionConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlInputElement, HtmlSelectElement, Window};

use crate::{DialogView, ERROR_CONTAINER, StepProgram, WebBackendError, WebOutputs, WebStorage};

/// Id of the field-kind `<select>`.
const KIND_INPUT: &str = "field-kind";
/// Id of the label `<input>`.
const LABEL_INPUT: &str = "field-label";
/// Id of the comma-separated options `<input>`.
const OPTIONS_INPUT: &str = "field-options";

impl From<WebBackendError> for JsValue {
    fn from(e: WebBackendError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

// ---------------------------------------------------------------------------
// DOM input surface
// ---------------------------------------------------------------------------

/// Live inputs read straight from the rendered preview.
struct DomSurface {
    document: Document,
}

impl InputSurface for DomSurface {
    fn text_value(&self, field: &FieldId) -> String {
        self.document
            .get_element_by_id(field.as_str())
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn selected(&self, field: &FieldId) -> Vec<String> {
        let selector = format!("input[name=\"{field}\"]:checked");
        let Ok(nodes) = self.document.query_selector_all(&selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|n| n.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .collect()
    }

    fn set_error(&mut self, field: &FieldId, error: bool) {
        let selector = format!(".field-block[data-field-id=\"{field}\"]");
        if let Ok(Some(block)) = self.document.query_selector(&selector) {
            if let Err(err) = block.class_list().toggle_with_force("error", error) {
                tracing::debug!(field = %field, ?err, "error marker toggle failed");
            }
        }
    }
}

type Builder = Session<WebStorage, DomSurface, SystemClock>;

// ---------------------------------------------------------------------------
// JS-facing app
// ---------------------------------------------------------------------------

/// The form builder mounted into the current page.
///
/// The page provides `#form-preview`, `#form-list`, `#responses` and
/// `#label-error` containers plus the `#field-kind`, `#field-label` and
/// `#field-options` inputs, and wires its buttons to the exported methods.
#[wasm_bindgen]
pub struct FormBuilderApp {
    window: Window,
    document: Document,
    program: StepProgram<Builder>,
}

#[wasm_bindgen]
impl FormBuilderApp {
    /// Load persisted state and draw every view.
    ///
    /// `config` is an optional JSON session config.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<FormBuilderApp, JsValue> {
        let config = match config {
            Some(json) => SessionConfig::from_json(&json).map_err(js_error)?,
            None => SessionConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;
        let storage = WebStorage::open(config.storage_area)?;
        let surface = DomSurface {
            document: document.clone(),
        };
        let session = Session::open(config, storage, surface, SystemClock)
            .map_err(WebBackendError::from)?;

        let mut app = Self {
            window,
            document,
            program: StepProgram::new(session),
        };
        app.program.init();
        let outputs = app.program.take_outputs();
        app.apply(&outputs)?;
        Ok(app)
    }

    /// Read the add-field inputs and start adding a field.
    #[wasm_bindgen(js_name = addField)]
    pub fn add_field(&mut self) -> Result<(), JsValue> {
        let kind: FieldKind = self
            .document
            .get_element_by_id(KIND_INPUT)
            .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
            .ok_or(WebBackendError::MissingElement(KIND_INPUT.into()))?
            .value()
            .parse()
            .map_err(js_error)?;
        let label = self.input_value(LABEL_INPUT)?;
        let options = self.input_value(OPTIONS_INPUT)?;
        self.dispatch(Msg::AddField(FieldDraft::new(kind, label, options)))
    }

    #[wasm_bindgen(js_name = editField)]
    pub fn edit_field(&mut self, id: String) -> Result<(), JsValue> {
        self.dispatch(Msg::EditField(FieldId::new(id)))
    }

    #[wasm_bindgen(js_name = deleteField)]
    pub fn delete_field(&mut self, id: String) -> Result<(), JsValue> {
        self.dispatch(Msg::DeleteField(FieldId::new(id)))
    }

    pub fn submit(&mut self) -> Result<(), JsValue> {
        self.dispatch(Msg::Submit)
    }

    /// Plain-text response table, or `undefined` when it is absent.
    #[wasm_bindgen(js_name = tableText)]
    pub fn table_text(&self) -> Option<String> {
        self.program.model().table_text()
    }
}

impl FormBuilderApp {
    fn input_value(&self, id: &str) -> Result<String, WebBackendError> {
        self.document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .ok_or_else(|| WebBackendError::MissingElement(id.to_owned()))
    }

    /// Run one message to completion, answering dialogs as they open.
    fn dispatch(&mut self, msg: Msg) -> Result<(), JsValue> {
        self.program.push_msg(msg);
        loop {
            self.program.step();
            let outputs = self.program.take_outputs();
            self.apply(&outputs)?;
            let Some(dialog) = outputs.dialog else {
                return Ok(());
            };
            let answer = self.ask(&dialog)?;
            self.program.push_msg(Msg::DialogResolved(answer));
        }
    }

    fn ask(&self, dialog: &DialogView) -> Result<DialogResponse, JsValue> {
        match dialog {
            DialogView::Confirm { message } => {
                Ok(DialogResponse::Confirm(self.window.confirm_with_message(message)?))
            }
            DialogView::Prompt { message, default } => Ok(self
                .window
                .prompt_with_message_and_default(message, default)?
                .map_or(DialogResponse::Cancel, DialogResponse::Text)),
        }
    }

    fn apply(&self, outputs: &WebOutputs) -> Result<(), WebBackendError> {
        for patch in &outputs.patches {
            self.element(patch.container)?.set_inner_html(&patch.html);
        }
        self.element(ERROR_CONTAINER)?
            .set_text_content(Some(outputs.error_message.as_deref().unwrap_or("")));
        for line in &outputs.logs {
            web_sys::console::log_1(&JsValue::from_str(line));
        }
        Ok(())
    }

    fn element(&self, id: &str) -> Result<web_sys::Element, WebBackendError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| WebBackendError::MissingElement(id.to_owned()))
    }
}
