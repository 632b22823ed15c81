#![forbid(unsafe_code)]

//! The form-builder session: single owner of all builder state.
//!
//! A [`Session`] holds the field and response models, the store they are
//! persisted to, the live input surface, and the clock used to mint ids. It
//! is a [`Model`]: the host feeds it [`Msg`] values and carries out the
//! returned [`Cmd`].
//!
//! # Flow
//!
//! ```text
//! AddField ──invalid──▶ error slot set
//!     │ valid
//!     ▼
//! Dialog(required?) ──DialogResolved(Confirm)──▶ field created, saved, redraw
//!
//! EditField ──▶ Dialog(prompt) ──DialogResolved(Text)──▶ renamed, saved, redraw
//! DeleteField ──▶ removed, saved, redraw
//! Submit ──invalid──▶ error markers on the surface
//!     │ valid
//!     ▼
//! record appended, saved, redraw responses
//! ```
//!
//! While a dialog is open the session is modal: every message other than
//! [`Msg::DialogResolved`] is dropped.

use std::fmt;

use formwright_core::{
    Clock, FieldDefinition, FieldDraft, FieldId, FieldModel, InputSurface, ResponseModel,
    ResponseRecord, StorageBackend, StorageError, Store, SystemClock, ValidationReport, validate,
};
use formwright_render::{RenderPass, Views, render};
use tracing::{debug, info, info_span, warn};

use crate::config::{EmptyTablePolicy, SessionConfig};
use crate::dialog::{DialogRequest, DialogResponse, PendingDialog};
use crate::program::{Cmd, Model};

/// Text shown in the error slot when a label is rejected.
pub const INVALID_LABEL_MESSAGE: &str = "Label is invalid or duplicate";

/// Messages a host can send to a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Start adding a field. Asks whether it is required before creating it.
    AddField(FieldDraft),
    /// Start renaming a field.
    EditField(FieldId),
    DeleteField(FieldId),
    /// Validate the live inputs and record a response.
    Submit,
    /// Answer to the open dialog.
    DialogResolved(DialogResponse),
    /// Empty the error slot.
    ClearError,
}

impl Msg {
    /// Stable name for tracing.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AddField(_) => "AddField",
            Self::EditField(_) => "EditField",
            Self::DeleteField(_) => "DeleteField",
            Self::Submit => "Submit",
            Self::DialogResolved(_) => "DialogResolved",
            Self::ClearError => "ClearError",
        }
    }
}

/// Errors that stop a session from starting.
#[derive(Debug)]
pub enum SessionError {
    /// Persisted state could not be read or is malformed.
    Storage(StorageError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "failed to open session: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Form-builder state plus its collaborators.
pub struct Session<B: StorageBackend, S: InputSurface, C: Clock = SystemClock> {
    config: SessionConfig,
    store: Store<B>,
    surface: S,
    clock: C,
    fields: FieldModel,
    responses: ResponseModel,
    error: Option<String>,
    pending: Option<(PendingDialog, DialogRequest)>,
    last_validation: Option<ValidationReport>,
}

impl<B: StorageBackend, S: InputSurface, C: Clock> Session<B, S, C> {
    /// Load both collections from `backend` and build a session.
    ///
    /// Malformed persisted data is fatal.
    pub fn open(config: SessionConfig, backend: B, surface: S, clock: C) -> Result<Self, SessionError> {
        let store = Store::new(backend);
        let fields: Vec<FieldDefinition> = store.load(&config.fields_key)?;
        let responses: Vec<ResponseRecord> = store.load(&config.responses_key)?;
        info!(
            backend = %store.backend().name(),
            fields = fields.len(),
            responses = responses.len(),
            "session opened"
        );
        Ok(Self {
            config,
            store,
            surface,
            clock,
            fields: FieldModel::from_vec(fields),
            responses: ResponseModel::from_vec(responses),
            error: None,
            pending: None,
            last_validation: None,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn fields(&self) -> &FieldModel {
        &self.fields
    }

    #[must_use]
    pub fn responses(&self) -> &ResponseModel {
        &self.responses
    }

    #[must_use]
    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to live inputs, for hosts that fill them in directly.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The open dialog, if any.
    #[must_use]
    pub fn pending_dialog(&self) -> Option<&DialogRequest> {
        self.pending.as_ref().map(|(_, request)| request)
    }

    /// Outcome of the most recent submit attempt.
    #[must_use]
    pub fn last_validation(&self) -> Option<&ValidationReport> {
        self.last_validation.as_ref()
    }

    /// Plain-text response table, `None` when it would be absent.
    #[must_use]
    pub fn table_text(&self) -> Option<String> {
        formwright_render::ResponseTable::build(self.fields.as_slice(), self.responses.as_slice())
            .map(|t| t.to_text())
    }

    // ── Message handlers ────────────────────────────────────────────────

    fn add_field(&mut self, draft: FieldDraft) -> Cmd<Msg> {
        if !self.fields.is_valid_label(&draft.label) {
            debug!(label = %draft.label, "label rejected");
            self.error = Some(INVALID_LABEL_MESSAGE.to_owned());
            return Cmd::none();
        }
        self.error = None;
        let request = DialogRequest::required_field(draft.trimmed_label());
        self.open_dialog(PendingDialog::Required(draft), request)
    }

    fn edit_field(&mut self, id: FieldId) -> Cmd<Msg> {
        let Some(field) = self.fields.get(&id) else {
            debug!(id = %id, "edit: no such field");
            return Cmd::none();
        };
        let request = DialogRequest::edit_label(&field.label);
        self.open_dialog(PendingDialog::Rename(id), request)
    }

    fn delete_field(&mut self, id: &FieldId) -> Cmd<Msg> {
        if self.fields.remove(id) == 0 {
            return Cmd::none();
        }
        info!(id = %id, "field deleted");
        self.persist_fields();
        self.redraw(Views::all())
    }

    fn submit(&mut self) -> Cmd<Msg> {
        let report = validate(self.fields.as_slice(), &mut self.surface);
        let valid = report.is_valid();
        let failed = report.failures().len();
        self.last_validation = Some(report);
        if !valid {
            info!(failed, "submission blocked");
            return Cmd::log(format!("submission blocked: {failed} required field(s) unanswered"));
        }

        let form_id = format!("form-{}-{}", self.clock.now_millis(), self.responses.len());
        let record = self
            .responses
            .submit(self.fields.as_slice(), &self.surface, form_id);
        info!(form_id = %record.form_id, answers = record.answers.len(), "response submitted");
        let line = format!("response {} recorded", record.form_id);
        self.persist_responses();
        Cmd::batch(vec![self.redraw(Views::RESPONSES), Cmd::log(line)])
    }

    fn resolve_dialog(&mut self, response: DialogResponse) -> Cmd<Msg> {
        let Some((pending, request)) = self.pending.take() else {
            debug!(?response, "dialog answer with no open dialog");
            return Cmd::none();
        };
        match (pending, response) {
            (PendingDialog::Required(draft), DialogResponse::Confirm(required)) => {
                self.create_field(draft, required)
            }
            // A dismissed yes/no question counts as "no".
            (PendingDialog::Required(draft), DialogResponse::Cancel) => {
                self.create_field(draft, false)
            }
            (PendingDialog::Rename(id), DialogResponse::Text(label)) => {
                if !self.fields.rename(&id, &label) {
                    return Cmd::none();
                }
                info!(id = %id, label = %label, "field renamed");
                self.persist_fields();
                self.redraw(Views::all())
            }
            (PendingDialog::Rename(id), DialogResponse::Cancel) => {
                debug!(id = %id, "rename cancelled");
                Cmd::none()
            }
            (pending, response) => {
                debug!(%pending, ?response, "dialog answer of the wrong shape");
                self.pending = Some((pending, request));
                Cmd::none()
            }
        }
    }

    fn create_field(&mut self, draft: FieldDraft, required: bool) -> Cmd<Msg> {
        let id = FieldId::generate(draft.kind, &self.clock);
        let field = draft.into_definition(id, required);
        info!(id = %field.id, kind = %field.kind, label = %field.label, required, "field created");
        self.fields.add(field);
        self.persist_fields();
        self.redraw(Views::PREVIEW | Views::FORM_LIST)
    }

    fn open_dialog(&mut self, pending: PendingDialog, request: DialogRequest) -> Cmd<Msg> {
        debug!(%pending, "dialog opened");
        self.pending = Some((pending, request.clone()));
        Cmd::dialog(request)
    }

    // ── Persistence and redraw ──────────────────────────────────────────

    fn persist_fields(&self) {
        if let Err(e) = self.store.save(&self.config.fields_key, self.fields.as_slice()) {
            warn!(error = %e, key = %self.config.fields_key, "failed to save fields");
        }
    }

    fn persist_responses(&self) {
        if let Err(e) = self
            .store
            .save(&self.config.responses_key, self.responses.as_slice())
        {
            warn!(error = %e, key = %self.config.responses_key, "failed to save responses");
        }
    }

    /// Request a redraw, applying the empty-table policy first when the
    /// response table is part of it.
    fn redraw(&mut self, mut views: Views) -> Cmd<Msg> {
        if views.contains(Views::RESPONSES) && self.tear_down_if_empty() {
            views |= Views::PREVIEW | Views::FORM_LIST;
        }
        Cmd::render(views)
    }

    /// Returns true when fields were discarded.
    fn tear_down_if_empty(&mut self) -> bool {
        if self.config.empty_table_policy != EmptyTablePolicy::Teardown {
            return false;
        }
        if !self.fields.is_empty() && !self.responses.is_empty() {
            return false;
        }
        let had_fields = !self.fields.is_empty();
        info!(
            fields = self.fields.len(),
            responses = self.responses.len(),
            "response table empty, tearing down"
        );
        self.fields.clear();
        self.responses.clear();
        if let Err(e) = self.store.wipe() {
            warn!(error = %e, "failed to wipe store");
        }
        had_fields
    }
}

impl<B: StorageBackend, S: InputSurface, C: Clock> Model for Session<B, S, C> {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        self.redraw(Views::all())
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        let _span = info_span!("update", msg = msg.type_name()).entered();

        if self.pending.is_some() && !matches!(msg, Msg::DialogResolved(_)) {
            debug!(msg = msg.type_name(), "dialog open, message dropped");
            return Cmd::none();
        }

        match msg {
            Msg::AddField(draft) => self.add_field(draft),
            Msg::EditField(id) => self.edit_field(id),
            Msg::DeleteField(id) => self.delete_field(&id),
            Msg::Submit => self.submit(),
            Msg::DialogResolved(response) => self.resolve_dialog(response),
            Msg::ClearError => {
                self.error = None;
                Cmd::none()
            }
        }
    }

    fn view(&self, views: Views) -> RenderPass {
        render(views, self.fields.as_slice(), self.responses.as_slice())
    }

    fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn dialog(&self) -> Option<&DialogRequest> {
        self.pending_dialog()
    }
}

impl<B, S, C> fmt::Debug for Session<B, S, C>
where
    B: StorageBackend + fmt::Debug,
    S: InputSurface,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("fields", &self.fields.len())
            .field("responses", &self.responses.len())
            .field("error", &self.error)
            .field("pending", &self.pending_dialog())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_core::{FieldKind, ManualClock, MemoryStorage, MemorySurface};
    use pretty_assertions::assert_eq;

    type TestSession = Session<MemoryStorage, MemorySurface, ManualClock>;

    fn session_with(config: SessionConfig, storage: MemoryStorage) -> TestSession {
        Session::open(config, storage, MemorySurface::new(), ManualClock::at_millis(1_000)).unwrap()
    }

    fn session() -> TestSession {
        session_with(SessionConfig::default(), MemoryStorage::new())
    }

    fn add(session: &mut TestSession, kind: FieldKind, label: &str, options: &str, required: bool) -> FieldId {
        let cmd = session.update(Msg::AddField(FieldDraft::new(kind, label, options)));
        assert_eq!(cmd.type_name(), "Dialog");
        session.clock_mut().advance(std::time::Duration::from_millis(1));
        session.update(Msg::DialogResolved(DialogResponse::Confirm(required)));
        session.fields().as_slice().last().unwrap().id.clone()
    }

    #[test]
    fn add_asks_for_required_then_creates() {
        let mut s = session();
        let cmd = s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, "  Name ", "")));
        assert_eq!(cmd, Cmd::Dialog(DialogRequest::required_field("Name")));
        assert!(s.fields().is_empty());

        let cmd = s.update(Msg::DialogResolved(DialogResponse::Confirm(true)));
        assert_eq!(cmd, Cmd::Render(Views::PREVIEW | Views::FORM_LIST));
        let field = &s.fields().as_slice()[0];
        assert_eq!(field.label, "Name");
        assert!(field.required);
        assert_eq!(field.id.as_str(), "text-1000");
        assert!(s.pending_dialog().is_none());
    }

    #[test]
    fn invalid_label_sets_error_without_mutation() {
        let mut s = session();
        add(&mut s, FieldKind::Text, "Name", "", false);
        let cmd = s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, "name", "")));
        assert!(cmd.is_none());
        assert_eq!(s.error_message(), Some(INVALID_LABEL_MESSAGE));
        assert_eq!(s.fields().len(), 1);

        s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, "Email", "")));
        assert_eq!(s.error_message(), None);
    }

    #[test]
    fn clear_error() {
        let mut s = session();
        s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, "   ", "")));
        assert!(s.error_message().is_some());
        s.update(Msg::ClearError);
        assert!(s.error_message().is_none());
    }

    #[test]
    fn cancelled_required_prompt_means_optional() {
        let mut s = session();
        s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, "Name", "")));
        s.update(Msg::DialogResolved(DialogResponse::Cancel));
        assert!(!s.fields().as_slice()[0].required);
    }

    #[test]
    fn modal_while_dialog_open() {
        let mut s = session();
        let id = add(&mut s, FieldKind::Text, "Name", "", false);
        s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, "Email", "")));
        assert!(s.update(Msg::DeleteField(id)).is_none());
        assert_eq!(s.fields().len(), 1);
        assert!(s.pending_dialog().is_some());
    }

    #[test]
    fn wrong_shape_answer_keeps_dialog_open() {
        let mut s = session();
        s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, "Name", "")));
        assert!(s.update(Msg::DialogResolved(DialogResponse::Text("x".into()))).is_none());
        assert!(s.pending_dialog().is_some());
        assert!(s.fields().is_empty());
    }

    #[test]
    fn stray_answer_ignored() {
        let mut s = session();
        assert!(s.update(Msg::DialogResolved(DialogResponse::Confirm(true))).is_none());
        assert!(s.fields().is_empty());
    }

    #[test]
    fn edit_prefills_and_renames() {
        let mut s = session_with(
            SessionConfig::default().with_policy(EmptyTablePolicy::Preserve),
            MemoryStorage::new(),
        );
        let id = add(&mut s, FieldKind::Text, "Name", "", false);
        let cmd = s.update(Msg::EditField(id.clone()));
        assert_eq!(cmd, Cmd::Dialog(DialogRequest::edit_label("Name")));

        let cmd = s.update(Msg::DialogResolved(DialogResponse::Text("Full name".into())));
        assert_eq!(cmd.views(), Views::all());
        assert_eq!(s.fields().get(&id).unwrap().label, "Full name");
    }

    #[test]
    fn edit_cancel_or_empty_keeps_label() {
        let mut s = session_with(
            SessionConfig::default().with_policy(EmptyTablePolicy::Preserve),
            MemoryStorage::new(),
        );
        let id = add(&mut s, FieldKind::Text, "Name", "", false);
        s.update(Msg::EditField(id.clone()));
        assert!(s.update(Msg::DialogResolved(DialogResponse::Cancel)).is_none());
        s.update(Msg::EditField(id.clone()));
        assert!(s.update(Msg::DialogResolved(DialogResponse::Text(String::new()))).is_none());
        assert_eq!(s.fields().get(&id).unwrap().label, "Name");
    }

    #[test]
    fn edit_unknown_is_noop() {
        let mut s = session();
        assert!(s.update(Msg::EditField(FieldId::new("nope"))).is_none());
        assert!(s.pending_dialog().is_none());
    }

    #[test]
    fn delete_unknown_is_noop() {
        let mut s = session();
        add(&mut s, FieldKind::Text, "Name", "", false);
        assert!(s.update(Msg::DeleteField(FieldId::new("nope"))).is_none());
        assert_eq!(s.fields().len(), 1);
    }

    #[test]
    fn delete_removes_fields_sharing_an_id() {
        let mut s = session_with(
            SessionConfig::default().with_policy(EmptyTablePolicy::Preserve),
            MemoryStorage::new(),
        );
        for label in ["First", "Second"] {
            s.update(Msg::AddField(FieldDraft::new(FieldKind::Text, label, "")));
            s.update(Msg::DialogResolved(DialogResponse::Confirm(false)));
        }
        let ids: Vec<_> = s.fields().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["text-1000", "text-1000"]);

        let cmd = s.update(Msg::DeleteField(FieldId::new("text-1000")));
        assert_eq!(cmd, Cmd::Render(Views::all()));
        assert!(s.fields().is_empty());
    }

    #[test]
    fn repeated_checkbox_option_recorded_once() {
        let mut s = session();
        let id = add(&mut s, FieldKind::Checkbox, "Tags", "A, A, B", false);
        s.surface_mut().check(&id, "A", true);
        s.update(Msg::Submit);
        let record = &s.responses().as_slice()[0];
        assert_eq!(
            record.answers.get("Tags"),
            Some(&formwright_core::Answer::Multiple(vec!["A".into()]))
        );
    }

    #[test]
    fn blocked_submit_marks_surface() {
        let mut s = session();
        let id = add(&mut s, FieldKind::Text, "Name", "", true);
        let cmd = s.update(Msg::Submit);
        assert_eq!(cmd.type_name(), "Log");
        assert!(s.responses().is_empty());
        assert!(s.surface().has_error(&id));
        assert_eq!(s.last_validation().unwrap().failures(), &[id.clone()]);

        s.surface_mut().set_text(&id, "Alice");
        let cmd = s.update(Msg::Submit);
        assert!(cmd.views().contains(Views::RESPONSES));
        assert!(!s.surface().has_error(&id));
        assert_eq!(s.responses().len(), 1);
    }

    #[test]
    fn form_ids_are_distinct_within_a_millisecond() {
        let mut s = session();
        let id = add(&mut s, FieldKind::Text, "Name", "", false);
        s.surface_mut().set_text(&id, "a");
        s.update(Msg::Submit);
        s.update(Msg::Submit);
        let ids: Vec<_> = s.responses().iter().map(|r| r.form_id.as_str()).collect();
        assert_eq!(ids, vec!["form-1001-0", "form-1001-1"]);
    }

    #[test]
    fn init_tears_down_when_table_would_be_empty() {
        let storage = MemoryStorage::with_entries([(
            "formFields",
            r#"[{"id":"text-1","kind":"text","label":"Name"}]"#,
        )]);
        let mut s = session_with(SessionConfig::default(), storage.clone());
        assert_eq!(s.fields().len(), 1);
        let cmd = s.init();
        assert_eq!(cmd, Cmd::Render(Views::all()));
        assert!(s.fields().is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn preserve_policy_keeps_state() {
        let storage = MemoryStorage::with_entries([(
            "formFields",
            r#"[{"id":"text-1","kind":"text","label":"Name"}]"#,
        )]);
        let mut s = session_with(
            SessionConfig::default().with_policy(EmptyTablePolicy::Preserve),
            storage.clone(),
        );
        s.init();
        assert_eq!(s.fields().len(), 1);
        assert_eq!(storage.len(), 1);
        assert!(s.view(Views::RESPONSES).responses.is_none());
    }

    #[test]
    fn table_text_reflects_state() {
        let mut s = session();
        let id = add(&mut s, FieldKind::Text, "Name", "", false);
        assert!(s.table_text().is_none());
        s.surface_mut().set_text(&id, "Alice");
        s.update(Msg::Submit);
        let text = s.table_text().unwrap();
        assert!(text.contains("Alice"));
        assert!(text.starts_with("Form ID"));
    }
}
