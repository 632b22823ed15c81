#![forbid(unsafe_code)]

//! Step-based program runner.
//!
//! [`StepProgram`] drives a [`Model`] through init / message / update /
//! view / present cycles without threads or blocking. The host controls the
//! loop:
//!
//! 1. Push messages via [`StepProgram::push_msg`].
//! 2. Call [`StepProgram::step`] to process them and render dirty views.
//! 3. Read patches, logs, the error slot and any dialog via
//!    [`StepProgram::take_outputs`].
//! 4. If `outputs.dialog` is set, answer it with another message and step
//!    again.
//!
//! # Example
//!
//! ```ignore
//! use formwright_web::StepProgram;
//! use formwright_runtime::Msg;
//!
//! let mut prog = StepProgram::new(session);
//! prog.init();
//! prog.push_msg(Msg::Submit);
//! let result = prog.step();
//! if result.rendered {
//!     let outputs = prog.take_outputs();
//!     // Apply outputs.patches to the page...
//! }
//! ```

use std::collections::VecDeque;

use formwright_render::Views;
use formwright_runtime::{Cmd, Model};

use crate::{DialogView, WebOutputs, WebPresenter};

/// Result of a single [`StepProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether a render happened during this step.
    pub rendered: bool,
    /// Number of queued messages processed during this step.
    pub messages_processed: u32,
    /// Number of renders so far (monotonically increasing).
    pub frame_idx: u64,
    /// Whether a dialog is waiting for an answer.
    pub dialog_open: bool,
}

/// Host-driven, non-blocking runner.
///
/// # Lifecycle
///
/// 1. [`StepProgram::new`] wraps the model.
/// 2. [`StepProgram::init`] must be called exactly once; it renders the
///    views the model asks for on startup.
/// 3. [`StepProgram::step`] is called after each batch of pushed messages.
pub struct StepProgram<M: Model> {
    model: M,
    presenter: WebPresenter,
    queue: VecDeque<M::Message>,
    initialized: bool,
    dirty: Views,
    frame_idx: u64,
}

impl<M: Model> StepProgram<M> {
    #[must_use]
    pub fn new(model: M) -> Self {
        Self {
            model,
            presenter: WebPresenter::new(),
            queue: VecDeque::new(),
            initialized: false,
            dirty: Views::empty(),
            frame_idx: 0,
        }
    }

    /// Initialize the model and render what it asks for.
    ///
    /// Must be called exactly once before [`step`](Self::step).
    pub fn init(&mut self) {
        assert!(!self.initialized, "StepProgram::init() called twice");
        self.initialized = true;
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.render_dirty();
        self.sync_status();
    }

    /// Process every queued message, then render dirty views once.
    pub fn step(&mut self) -> StepResult {
        assert!(self.initialized, "StepProgram::step() called before init()");

        let mut messages_processed: u32 = 0;
        while let Some(msg) = self.queue.pop_front() {
            messages_processed += 1;
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }

        let rendered = self.render_dirty();
        self.sync_status();

        StepResult {
            rendered,
            messages_processed,
            frame_idx: self.frame_idx,
            dialog_open: self.presenter.outputs().dialog.is_some(),
        }
    }

    /// Queue a message for the next [`step`](Self::step).
    pub fn push_msg(&mut self, msg: M::Message) {
        self.queue.push_back(msg);
    }

    /// Take the captured outputs, leaving empty defaults.
    pub fn take_outputs(&mut self) -> WebOutputs {
        self.presenter.take_outputs()
    }

    /// Read the captured outputs without consuming them.
    pub fn outputs(&self) -> &WebOutputs {
        self.presenter.outputs()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of renders so far.
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    /// Messages waiting for the next step.
    pub fn pending_messages(&self) -> usize {
        self.queue.len()
    }

    // --- Private helpers ---

    fn render_dirty(&mut self) -> bool {
        if self.dirty.is_empty() {
            return false;
        }
        let views = std::mem::replace(&mut self.dirty, Views::empty());
        let pass = self.model.view(views);
        self.presenter.present(&pass);
        self.frame_idx += 1;
        true
    }

    /// Mirror the model's error slot and open dialog into the outputs.
    fn sync_status(&mut self) {
        let error = self.model.error_message().map(str::to_owned);
        let dialog = self.model.dialog().map(DialogView::from);
        let outputs = self.presenter.outputs_mut();
        outputs.error_message = error;
        outputs.dialog = dialog;
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Render(views) => {
                self.dirty |= views;
            }
            Cmd::Dialog(request) => {
                tracing::debug!(message = %request.message(), "dialog requested");
            }
            Cmd::Log(text) => {
                self.presenter.write_log(&text);
            }
        }
    }
}
