#![forbid(unsafe_code)]

//! Elm-style model/command contract.
//!
//! A [`Model`] owns all application state. The host feeds it messages one at
//! a time; each `update` mutates the state and returns a [`Cmd`] describing
//! the side effects the host should carry out (redraw some views, show a
//! dialog, emit a log line). The model never touches the host directly.
//!
//! # Example
//!
//! ```ignore
//! use formwright_runtime::program::{Cmd, Model};
//! use formwright_render::{RenderPass, Views, render};
//!
//! struct Empty;
//!
//! impl Model for Empty {
//!     type Message = ();
//!
//!     fn update(&mut self, _: ()) -> Cmd<()> {
//!         Cmd::render(Views::PREVIEW)
//!     }
//!
//!     fn view(&self, views: Views) -> RenderPass {
//!         render(views, &[], &[])
//!     }
//! }
//! ```

use formwright_render::{RenderPass, Views};

use crate::dialog::DialogRequest;

/// Application state and behavior.
pub trait Model {
    /// Messages the host can send.
    type Message;

    /// Called once before the first message. Typically requests a full
    /// render of the loaded state.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Apply one message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Recompute the requested views from current state.
    fn view(&self, views: Views) -> RenderPass;

    /// Text for the single error slot, if any.
    fn error_message(&self) -> Option<&str> {
        None
    }

    /// Dialog waiting for an answer, if any.
    fn dialog(&self) -> Option<&DialogRequest> {
        None
    }
}

/// Side effects requested by the model.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Execute several commands in order.
    Batch(Vec<Cmd<M>>),
    /// Feed a message back into `update`.
    Msg(M),
    /// Redraw the given views.
    Render(Views),
    /// Ask the user something. The answer arrives later as a message.
    Dialog(DialogRequest),
    /// Append a line to the host log.
    Log(String),
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn render(views: Views) -> Self {
        Self::Render(views)
    }

    #[inline]
    pub fn dialog(request: DialogRequest) -> Self {
        Self::Dialog(request)
    }

    #[inline]
    pub fn log(line: impl Into<String>) -> Self {
        Self::Log(line.into())
    }

    /// Create a batch, collapsing empty and single-element cases.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Render(_) => "Render",
            Self::Dialog(_) => "Dialog",
            Self::Log(_) => "Log",
        }
    }

    /// Union of every view this command asks to redraw, batches included.
    #[must_use]
    pub fn views(&self) -> Views {
        match self {
            Self::Render(v) => *v,
            Self::Batch(cmds) => cmds.iter().fold(Views::empty(), |acc, c| acc | c.views()),
            _ => Views::empty(),
        }
    }
}
