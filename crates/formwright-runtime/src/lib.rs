#![forbid(unsafe_code)]

//! Runtime: the form-builder session and its message/command contract.
//!
//! # Role in Formwright
//! `formwright-runtime` is where state changes happen. The [`Session`] is the
//! only writer of the field and response collections; hosts (the wasm front
//! end, the step runner, tests) drive it with [`Msg`] values and carry out the
//! returned [`Cmd`].
//!
//! # How it fits
//! - Models, persistence and validation come from `formwright-core`.
//! - View trees come from `formwright-render` via [`Model::view`].
//! - `formwright-web` wraps a session in a host-driven step runner.

pub mod config;
pub mod dialog;
pub mod program;
pub mod session;

pub use config::{
    ConfigError, DEFAULT_FIELDS_KEY, DEFAULT_RESPONSES_KEY, EmptyTablePolicy, SessionConfig,
    StorageArea,
};
pub use dialog::{DialogRequest, DialogResponse, EDIT_LABEL_PROMPT};
pub use program::{Cmd, Model};
pub use session::{INVALID_LABEL_MESSAGE, Msg, Session, SessionError};
