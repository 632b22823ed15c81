#![forbid(unsafe_code)]

//! Formwright public facade crate.
//!
//! Re-exports the common types from the internal crates and offers a
//! prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use formwright_core::{
    Answer, Answers, Clock, FieldDefinition, FieldDraft, FieldId, FieldKind, FieldModel,
    InputSurface, ManualClock, MemoryStorage, MemorySurface, ResponseModel, ResponseRecord,
    StorageBackend, StorageError, Store, SystemClock, ValidationReport,
};

#[cfg(feature = "file-storage")]
pub use formwright_core::FileStorage;

// --- Render re-exports -----------------------------------------------------

pub use formwright_render::{Element, Node, RenderPass, ResponseTable, Views};

// --- Runtime re-exports ----------------------------------------------------

pub use formwright_runtime::{
    Cmd, ConfigError, DialogRequest, DialogResponse, EmptyTablePolicy, Model, Msg, Session,
    SessionConfig, SessionError, StorageArea,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use formwright_web::{FormBuilderApp, StepProgram, StepResult, WebOutputs};

/// Session over in-memory storage and inputs, for tests and headless hosts.
pub type HeadlessSession = Session<MemoryStorage, MemorySurface, SystemClock>;

/// Open a [`HeadlessSession`] over `storage`.
pub fn open_headless(config: SessionConfig, storage: MemoryStorage) -> Result<HeadlessSession> {
    Ok(Session::open(config, storage, MemorySurface::new(), SystemClock)?)
}

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Formwright hosts.
#[derive(Debug)]
pub enum Error {
    /// Session could not be opened.
    Session(SessionError),
    /// Configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Session(SessionError::Storage(err))
    }
}

/// Standard result type for Formwright APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cmd, DialogResponse, EmptyTablePolicy, Error, FieldDraft, FieldId, FieldKind, Model, Msg,
        Result, Session, SessionConfig, Views,
    };

    #[cfg(feature = "web")]
    pub use crate::StepProgram;

    pub use crate::{core, render, runtime};
}

pub use formwright_core as core;
pub use formwright_render as render;
pub use formwright_runtime as runtime;
#[cfg(feature = "web")]
pub use formwright_web as web;
