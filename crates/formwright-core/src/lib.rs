#![forbid(unsafe_code)]

//! Core: field and response models, validation, persistence, and the input surface.
//!
//! Everything in this crate is host-agnostic. Live input state (what the user
//! typed or ticked) is reached only through the [`surface::InputSurface`]
//! trait, so the models and the validator run the same way against a browser
//! DOM, a terminal, or a test double.

pub mod clock;
pub mod field;
pub mod logging;
pub mod response;
pub mod store;
pub mod surface;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use field::{FieldDefinition, FieldDraft, FieldId, FieldKind, FieldModel, UnknownFieldKind};
pub use response::{Answer, Answers, ResponseModel, ResponseRecord};
pub use store::{MemoryStorage, StorageBackend, StorageError, StorageResult, Store};
pub use surface::{InputSurface, MemorySurface};
pub use validate::{ValidationReport, validate};

#[cfg(feature = "file-storage")]
pub use store::FileStorage;
