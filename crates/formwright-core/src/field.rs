#![forbid(unsafe_code)]

//! Field definitions and the ordered field model.
//!
//! The model owns every [`FieldDefinition`] in the builder. Lookups go through
//! [`FieldId`]; labels are what the user sees and what response answers are
//! keyed by.
//!
//! Label validation is split from insertion: callers check
//! [`FieldModel::is_valid_label`] before [`FieldModel::add`], and the model
//! itself never re-validates. Renames through [`FieldModel::rename`] only
//! require a non-empty label and skip the uniqueness check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

/// The closed set of input kinds a field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Exactly one choice from a list of options.
    Radio,
    /// Any number of choices from a list of options.
    Checkbox,
}

impl FieldKind {
    /// All kinds, in the order the kind selector offers them.
    pub const ALL: [FieldKind; 3] = [FieldKind::Text, FieldKind::Radio, FieldKind::Checkbox];

    /// Stable lowercase name, also used as the id prefix and HTML input type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
        }
    }

    /// Whether fields of this kind carry an option list.
    #[must_use]
    pub const fn has_options(self) -> bool {
        matches!(self, Self::Radio | Self::Checkbox)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized field kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldKind(pub String);

impl fmt::Display for UnknownFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field kind: {:?}", self.0)
    }
}

impl std::error::Error for UnknownFieldKind {}

impl FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "radio" => Ok(Self::Radio),
            "checkbox" => Ok(Self::Checkbox),
            _ => Err(UnknownFieldKind(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldId
// ---------------------------------------------------------------------------

/// Opaque field identifier, `<kind>-<creation time in ms>`.
///
/// Two fields of the same kind created within the same millisecond get the
/// same id. Nothing guards against that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint an id for a field of `kind` created now.
    pub fn generate<C: Clock + ?Sized>(kind: FieldKind, clock: &C) -> Self {
        Self(format!("{}-{}", kind.as_str(), clock.now_millis()))
    }

    /// Borrow the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// FieldDefinition
// ---------------------------------------------------------------------------

/// A declared input slot in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub kind: FieldKind,
    pub label: String,
    /// Present only for radio and checkbox fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinition {
    /// Create a definition. `options` is dropped for text fields.
    pub fn new(
        id: FieldId,
        kind: FieldKind,
        label: impl Into<String>,
        options: Vec<String>,
        required: bool,
    ) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            options: kind.has_options().then_some(options),
            required,
        }
    }

    /// Create a text field definition.
    pub fn text(id: impl Into<FieldId>, label: impl Into<String>, required: bool) -> Self {
        Self::new(id.into(), FieldKind::Text, label, Vec::new(), required)
    }

    /// Create a radio field definition.
    pub fn radio(
        id: impl Into<FieldId>,
        label: impl Into<String>,
        options: Vec<String>,
        required: bool,
    ) -> Self {
        Self::new(id.into(), FieldKind::Radio, label, options, required)
    }

    /// Create a checkbox field definition.
    pub fn checkbox(
        id: impl Into<FieldId>,
        label: impl Into<String>,
        options: Vec<String>,
        required: bool,
    ) -> Self {
        Self::new(id.into(), FieldKind::Checkbox, label, options, required)
    }

    /// The option list, empty for text fields.
    #[must_use]
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// FieldDraft
// ---------------------------------------------------------------------------

/// Builder input for a field that has not been created yet.
///
/// A draft is what the "add field" controls produce: a kind, a raw label,
/// and the raw comma-separated options text. It becomes a
/// [`FieldDefinition`] once the required flag is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDraft {
    pub kind: FieldKind,
    pub label: String,
    pub options_raw: String,
}

impl FieldDraft {
    pub fn new(kind: FieldKind, label: impl Into<String>, options_raw: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            options_raw: options_raw.into(),
        }
    }

    /// The label as it will be stored.
    #[must_use]
    pub fn trimmed_label(&self) -> &str {
        self.label.trim()
    }

    /// Finish the draft into a definition.
    #[must_use]
    pub fn into_definition(self, id: FieldId, required: bool) -> FieldDefinition {
        let options = if self.kind.has_options() {
            parse_options(&self.options_raw)
        } else {
            Vec::new()
        };
        let label = self.label.trim().to_owned();
        FieldDefinition::new(id, self.kind, label, options, required)
    }
}

/// Split the comma-separated options input, trimming entries and dropping
/// empty ones.
#[must_use]
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

// ---------------------------------------------------------------------------
// FieldModel
// ---------------------------------------------------------------------------

/// Ordered collection of field definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldModel {
    fields: Vec<FieldDefinition>,
}

impl FieldModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an already-loaded list, keeping its order.
    #[must_use]
    pub fn from_vec(fields: Vec<FieldDefinition>) -> Self {
        Self { fields }
    }

    /// True iff the trimmed candidate is non-empty and no existing label
    /// matches it case-insensitively.
    #[must_use]
    pub fn is_valid_label(&self, candidate: &str) -> bool {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return false;
        }
        let folded = trimmed.to_lowercase();
        !self.fields.iter().any(|f| f.label.to_lowercase() == folded)
    }

    /// Append a definition. The label is not re-validated here.
    pub fn add(&mut self, field: FieldDefinition) {
        tracing::debug!(id = %field.id, kind = %field.kind, label = %field.label, "field added");
        self.fields.push(field);
    }

    /// Replace the label of the field with `id`.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown or the
    /// new label is empty. Uniqueness is not checked.
    pub fn rename(&mut self, id: &FieldId, new_label: &str) -> bool {
        if new_label.is_empty() {
            return false;
        }
        match self.fields.iter_mut().find(|f| &f.id == id) {
            Some(field) => {
                tracing::debug!(id = %id, from = %field.label, to = %new_label, "field renamed");
                field.label = new_label.to_owned();
                true
            }
            None => {
                tracing::debug!(id = %id, "rename: no such field");
                false
            }
        }
    }

    /// Remove every field with `id`, returning how many were removed.
    pub fn remove(&mut self, id: &FieldId) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| &f.id != id);
        let removed = before - self.fields.len();
        tracing::debug!(id = %id, removed, "field removal");
        removed
    }

    /// Look up a field by id.
    #[must_use]
    pub fn get(&self, id: &FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| &f.id == id)
    }

    /// Look up a field by exact label.
    #[must_use]
    pub fn by_label(&self, label: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Current labels in field order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.label.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
