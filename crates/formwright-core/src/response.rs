#![forbid(unsafe_code)]

//! Submitted responses.
//!
//! A [`ResponseRecord`] maps field *labels* (as they were at submission time)
//! to answers. Records are append-only: renaming or deleting a field later
//! leaves old records keyed by the old label.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::field::{FieldDefinition, FieldKind};
use crate::surface::InputSurface;

/// Separator used when a multi-choice answer is shown as one string.
pub const MULTI_ANSWER_SEPARATOR: &str = ", ";

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// One answer value: a single string for text and radio fields, a list for
/// checkbox fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(Vec<String>),
}

impl Answer {
    /// Display form: single values verbatim, lists joined with `", "`.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Single(value) => value.clone(),
            Self::Multiple(values) => values.join(MULTI_ANSWER_SEPARATOR),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// Label → answer mapping that keeps insertion order.
///
/// Serialized as a JSON object in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    entries: Vec<(String, Answer)>,
}

impl Answers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an answer, replacing any existing answer under the same label.
    pub fn insert(&mut self, label: impl Into<String>, answer: Answer) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, slot)) => *slot = answer,
            None => self.entries.push((label, answer)),
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Answer> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, a)| a)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.entries.iter().map(|(l, a)| (l.as_str(), a))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, Answer)> for Answers {
    fn from_iter<I: IntoIterator<Item = (L, Answer)>>(iter: I) -> Self {
        let mut answers = Self::new();
        for (label, answer) in iter {
            answers.insert(label, answer);
        }
        answers
    }
}

impl Serialize for Answers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, answer) in &self.entries {
            map.serialize_entry(label, answer)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Answers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AnswersVisitor;

        impl<'de> Visitor<'de> for AnswersVisitor {
            type Value = Answers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping labels to a string or list of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Answers, A::Error> {
                let mut answers = Answers::new();
                while let Some((label, answer)) = access.next_entry::<String, Answer>()? {
                    answers.insert(label, answer);
                }
                Ok(answers)
            }
        }

        deserializer.deserialize_map(AnswersVisitor)
    }
}

// ---------------------------------------------------------------------------
// ResponseRecord
// ---------------------------------------------------------------------------

/// One full submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "formId")]
    pub form_id: String,
    pub answers: Answers,
}

/// Read one answer per field from the live inputs, keyed by current label.
///
/// Text fields always answer (possibly with `""`). Radio and checkbox fields
/// answer only when something is selected; checkbox answers follow option
/// order.
pub fn capture<S: InputSurface + ?Sized>(fields: &[FieldDefinition], surface: &S) -> Answers {
    let mut answers = Answers::new();
    for field in fields {
        match field.kind {
            FieldKind::Text => {
                answers.insert(&*field.label, Answer::Single(surface.text_value(&field.id)));
            }
            FieldKind::Radio => {
                let selected = surface.selected(&field.id);
                if let Some(choice) = selected.into_iter().next() {
                    answers.insert(&*field.label, Answer::Single(choice));
                }
            }
            FieldKind::Checkbox => {
                let checked = checked_options(field, surface);
                if !checked.is_empty() {
                    answers.insert(&*field.label, Answer::Multiple(checked));
                }
            }
        }
    }
    answers
}

/// Checkbox selections that match the field's options, in option order.
///
/// Each selected value is consumed once, so an option listed twice is only
/// reported twice when the surface reports it checked twice. Values the
/// options do not contain are dropped.
pub fn checked_options<S: InputSurface + ?Sized>(
    field: &FieldDefinition,
    surface: &S,
) -> Vec<String> {
    let mut remaining = surface.selected(&field.id);
    let mut checked = Vec::with_capacity(remaining.len());
    for option in field.options() {
        if let Some(pos) = remaining.iter().position(|s| s == option) {
            checked.push(remaining.swap_remove(pos));
        }
    }
    checked
}

// ---------------------------------------------------------------------------
// ResponseModel
// ---------------------------------------------------------------------------

/// Append-only list of response records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseModel {
    records: Vec<ResponseRecord>,
}

impl ResponseModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_vec(records: Vec<ResponseRecord>) -> Self {
        Self { records }
    }

    /// Capture the current inputs into a new record and append it.
    pub fn submit<S: InputSurface + ?Sized>(
        &mut self,
        fields: &[FieldDefinition],
        surface: &S,
        form_id: impl Into<String>,
    ) -> &ResponseRecord {
        let record = ResponseRecord {
            form_id: form_id.into(),
            answers: capture(fields, surface),
        };
        tracing::debug!(form_id = %record.form_id, answers = record.answers.len(), "response recorded");
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResponseRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ResponseRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
