#![forbid(unsafe_code)]

//! Capability interface over live input state.
//!
//! The rendered form owns what the user has typed or selected. The validator
//! and the response model read that state back through [`InputSurface`]
//! rather than touching a concrete UI, and mark invalid fields through it.
//!
//! [`MemorySurface`] is the headless implementation: tests and host-driven
//! runners fill it in directly.

use std::collections::{HashMap, HashSet};

use crate::field::FieldId;

/// Read access to live inputs plus the per-field error marker.
pub trait InputSurface {
    /// Current value of a text field. Empty when nothing was typed.
    fn text_value(&self, field: &FieldId) -> String;

    /// Option values currently selected in a radio or checkbox group.
    fn selected(&self, field: &FieldId) -> Vec<String>;

    /// Set or clear the error marker on a field.
    fn set_error(&mut self, field: &FieldId, error: bool);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct InputState {
    text: String,
    selected: Vec<String>,
}

/// In-memory input surface.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    inputs: HashMap<FieldId, InputState>,
    errors: HashSet<FieldId>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Type into a text field, replacing its value.
    pub fn set_text(&mut self, field: &FieldId, value: impl Into<String>) {
        self.inputs.entry(field.clone()).or_default().text = value.into();
    }

    /// Select a radio option, replacing any earlier selection.
    pub fn choose(&mut self, field: &FieldId, option: impl Into<String>) {
        self.inputs.entry(field.clone()).or_default().selected = vec![option.into()];
    }

    /// Toggle a checkbox option on or off.
    pub fn check(&mut self, field: &FieldId, option: &str, checked: bool) {
        let state = self.inputs.entry(field.clone()).or_default();
        let present = state.selected.iter().any(|s| s == option);
        if checked && !present {
            state.selected.push(option.to_owned());
        } else if !checked && present {
            state.selected.retain(|s| s != option);
        }
    }

    /// Whether the field currently carries the error marker.
    #[must_use]
    pub fn has_error(&self, field: &FieldId) -> bool {
        self.errors.contains(field)
    }

    /// Fields currently marked as errors, sorted for stable output.
    #[must_use]
    pub fn error_fields(&self) -> Vec<FieldId> {
        let mut out: Vec<_> = self.errors.iter().cloned().collect();
        out.sort();
        out
    }
}

impl InputSurface for MemorySurface {
    fn text_value(&self, field: &FieldId) -> String {
        self.inputs
            .get(field)
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }

    fn selected(&self, field: &FieldId) -> Vec<String> {
        self.inputs
            .get(field)
            .map(|s| s.selected.clone())
            .unwrap_or_default()
    }

    fn set_error(&mut self, field: &FieldId, error: bool) {
        if error {
            self.errors.insert(field.clone());
        } else {
            self.errors.remove(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_fields_read_empty() {
        let surface = MemorySurface::new();
        let id = FieldId::new("text-1");
        assert_eq!(surface.text_value(&id), "");
        assert!(surface.selected(&id).is_empty());
    }

    #[test]
    fn radio_choice_replaces() {
        let mut surface = MemorySurface::new();
        let id = FieldId::new("radio-1");
        surface.choose(&id, "Red");
        surface.choose(&id, "Blue");
        assert_eq!(surface.selected(&id), vec!["Blue"]);
    }

    #[test]
    fn checkbox_toggles() {
        let mut surface = MemorySurface::new();
        let id = FieldId::new("checkbox-1");
        surface.check(&id, "A", true);
        surface.check(&id, "B", true);
        surface.check(&id, "A", true);
        assert_eq!(surface.selected(&id), vec!["A", "B"]);
        surface.check(&id, "A", false);
        assert_eq!(surface.selected(&id), vec!["B"]);
    }

    #[test]
    fn error_markers() {
        let mut surface = MemorySurface::new();
        let id = FieldId::new("text-1");
        surface.set_error(&id, true);
        assert!(surface.has_error(&id));
        assert_eq!(surface.error_fields(), vec![id.clone()]);
        surface.set_error(&id, false);
        assert!(surface.error_fields().is_empty());
    }
}
