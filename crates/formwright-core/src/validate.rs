#![forbid(unsafe_code)]

//! Required-answer validation gate run before a submission.

use crate::field::{FieldDefinition, FieldId, FieldKind};
use crate::response::checked_options;
use crate::surface::InputSurface;

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    checked: usize,
    failures: Vec<FieldId>,
}

impl ValidationReport {
    /// True when every field passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fields that failed, in field order.
    #[must_use]
    pub fn failures(&self) -> &[FieldId] {
        &self.failures
    }

    /// Number of fields inspected.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.checked
    }
}

/// Whether a single field's live input satisfies its requirement.
pub fn is_satisfied<S: InputSurface + ?Sized>(field: &FieldDefinition, surface: &S) -> bool {
    if !field.required {
        return true;
    }
    match field.kind {
        FieldKind::Text => !surface.text_value(&field.id).is_empty(),
        FieldKind::Radio => !surface.selected(&field.id).is_empty(),
        FieldKind::Checkbox => !checked_options(field, surface).is_empty(),
    }
}

/// Check every field and set or clear its error marker on the surface.
///
/// Every field is visited even after a failure so all markers are current.
pub fn validate<S: InputSurface + ?Sized>(
    fields: &[FieldDefinition],
    surface: &mut S,
) -> ValidationReport {
    let mut report = ValidationReport {
        checked: fields.len(),
        failures: Vec::new(),
    };
    for field in fields {
        let ok = is_satisfied(field, surface);
        surface.set_error(&field.id, !ok);
        if !ok {
            report.failures.push(field.id.clone());
        }
    }
    tracing::debug!(
        checked = report.checked,
        failed = report.failures.len(),
        "validation pass"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    fn id(s: &str) -> FieldId {
        FieldId::new(s)
    }

    #[test]
    fn required_text_needs_value() {
        let fields = vec![FieldDefinition::text("text-1", "Name", true)];
        let mut surface = MemorySurface::new();

        let report = validate(&fields, &mut surface);
        assert!(!report.is_valid());
        assert_eq!(report.failures(), [id("text-1")]);
        assert!(surface.has_error(&id("text-1")));

        surface.set_text(&id("text-1"), "Alice");
        let report = validate(&fields, &mut surface);
        assert!(report.is_valid());
        assert!(!surface.has_error(&id("text-1")));
    }

    #[test]
    fn whitespace_counts_as_a_value() {
        let fields = vec![FieldDefinition::text("text-1", "Name", true)];
        let mut surface = MemorySurface::new();
        surface.set_text(&id("text-1"), " ");
        assert!(validate(&fields, &mut surface).is_valid());
    }

    #[test]
    fn required_choices_need_selection() {
        let fields = vec![
            FieldDefinition::radio("radio-1", "Color", vec!["Red".into()], true),
            FieldDefinition::checkbox("checkbox-1", "Tags", vec!["A".into()], true),
        ];
        let mut surface = MemorySurface::new();
        let report = validate(&fields, &mut surface);
        assert_eq!(report.failures(), [id("radio-1"), id("checkbox-1")]);

        surface.choose(&id("radio-1"), "Red");
        surface.check(&id("checkbox-1"), "A", true);
        assert!(validate(&fields, &mut surface).is_valid());
    }

    #[test]
    fn checkbox_selection_outside_options_fails() {
        let fields = vec![FieldDefinition::checkbox(
            "checkbox-1",
            "Tags",
            vec!["A".into()],
            true,
        )];
        let mut surface = MemorySurface::new();
        surface.check(&id("checkbox-1"), "stale", true);
        let report = validate(&fields, &mut surface);
        assert_eq!(report.failures(), [id("checkbox-1")]);
    }

    #[test]
    fn optional_fields_pass_and_clear_markers() {
        let fields = vec![FieldDefinition::radio(
            "radio-1",
            "Color",
            vec!["Red".into()],
            false,
        )];
        let mut surface = MemorySurface::new();
        surface.set_error(&id("radio-1"), true);
        let report = validate(&fields, &mut surface);
        assert!(report.is_valid());
        assert_eq!(report.checked(), 1);
        assert!(!surface.has_error(&id("radio-1")));
    }
}
