#![forbid(unsafe_code)]

//! The editable preview and the form list.

use formwright_core::{FieldDefinition, FieldKind};

use crate::node::{Element, Node};

/// Preview of the live form: one block per field, in field order.
///
/// Text fields get one input whose id is the field id. Radio and checkbox
/// fields get one input per option, grouped by `name` = field id, with the
/// option as `value`. Every block carries edit and delete buttons bound to
/// the field id through `data-field-id`.
#[must_use]
pub fn preview(fields: &[FieldDefinition]) -> Node {
    Element::new("div")
        .class("form-preview")
        .children(fields.iter().map(field_block))
        .into()
}

fn field_block(field: &FieldDefinition) -> Element {
    let id = field.id.as_str();
    let mut label = Element::new("label").class("field-label").text(&*field.label);
    if field.kind == FieldKind::Text {
        label = label.attr("for", id);
    }
    if field.required {
        label = label.child(Element::new("span").class("required-marker").text(" *"));
    }

    Element::new("div")
        .class("field-block")
        .class(&format!("field-{}", field.kind))
        .attr("data-field-id", id)
        .attr("data-required", if field.required { "true" } else { "false" })
        .child(label)
        .child(controls(field))
        .child(actions(id))
}

fn controls(field: &FieldDefinition) -> Element {
    let id = field.id.as_str();
    match field.kind {
        FieldKind::Text => Element::new("input")
            .class("field-input")
            .attr("type", "text")
            .attr("id", id)
            .attr("name", id),
        FieldKind::Radio | FieldKind::Checkbox => Element::new("div")
            .class("field-options")
            .children(field.options().iter().enumerate().map(|(i, option)| {
                let input_id = format!("{id}-{i}");
                Element::new("label")
                    .class("option")
                    .attr("for", input_id.clone())
                    .child(
                        Element::new("input")
                            .attr("type", field.kind.as_str())
                            .attr("id", input_id)
                            .attr("name", id)
                            .attr("value", option.clone()),
                    )
                    .text(option.clone())
            })),
    }
}

fn actions(id: &str) -> Element {
    let button = |action: &'static str, text: &'static str| {
        Element::new("button")
            .class(&format!("{action}-field"))
            .attr("type", "button")
            .attr("data-action", action)
            .attr("data-field-id", id)
            .text(text)
    };
    Element::new("div")
        .class("field-actions")
        .child(button("edit", "Edit"))
        .child(button("delete", "Delete"))
}

/// One informational summary line per field.
#[must_use]
pub fn form_list(fields: &[FieldDefinition]) -> Node {
    Element::new("ul")
        .class("form-list")
        .children(fields.iter().map(|field| {
            Element::new("li")
                .class("form-list-item")
                .attr("data-field-id", field.id.as_str())
                .text(summary_line(field))
        }))
        .into()
}

/// `"<label> (<kind>[, required])[: <options>]"`.
#[must_use]
pub fn summary_line(field: &FieldDefinition) -> String {
    let mut line = format!("{} ({}", field.label, field.kind);
    if field.required {
        line.push_str(", required");
    }
    line.push(')');
    if !field.options().is_empty() {
        line.push_str(": ");
        line.push_str(&field.options().join(", "));
    }
    line
}
