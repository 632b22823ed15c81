//! Render cycle integration tests.
//!
//! ```sh
//! cargo test -p formwright-render --test render_cycle
//! ```

use formwright_core::{FieldDefinition, FieldId, MemorySurface, ResponseModel};
use formwright_render::{ResponseTable, Views, render};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn survey() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::text("text-1", "Name", true),
        FieldDefinition::checkbox(
            "checkbox-2",
            "Pets",
            vec!["Cat".into(), "Dog".into(), "Fish".into()],
            false,
        ),
    ]
}

#[test]
fn checkbox_selections_join_with_comma_space() {
    let fields = survey();
    let mut surface = MemorySurface::new();
    surface.set_text(&FieldId::new("text-1"), "Alice");
    surface.check(&FieldId::new("checkbox-2"), "Fish", true);
    surface.check(&FieldId::new("checkbox-2"), "Cat", true);

    let mut responses = ResponseModel::new();
    responses.submit(&fields, &surface, "form-1");

    let table = ResponseTable::build(&fields, responses.as_slice()).unwrap();
    assert_eq!(table.cell(0, "Pets"), Some("Cat, Fish"));
}

#[test]
fn renamed_column_orphans_old_answers() {
    let mut fields = survey();
    let mut surface = MemorySurface::new();
    surface.set_text(&FieldId::new("text-1"), "Alice");
    let mut responses = ResponseModel::new();
    responses.submit(&fields, &surface, "form-1");

    fields[0].label = "FullName".into();
    let pass = render(Views::RESPONSES, &fields, responses.as_slice());
    let node = pass.responses.expect("table present");

    let headers: Vec<String> = node
        .find_all(|e| e.tag() == "th")
        .into_iter()
        .map(|e| e.text_content())
        .collect();
    assert_eq!(headers, vec!["Form ID", "FullName", "Pets"]);

    let cells: Vec<String> = node
        .find_all(|e| e.tag() == "td")
        .into_iter()
        .map(|e| e.text_content())
        .collect();
    assert_eq!(cells, vec!["form-1", "", ""]);
}

#[test]
fn one_row_per_record_in_order() {
    let fields = survey();
    let surface = MemorySurface::new();
    let mut responses = ResponseModel::new();
    for i in 0..3 {
        responses.submit(&fields, &surface, format!("form-{i}"));
    }
    let table = ResponseTable::build(&fields, responses.as_slice()).unwrap();
    let ids: Vec<_> = table.rows.iter().map(|r| r.form_id.as_str()).collect();
    assert_eq!(ids, vec!["form-0", "form-1", "form-2"]);
}

proptest! {
    #[test]
    fn render_is_idempotent(labels in prop::collection::vec("[a-z]{1,8}", 0..6), answered in any::<bool>()) {
        let fields: Vec<FieldDefinition> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| FieldDefinition::text(format!("text-{i}"), format!("{l}{i}"), false))
            .collect();
        let mut responses = ResponseModel::new();
        if answered {
            responses.submit(&fields, &MemorySurface::new(), "form-1");
        }
        let a = render(Views::all(), &fields, responses.as_slice());
        let b = render(Views::all(), &fields, responses.as_slice());
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.responses.is_some(), answered && !fields.is_empty());
    }
}
