#![forbid(unsafe_code)]

//! The response table.
//!
//! Columns come from the *current* fields and each cell is looked up by the
//! current label. A record captured under a label that has since been
//! renamed or deleted shows a blank cell for that column.

use std::fmt::Write as _;

use formwright_core::{FieldDefinition, ResponseRecord};
use unicode_width::UnicodeWidthStr;

use crate::node::{Element, Node};

/// Header text of the first column.
pub const FORM_ID_HEADER: &str = "Form ID";

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRow {
    pub form_id: String,
    /// One cell per current field, in field order.
    pub cells: Vec<String>,
}

/// Tabular projection of the responses against the current fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTable {
    /// `Form ID` followed by the current labels.
    pub header: Vec<String>,
    pub rows: Vec<ResponseRow>,
}

impl ResponseTable {
    /// Build the table, or `None` when either collection is empty.
    #[must_use]
    pub fn build(fields: &[FieldDefinition], responses: &[ResponseRecord]) -> Option<Self> {
        if fields.is_empty() || responses.is_empty() {
            return None;
        }
        let header = std::iter::once(FORM_ID_HEADER.to_owned())
            .chain(fields.iter().map(|f| f.label.clone()))
            .collect();
        let rows = responses
            .iter()
            .map(|record| ResponseRow {
                form_id: record.form_id.clone(),
                cells: fields
                    .iter()
                    .map(|f| {
                        record
                            .answers
                            .get(&f.label)
                            .map(|a| a.display())
                            .unwrap_or_default()
                    })
                    .collect(),
            })
            .collect();
        Some(Self { header, rows })
    }

    /// Cell text by row index and column label.
    #[must_use]
    pub fn cell(&self, row: usize, label: &str) -> Option<&str> {
        let col = self.header.iter().skip(1).position(|h| h == label)?;
        self.rows.get(row)?.cells.get(col).map(String::as_str)
    }

    /// HTML table node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        let head = Element::new("thead").child(
            Element::new("tr").children(
                self.header
                    .iter()
                    .map(|h| Element::new("th").text(h.clone())),
            ),
        );
        let body = Element::new("tbody").children(self.rows.iter().map(|row| {
            Element::new("tr")
                .attr("data-form-id", row.form_id.clone())
                .child(Element::new("td").text(row.form_id.clone()))
                .children(row.cells.iter().map(|c| Element::new("td").text(c.clone())))
        }));
        Element::new("table")
            .class("response-table")
            .child(head)
            .child(body)
            .into()
    }

    /// Plain-text rendering with display-width-aligned columns.
    #[must_use]
    pub fn to_text(&self) -> String {
        let header: Vec<&str> = self.header.iter().map(String::as_str).collect();
        let lines: Vec<Vec<&str>> = std::iter::once(header)
            .chain(self.rows.iter().map(|row| {
                std::iter::once(row.form_id.as_str())
                    .chain(row.cells.iter().map(String::as_str))
                    .collect::<Vec<&str>>()
            }))
            .collect();

        let mut widths = vec![0usize; self.header.len()];
        for line in &lines {
            for (w, cell) in widths.iter_mut().zip(line) {
                *w = (*w).max(cell.width());
            }
        }

        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            write_text_row(&mut out, line, &widths);
            if i == 0 {
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
                write_text_row(&mut out, &rule, &widths);
            }
        }
        out
    }
}

fn write_text_row(out: &mut String, cells: &[&str], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(" | ");
        }
        line.push_str(cell);
        let pad = width.saturating_sub(cell.width());
        let _ = write!(line, "{:pad$}", "");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Table node for the given state, `None` when either collection is empty.
#[must_use]
pub fn response_table(fields: &[FieldDefinition], responses: &[ResponseRecord]) -> Option<Node> {
    ResponseTable::build(fields, responses).map(|t| t.to_node())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_core::{Answer, Answers};
    use pretty_assertions::assert_eq;

    fn record(id: &str, answers: &[(&str, Answer)]) -> ResponseRecord {
        ResponseRecord {
            form_id: id.into(),
            answers: answers.iter().cloned().collect::<Answers>(),
        }
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::text("text-1", "Name", true),
            FieldDefinition::checkbox("checkbox-2", "Tags", vec!["A".into(), "B".into()], false),
        ]
    }

    #[test]
    fn absent_when_either_side_is_empty() {
        assert!(ResponseTable::build(&fields(), &[]).is_none());
        assert!(ResponseTable::build(&[], &[record("form-1", &[])]).is_none());
    }

    #[test]
    fn header_and_cells() {
        let responses = vec![record(
            "form-1",
            &[
                ("Name", Answer::Single("Alice".into())),
                ("Tags", Answer::Multiple(vec!["A".into(), "B".into()])),
            ],
        )];
        let table = ResponseTable::build(&fields(), &responses).unwrap();
        assert_eq!(table.header, vec!["Form ID", "Name", "Tags"]);
        assert_eq!(table.cell(0, "Tags"), Some("A, B"));
        assert_eq!(table.cell(0, "Name"), Some("Alice"));
    }

    #[test]
    fn stale_labels_render_blank() {
        let responses = vec![record("form-1", &[("Old", Answer::Single("x".into()))])];
        let table = ResponseTable::build(&fields(), &responses).unwrap();
        assert_eq!(table.rows[0].cells, vec!["", ""]);
    }

    #[test]
    fn html_shape() {
        let responses = vec![record("form-1", &[("Name", Answer::Single("Al".into()))])];
        let node = response_table(&fields()[..1], &responses).unwrap();
        assert_eq!(
            node.to_html(),
            concat!(
                r#"<table class="response-table">"#,
                r#"<thead><tr><th>Form ID</th><th>Name</th></tr></thead>"#,
                r#"<tbody><tr data-form-id="form-1"><td>form-1</td><td>Al</td></tr></tbody>"#,
                r#"</table>"#,
            )
        );
    }

    #[test]
    fn text_columns_align_by_display_width() {
        let responses = vec![
            record("f-1", &[("Name", Answer::Single("日本".into()))]),
            record("f-22", &[("Name", Answer::Single("Bo".into()))]),
        ];
        let table = ResponseTable::build(&fields()[..1], &responses).unwrap();
        assert_eq!(
            table.to_text(),
            concat!(
                "Form ID | Name\n",
                "------- | ----\n",
                "f-1     | 日本\n",
                "f-22    | Bo\n",
            )
        );
    }
}
