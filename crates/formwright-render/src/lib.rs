#![forbid(unsafe_code)]

//! Render cycle: pure projections from (fields, responses) to view trees.
//!
//! There are three independent views. Each is recomputed in full from the
//! current state whenever it is marked dirty; nothing is patched
//! incrementally.
//!
//! | View | Function | Present when |
//! |------|----------|--------------|
//! | Preview | [`views::preview`] | always |
//! | Form list | [`views::form_list`] | always |
//! | Response table | [`table::response_table`] | fields and responses both non-empty |

pub mod node;
pub mod table;
pub mod views;

use bitflags::bitflags;
use formwright_core::{FieldDefinition, ResponseRecord};

pub use node::{Element, Node};
pub use table::{FORM_ID_HEADER, ResponseRow, ResponseTable, response_table};
pub use views::{form_list, preview, summary_line};

bitflags! {
    /// Set of views to recompute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Views: u8 {
        const PREVIEW = 1 << 0;
        const FORM_LIST = 1 << 1;
        const RESPONSES = 1 << 2;
    }
}

/// Output of one render pass. Only views in `views` are populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    /// Views this pass recomputed.
    pub views: Views,
    pub preview: Option<Node>,
    pub form_list: Option<Node>,
    /// `None` with [`Views::RESPONSES`] set means the table is absent and its
    /// container should be emptied.
    pub responses: Option<Node>,
}

impl RenderPass {
    /// Whether this pass recomputed `view`.
    #[must_use]
    pub fn covers(&self, view: Views) -> bool {
        self.views.contains(view)
    }
}

/// Recompute the requested views.
#[must_use]
pub fn render(views: Views, fields: &[FieldDefinition], responses: &[ResponseRecord]) -> RenderPass {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "render",
        views = ?views,
        fields = fields.len(),
        responses = responses.len()
    )
    .entered();

    RenderPass {
        views,
        preview: views.contains(Views::PREVIEW).then(|| preview(fields)),
        form_list: views.contains(Views::FORM_LIST).then(|| form_list(fields)),
        responses: if views.contains(Views::RESPONSES) {
            response_table(fields, responses)
        } else {
            None
        },
    }
}
