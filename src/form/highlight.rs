use tracing::debug;

use crate::dom::document::ScrollIntoViewOptions;
use crate::dom::{Document, NodeId};
use crate::form::form_model::FormLocator;
use crate::form::matcher::locate_form;

/// Clear the border marker on every form, then smooth-scroll the located form
/// to the middle of the viewport. A missing form is a no-op.
pub fn highlight_form<D: Document + ?Sized>(doc: &mut D, locator: &FormLocator) -> Option<NodeId> {
    for form in doc.forms() {
        doc.set_style(form, "border", "");
    }

    let Some(form) = locate_form(&*doc, locator) else {
        debug!(form_id = %locator.id, "highlight target missing");
        return None;
    };
    doc.scroll_into_view(form, ScrollIntoViewOptions::smooth_center());
    Some(form)
}
