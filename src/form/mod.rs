// ABOUTME: Embeddable form customization for run documents.
// ABOUTME: Exports the document type, view seam, and rollback button controller.

mod controller;
mod document;
mod view;

pub use controller::{ROLLBACK_BUTTON_LABEL, ROLLBACK_METHOD, refresh, rollback_clicked};
pub use document::Document;
pub use view::{FormAction, FormView};
