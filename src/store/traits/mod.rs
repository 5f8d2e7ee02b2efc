// ABOUTME: Trait definitions for backend document stores.
// ABOUTME: Sealed to internal implementations so the seam can evolve.

mod document;
pub(crate) mod sealed;

pub use document::{DocFields, DocFilters, DocumentError, DocumentOps};
