// ABOUTME: Backend document store abstraction and implementations.
// ABOUTME: Exposes sealed traits plus in-memory and REST-backed stores.

mod error;
mod memory;
mod rest;
mod traits;

pub use error::{StoreError, StoreErrorKind};
pub use memory::MemoryStore;
pub use rest::{ConnectError, RestClient, RestError, RestStore};
pub use traits::{DocFields, DocFilters, DocumentError, DocumentOps};
