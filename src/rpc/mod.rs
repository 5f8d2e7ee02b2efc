// ABOUTME: Remote procedure call seam and transports.
// ABOUTME: Exports the RemoteCall trait and the store-backed dispatcher.

mod store_transport;
mod transport;

pub use store_transport::StoreTransport;
pub use transport::{CallError, CallResponse, RemoteCall};
