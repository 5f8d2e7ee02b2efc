// ABOUTME: Store error types with SNAFU pattern.
// ABOUTME: Unifies connection and document errors for programmatic handling.

use snafu::Snafu;

use super::rest::ConnectError;
use super::traits::DocumentError;

/// Unified store error for connection and document failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("store connection failed: {source}"))]
    Connection { source: ConnectError },

    #[snafu(display("document operation failed: {source}"))]
    Document { source: DocumentError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Could not establish a connection to the backend.
    ConnectionFailed,
    /// The addressed document does not exist.
    NotFound,
    /// The backend rejected the operation's credentials.
    PermissionDenied,
    /// Any other backend failure.
    Backend,
}

impl StoreError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Connection { .. } => StoreErrorKind::ConnectionFailed,
            StoreError::Document { source } => match source {
                DocumentError::NotFound { .. } => StoreErrorKind::NotFound,
                DocumentError::PermissionDenied(_) => StoreErrorKind::PermissionDenied,
                _ => StoreErrorKind::Backend,
            },
        }
    }
}

impl From<ConnectError> for StoreError {
    fn from(source: ConnectError) -> Self {
        StoreError::Connection { source }
    }
}

impl From<DocumentError> for StoreError {
    fn from(source: DocumentError) -> Self {
        StoreError::Document { source }
    }
}
