// ABOUTME: Remote call seam between form controllers and server procedures.
// ABOUTME: One async trait, a response carrying an optional message, and errors.

use crate::form::Document;
use async_trait::async_trait;
use serde_json::Value;

/// Remote procedure invocation as the host framework's transport exposes it.
///
/// The transport owns protocol, serialization, auth, and endpoint
/// resolution; callers only name a method and hand over the document.
#[async_trait]
pub trait RemoteCall: Send + Sync {
    async fn call(&self, method: &str, doc: &Document) -> Result<CallResponse, CallError>;
}

/// Response of a remote call.
#[derive(Debug, Clone, Default)]
pub struct CallResponse {
    /// Whatever the procedure returned as its message, verbatim.
    pub message: Option<Value>,
}

impl CallResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<Value>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The message as display text, when it is truthy.
    ///
    /// Truthiness follows the host framework's rules: null, `false`, zero,
    /// and the empty string display nothing. Strings display verbatim;
    /// structured values display as JSON text.
    pub fn display_message(&self) -> Option<String> {
        match &self.message {
            None | Some(Value::Null) => None,
            Some(Value::Bool(false)) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Errors from remote calls.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("transport error: {0}")]
    Transport(String),
}
