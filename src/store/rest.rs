// ABOUTME: REST-backed document store implementation.
// ABOUTME: Talks to the backend's resource API over plain HTTP/1.

use super::traits::sealed::Sealed;
use super::traits::{DocFields, DocFilters, DocumentError, DocumentOps};
use crate::config::ServerConfig;
use crate::types::{DocId, DocTypeName, FieldName};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;

/// Errors establishing a store connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("invalid server address: {0}")]
    InvalidServer(String),

    #[error("credential resolution failed: {0}")]
    Credentials(String),
}

/// Errors from individual REST requests.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("invalid JSON in response: {0}")]
    InvalidJson(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_doc_error(e: RestError, doctype: &DocTypeName, name: &DocId) -> DocumentError {
    match e {
        RestError::Api { status: 404, .. } => DocumentError::not_found(doctype, name),
        RestError::Api { status: 409, .. } => DocumentError::already_exists(doctype, name),
        RestError::Api {
            status: 401 | 403,
            message,
        } => DocumentError::PermissionDenied(message),
        RestError::InvalidJson(msg) => DocumentError::Serialization(msg),
        other => DocumentError::Backend(other.to_string()),
    }
}

fn map_list_error(e: RestError) -> DocumentError {
    match e {
        RestError::Api {
            status: 401 | 403,
            message,
        } => DocumentError::PermissionDenied(message),
        RestError::InvalidJson(msg) => DocumentError::Serialization(msg),
        other => DocumentError::Backend(other.to_string()),
    }
}

// =============================================================================
// RestClient
// =============================================================================

/// Minimal HTTP/1 JSON client over a per-request connection.
///
/// One handshake per request keeps the client free of pool state; the
/// backend sits on localhost or behind a local tunnel, so connection
/// setup is cheap relative to the request itself.
pub struct RestClient {
    host: String,
    port: u16,
    authorization: Option<String>,
    timeout: Duration,
}

impl RestClient {
    pub fn new(server: &ServerConfig, timeout: Duration) -> Result<Self, ConnectError> {
        if server.host.is_empty() {
            return Err(ConnectError::InvalidServer(
                "hostname cannot be empty".to_string(),
            ));
        }

        let authorization = server
            .resolved_credentials()
            .map_err(|e| ConnectError::Credentials(e.to_string()))?
            .map(|(key, secret)| format!("token {}:{}", key, secret));

        Ok(Self {
            host: server.host.clone(),
            port: server.port,
            authorization,
            timeout,
        })
    }

    /// Send one JSON request and parse the response body.
    ///
    /// Non-2xx statuses are returned as `RestError::Api` with the body's
    /// error message when one is present.
    pub async fn request_json(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
    ) -> Result<Value, RestError> {
        let (status, value) = tokio::time::timeout(self.timeout, self.send(method, path_and_query, body))
            .await
            .map_err(|_| RestError::Timeout)??;

        if !status.is_success() {
            let message = value
                .get("message")
                .or_else(|| value.get("exc_type"))
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            return Err(RestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(value)
    }

    async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), RestError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| RestError::Connect(e.to_string()))?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| RestError::Connect(format!("HTTP handshake failed: {}", e)))?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::warn!("REST connection error: {}", e);
            }
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header(hyper::header::HOST, self.host.as_str())
            .header(hyper::header::ACCEPT, "application/json");

        if let Some(ref auth) = self.authorization {
            builder = builder.header(hyper::header::AUTHORIZATION, auth.as_str());
        }

        let req = match body {
            Some(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| RestError::Http(format!("failed to encode body: {}", e)))?;
                builder
                    .header(hyper::header::CONTENT_TYPE, "application/json")
                    .body(Full::new(Bytes::from(bytes)))
            }
            None => builder.body(Full::new(Bytes::new())),
        }
        .map_err(|e| RestError::Http(format!("failed to build request: {}", e)))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| RestError::Http(e.to_string()))?;

        let status = resp.status();
        let body_bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| RestError::Http(format!("failed to read response: {}", e)))?
            .to_bytes();

        let value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .map_err(|e| RestError::InvalidJson(e.to_string()))?
        };

        Ok((status, value))
    }
}

// =============================================================================
// RestStore
// =============================================================================

/// Document store talking to the backend's REST resource API.
pub struct RestStore {
    client: RestClient,
}

impl RestStore {
    pub fn new(server: &ServerConfig, timeout: Duration) -> Result<Self, ConnectError> {
        Ok(Self {
            client: RestClient::new(server, timeout)?,
        })
    }

    /// Verify the backend is reachable and credentials are accepted.
    pub async fn ping(&self) -> Result<(), RestError> {
        self.client
            .request_json(Method::GET, "/api/method/ping", None)
            .await?;
        Ok(())
    }

    /// Borrow the underlying client, for callers that dispatch methods.
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    fn resource_path(doctype: &DocTypeName, name: Option<&DocId>) -> String {
        let doctype = urlencoding::encode(doctype.as_str());
        match name {
            Some(name) => format!(
                "/api/resource/{}/{}",
                doctype,
                urlencoding::encode(name.as_str())
            ),
            None => format!("/api/resource/{}", doctype),
        }
    }

    fn data_object(value: Value) -> Result<DocFields, DocumentError> {
        match value.get("data") {
            Some(Value::Object(map)) => Ok(map.clone()),
            _ => Err(DocumentError::Serialization(
                "response missing data object".to_string(),
            )),
        }
    }
}

impl Sealed for RestStore {}

#[async_trait]
impl DocumentOps for RestStore {
    async fn get_value(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        field: &FieldName,
    ) -> Result<Option<Value>, DocumentError> {
        let value = self
            .client
            .request_json(Method::GET, &Self::resource_path(doctype, Some(name)), None)
            .await
            .map_err(|e| map_doc_error(e, doctype, name))?;

        let fields = Self::data_object(value)?;
        Ok(fields
            .get(field.as_str())
            .filter(|v| !v.is_null())
            .cloned())
    }

    async fn set_value(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        field: &FieldName,
        value: Value,
        _update_modified: bool,
    ) -> Result<(), DocumentError> {
        // The resource API always touches the modified timestamp; only the
        // in-memory store can suppress it.
        let mut body = serde_json::Map::new();
        body.insert(field.as_str().to_string(), value);

        self.client
            .request_json(
                Method::PUT,
                &Self::resource_path(doctype, Some(name)),
                Some(&Value::Object(body)),
            )
            .await
            .map_err(|e| map_doc_error(e, doctype, name))?;
        Ok(())
    }

    async fn insert_document(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
        fields: DocFields,
    ) -> Result<(), DocumentError> {
        let mut body = fields;
        body.insert("name".to_string(), Value::String(name.to_string()));

        self.client
            .request_json(
                Method::POST,
                &Self::resource_path(doctype, None),
                Some(&Value::Object(body)),
            )
            .await
            .map_err(|e| map_doc_error(e, doctype, name))?;
        Ok(())
    }

    async fn get_document(
        &self,
        doctype: &DocTypeName,
        name: &DocId,
    ) -> Result<DocFields, DocumentError> {
        let value = self
            .client
            .request_json(Method::GET, &Self::resource_path(doctype, Some(name)), None)
            .await
            .map_err(|e| map_doc_error(e, doctype, name))?;
        Self::data_object(value)
    }

    async fn list_documents(
        &self,
        doctype: &DocTypeName,
        filters: &DocFilters,
    ) -> Result<Vec<DocId>, DocumentError> {
        // Filters are encoded the way the resource API expects:
        // [["field", "=", value], ...]
        let filter_list: Vec<Value> = filters
            .equals
            .iter()
            .map(|(field, value)| {
                Value::Array(vec![
                    Value::String(field.clone()),
                    Value::String("=".to_string()),
                    value.clone(),
                ])
            })
            .collect();

        let mut path = format!(
            "{}?fields={}&limit_page_length={}",
            Self::resource_path(doctype, None),
            urlencoding::encode(r#"["name"]"#),
            filters.limit.unwrap_or(0),
        );
        if !filter_list.is_empty() {
            let encoded = serde_json::to_string(&filter_list)
                .map_err(|e| DocumentError::Serialization(e.to_string()))?;
            path.push_str(&format!("&filters={}", urlencoding::encode(&encoded)));
        }

        let value = self
            .client
            .request_json(Method::GET, &path, None)
            .await
            .map_err(map_list_error)?;

        let rows = match value.get("data") {
            Some(Value::Array(rows)) => rows.clone(),
            _ => {
                return Err(DocumentError::Serialization(
                    "response missing data array".to_string(),
                ));
            }
        };

        Ok(rows
            .iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str))
            .map(DocId::new)
            .collect())
    }
}
