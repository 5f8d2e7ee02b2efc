// ABOUTME: Server configuration for the backend REST API.
// ABOUTME: Parses formats like "host" and "host:port", with optional API credentials.

use super::env_value::EnvValue;
use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub api_key: Option<EnvValue>,
    #[serde(default)]
    pub api_secret: Option<EnvValue>,
}

fn default_port() -> u16 {
    8000
}

impl ServerConfig {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("server address cannot be empty".to_string());
        }

        // Parse format: host[:port]
        let (host, port) = if let Some(colon_pos) = s.rfind(':') {
            let port_str = &s[colon_pos + 1..];
            let port = port_str
                .parse::<u16>()
                .map_err(|_| format!("invalid port: {}", port_str))?;
            (&s[..colon_pos], port)
        } else {
            (s, default_port())
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }

        Ok(ServerConfig {
            host: host.to_string(),
            port,
            api_key: None,
            api_secret: None,
        })
    }

    /// Resolve API credentials to a `(key, secret)` pair.
    ///
    /// Both must be present or both absent; env-backed values are resolved
    /// here so a missing variable surfaces before the first request.
    pub fn resolved_credentials(&self) -> Result<Option<(String, String)>> {
        match (&self.api_key, &self.api_secret) {
            (None, None) => Ok(None),
            (Some(key), Some(secret)) => Ok(Some((key.resolve()?, secret.resolve()?))),
            _ => Err(Error::InvalidConfig(
                "api_key and api_secret must be set together".to_string(),
            )),
        }
    }
}
