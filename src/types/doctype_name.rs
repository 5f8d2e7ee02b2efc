// ABOUTME: Validated doctype name for addressing document collections.
// ABOUTME: Enforces the backend's naming rules before any request is built.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocTypeNameError {
    #[error("doctype name cannot be empty")]
    Empty,

    #[error("doctype name exceeds maximum length of 61 characters")]
    TooLong,

    #[error("doctype name cannot start or end with a space")]
    EdgeSpace,

    #[error("invalid character in doctype name: '{0}'")]
    InvalidChar(char),
}

/// A doctype name as the backend accepts it: ASCII letters, digits,
/// spaces, hyphens and underscores, at most 61 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocTypeName(String);

impl DocTypeName {
    pub fn new(value: &str) -> Result<Self, DocTypeNameError> {
        if value.is_empty() {
            return Err(DocTypeNameError::Empty);
        }

        if value.len() > 61 {
            return Err(DocTypeNameError::TooLong);
        }

        if value.starts_with(' ') || value.ends_with(' ') {
            return Err(DocTypeNameError::EdgeSpace);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != ' ' && c != '-' && c != '_' {
                return Err(DocTypeNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase hyphenated form, used for lock files and run names.
    pub fn slug(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c == ' ' || c == '_' {
                    '-'
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    }
}

impl fmt::Display for DocTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for DocTypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DocTypeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        DocTypeName::new(&value).map_err(serde::de::Error::custom)
    }
}
