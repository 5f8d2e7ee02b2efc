// ABOUTME: Validated field name for document field access.
// ABOUTME: Restricts names to the backend's snake_case column convention.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldNameError {
    #[error("field name cannot be empty")]
    Empty,

    #[error("field name exceeds maximum length of 64 characters")]
    TooLong,

    #[error("field name cannot start with a digit")]
    StartsWithDigit,

    #[error("invalid character in field name: '{0}'")]
    InvalidChar(char),
}

/// A field name: lowercase ASCII letters, digits and underscores,
/// not starting with a digit, at most 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(value: &str) -> Result<Self, FieldNameError> {
        if value.is_empty() {
            return Err(FieldNameError::Empty);
        }

        if value.len() > 64 {
            return Err(FieldNameError::TooLong);
        }

        if value.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(FieldNameError::StartsWithDigit);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '_' {
                return Err(FieldNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        FieldName::new(&value).map_err(serde::de::Error::custom)
    }
}
