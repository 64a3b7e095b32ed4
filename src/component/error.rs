use thiserror::Error;

use crate::schema::SchemaError;

/// Errors that can occur while decoding a component document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Shape mismatch for {key}: expected {expected}")]
    ShapeMismatch { key: String, expected: String },
}

impl From<serde_yaml::Error> for DecodeError {
    fn from(err: serde_yaml::Error) -> Self {
        DecodeError::Syntax(err.to_string())
    }
}

impl From<SchemaError> for DecodeError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownComponent(name) => DecodeError::UnknownComponent(name),
            other => DecodeError::Syntax(other.to_string()),
        }
    }
}
