use thiserror::Error;

/// Errors that can occur while loading or querying the schema registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("Unclassifiable field type `{signature}` for {component}.{property}")]
    UnclassifiableFieldType {
        component: String,
        property: String,
        signature: String,
    },

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Unknown enum: {0}")]
    UnknownEnum(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        SchemaError::MalformedSchema(err.to_string())
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::IoError(err.to_string())
    }
}
