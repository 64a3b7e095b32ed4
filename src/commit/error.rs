use thiserror::Error;

/// Errors that can occur while pushing a component back to the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("Engine rejected commit: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Encoding error: {0}")]
    EncodeError(String),
}

impl From<std::io::Error> for CommitError {
    fn from(err: std::io::Error) -> Self {
        CommitError::IoError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CommitError {
    fn from(err: serde_yaml::Error) -> Self {
        CommitError::EncodeError(err.to_string())
    }
}
