//! Error types for tpl-merge

/// Result type for tpl-merge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tpl-merge operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    ParseError { format: String, message: String },

    #[error("Failed to serialize {format} content: {message}")]
    SerializeError { format: String, message: String },
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn serialize(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SerializeError {
            format: format.into(),
            message: message.into(),
        }
    }
}
