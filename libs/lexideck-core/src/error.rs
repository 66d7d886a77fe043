//! Error types for lexideck-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by validation in the core library.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("Deck name must be {max} characters or less")]
    DeckNameTooLong { max: usize },

    #[error("Tag name must not be empty")]
    EmptyTagName,

    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("Invalid proficiency level: {0}")]
    InvalidProficiency(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// A failed data-access call, attributed to the operation that made it.
///
/// Displays as `"{context}: {message}"`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{context}: {message}")]
pub struct DataAccessError {
    pub context: String,
    pub message: String,
}

impl DataAccessError {
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_access_error_joins_context_and_message() {
        let err = DataAccessError::new("Failed to get tag", "connection reset");
        assert_eq!(err.to_string(), "Failed to get tag: connection reset");
    }

    #[test]
    fn deck_name_error_mentions_limit() {
        let err = CoreError::DeckNameTooLong { max: 50 };
        assert_eq!(err.to_string(), "Deck name must be 50 characters or less");
    }
}
