//! Chatport Common Error Types
//!
//! Centralized error handling for all chatport components

use thiserror::Error;

/// Main error type for chatport operations
#[derive(Debug, Error)]
pub enum ChatportError {
    /// The input matched none of the known export shapes
    #[error("Unrecognized export format")]
    UnrecognizedFormat,
    /// The migrator was handed a shape it cannot upgrade
    #[error("Unsupported data format")]
    UnsupportedFormat,
    /// A recognized shape whose fields could not be read
    #[error("Malformed {0}")]
    Malformed(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// File delivery errors
    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl ChatportError {
    /// True for the two errors that reject an input document outright
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ChatportError::UnrecognizedFormat | ChatportError::UnsupportedFormat
        )
    }
}

/// Convenience result type for chatport operations
pub type Result<T> = std::result::Result<T, ChatportError>;

impl From<toml::de::Error> for ChatportError {
    fn from(err: toml::de::Error) -> Self {
        ChatportError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ChatportError {
    fn from(err: toml::ser::Error) -> Self {
        ChatportError::Config(err.to_string())
    }
}
