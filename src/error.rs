//! Error types for reading and parsing configuration dumps
//!
//! Classification itself never fails: unknown lines are tagged with the
//! active context and kept. Errors only come from the edges of the crate,
//! reading input and enforcing the configured size cap, and from parsing
//! textual context identities.

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the dump from a file or reader failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input exceeds `ParserConfig::max_input_bytes`
    #[error("Input of {size} bytes exceeds the configured limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    /// A textual context identity such as `tunnel/1` could not be parsed
    #[error("Invalid context '{input}': {message}")]
    InvalidContext { input: String, message: String },
}

impl ConfigError {
    /// Creates an `InvalidContext` error
    pub fn invalid_context(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidContext {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error originated from I/O
    pub fn is_io(&self) -> bool {
        matches!(self, ConfigError::Io(_))
    }
}
