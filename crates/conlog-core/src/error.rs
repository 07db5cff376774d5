//! Error types for the console logger

use thiserror::Error;

/// Main error type for console logger operations
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// A level name did not match any known severity
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Configuration could not be applied
    #[error("Configuration error: {0}")]
    Config(String),

    /// The process-wide context was installed twice
    #[error("Global console context already initialized")]
    AlreadyInitialized,

    /// The close handler can only be set once per context
    #[error("Close handler already set")]
    CloseHandlerAlreadySet,

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input was not valid base64
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type alias using ConsoleError
pub type ConsoleResult<T> = Result<T, ConsoleError>;
