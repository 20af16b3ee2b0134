//! Error types and handling infrastructure for lineserve.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library error type and `anyhow` for the binary's top-level error reporting.
//!
//! ## Error Classes
//!
//! - **Startup**: `ConfigError` and `FileError` abort the process before serving begins
//! - **Lookup**: `FileError` and `LineOutOfRange` are reported to the requesting client only
//! - **Protocol**: `InvalidRequest` and `InvalidLineNumber` are reported to the client,
//!   the connection keeps going; `RequestTooLong` is reported and the connection closed
//! - **Transport**: `ServerError` covers listener and client socket failures

use thiserror::Error;

/// The main error type for lineserve operations.
#[derive(Error, Debug)]
pub enum LineServeError {
    /// File system related errors (open, read, seek)
    #[error("{message}: {source}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Startup configuration problems (unusable target file, bad config file)
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Requested line is outside `[1, total_lines]`
    #[error("invalid requested line number '{line_number}': {total_lines} lines in file")]
    LineOutOfRange { line_number: i64, total_lines: u64 },

    /// Command line from a client that matches no known command
    #[error("invalid request: '{request}'")]
    InvalidRequest { request: String },

    /// `GET` argument that is not an integer
    #[error("invalid line number '{token}'")]
    InvalidLineNumber { token: String },

    /// Request line longer than the server accepts
    #[error("request exceeds {limit} bytes")]
    RequestTooLong { limit: usize },

    /// Listener setup, accept loop or connection transport failure
    #[error("Server error: {message}")]
    ServerError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Standard Result type for lineserve operations.
pub type Result<T> = std::result::Result<T, LineServeError>;

impl LineServeError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a ServerError from an io::Error with additional context
    pub fn server(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::ServerError {
            message: message.into(),
            source,
        }
    }

    /// Whether the error was caused by the client rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::LineOutOfRange { .. }
                | Self::InvalidRequest { .. }
                | Self::InvalidLineNumber { .. }
                | Self::RequestTooLong { .. }
        )
    }
}
