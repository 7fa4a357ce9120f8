//! Client error types
//!
//! Only transport-level and unexpected failures are errors. Expected negative
//! outcomes (ticket not found, rejected request) arrive inside
//! [`PortalResponse`](shared::PortalResponse) with `success = false`.

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found (binary downloads only; JSON lookups use the envelope)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side failure without a usable envelope
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O error (saving a downloaded artifact)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
