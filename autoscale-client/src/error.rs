//! Client error types

use shared::FormError;
use thiserror::Error;

use crate::i18n::CatalogError;

/// Client error type
///
/// Every variant is a transport-level failure from the point of view of the
/// sync adapter: the request either never reached the service or did not
/// come back as a decodable success response.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Body could not be decoded as JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No CSRF token available, request not sent
    #[error("Missing XSRF token")]
    MissingToken,

    /// Request body could not be built
    #[error(transparent)]
    Form(#[from] FormError),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Message catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ClientError {
    /// User-facing detail for an error notification
    pub fn detail(&self) -> String {
        match self {
            ClientError::Http(e) if e.is_timeout() => "Request timed out".to_string(),
            ClientError::Http(e) if e.is_connect() => "Unable to reach the server".to_string(),
            ClientError::Http(e) => e.to_string(),
            ClientError::Status { message, .. } => message.clone(),
            ClientError::InvalidResponse(message) => message.clone(),
            ClientError::MissingToken => "missing XSRF token".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
