//! Global application error types.
//!
//! This module defines the error taxonomy shared by the authentication layer,
//! the dataset engine and the service layer. Errors are transport-agnostic;
//! the API layer maps them to HTTP status codes in a single place.

use thiserror::Error;

pub const DATA_UNAVAILABLE_MESSAGE: &str = "Data not available. Please run scraping first.";

/// Errors produced while decoding or encoding a signed token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is not three dot-separated base64url segments, or its
    /// header/payload could not be parsed.
    #[error("Malformed token: {0}")]
    Malformed(String),
    /// The signature does not match the server-held secret.
    #[error("Token signature mismatch")]
    BadSignature,
    /// The `exp` claim is in the past.
    #[error("Token has expired")]
    Expired,
    /// Signing the claims failed.
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Generic service error used across auth, dataset and API layers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad username/password, or a malformed, expired or wrong-type refresh token.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Missing, invalid, expired or wrong-type access token.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Valid identity without the right to perform the operation.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The dataset has not been loaded, or the last load failed.
    #[error("Data not available: {message}")]
    DataUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn data_unavailable() -> Self {
        Self::DataUnavailable {
            message: DATA_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal_error(error.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Encoding(message) => Self::internal_error(message),
            other => Self::unauthorized(other.to_string()),
        }
    }
}
