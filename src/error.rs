//! Error types for HubSpace authentication

use thiserror::Error;

/// Main error type for the HubSpace authentication flow
#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity provider rejected the submitted username / password
    #[error("Invalid credentials: {0}")]
    InvalidAuth(String),

    /// The identity provider returned something this client cannot parse or trust
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Non-success HTTP status from an endpoint that requires one
    #[error("HTTP status {status} returned from {url}")]
    Status {
        /// Status code received
        status: u16,
        /// URL of the failed request
        url: String,
    },

    /// HTTP client error from the bundled reqwest transport
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure reported by a custom transport implementation
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Create an invalid credentials error
    pub fn invalid_auth(msg: impl Into<String>) -> Self {
        Self::InvalidAuth(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a status error
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether the provider rejected the credentials
    #[must_use]
    pub fn is_invalid_auth(&self) -> bool {
        matches!(self, Self::InvalidAuth(_))
    }

    /// Whether the provider response did not have the expected shape
    #[must_use]
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(AuthError::invalid_auth("bad password").is_invalid_auth());
        assert!(!AuthError::invalid_auth("bad password").is_invalid_response());
        assert!(AuthError::invalid_response("no form").is_invalid_response());
        assert!(!AuthError::status(500, "https://example.com").is_invalid_auth());
    }

    #[test]
    fn test_status_display() {
        let err = AuthError::status(503, "https://example.com/token");
        assert_eq!(
            err.to_string(),
            "HTTP status 503 returned from https://example.com/token"
        );
    }
}
