use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity};

/// Why a request carrying credentials could not be resolved to a user.
///
/// A request without credentials is never an error: it browses anonymously.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token matches no registered user.
    #[error("Unknown access token")]
    UnknownToken,

    /// `Authorization` carries a scheme other than `Bearer`.
    #[error("Unsupported authorization scheme: {0}")]
    UnsupportedScheme(String),

    /// The user store could not be queried.
    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Label for the auth failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::UnknownToken => "unknown_token",
            AuthError::UnsupportedScheme(_) => "unsupported_scheme",
            AuthError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// True when the caller sent bad credentials, false when the server
    /// could not check them.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, AuthError::StoreUnavailable(_))
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve the caller of a request.
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    fn method_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_are_distinguished_from_outages() {
        assert!(AuthError::UnknownToken.is_caller_error());
        assert!(AuthError::UnsupportedScheme("Basic".into()).is_caller_error());
        assert!(!AuthError::StoreUnavailable("locked".into()).is_caller_error());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(AuthError::UnknownToken.kind(), "unknown_token");
        assert_eq!(
            AuthError::UnsupportedScheme("Digest".into()).kind(),
            "unsupported_scheme"
        );
        assert_eq!(
            AuthError::StoreUnavailable(String::new()).kind(),
            "store_unavailable"
        );
    }
}
