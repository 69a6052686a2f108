//! Per-user token authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{AuthError, AuthRequest, Authenticator, Identity};
use crate::library::LibraryStore;

/// Authenticator that resolves access tokens issued at registration.
///
/// Accepts the token in either:
/// - `Authorization: Bearer <token>` header
/// - `X-API-Key: <token>` header
///
/// Requests without a token are anonymous. A token that matches no user, or
/// an `Authorization` header of another scheme, is rejected.
pub struct UserTokenAuthenticator {
    store: Arc<dyn LibraryStore>,
}

impl UserTokenAuthenticator {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Authenticator for UserTokenAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let Some(token) = request.access_token()? else {
            return Ok(Identity::anonymous());
        };

        let user = self
            .store
            .authenticate_token(token)
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        match user {
            Some(user) => {
                debug!("Authenticated user {} ({})", user.username, user.id);
                Ok(Identity::user(user.id, user.username, self.method_name()))
            }
            None => Err(AuthError::UnknownToken),
        }
    }

    fn method_name(&self) -> &'static str {
        "token"
    }
}
