use async_trait::async_trait;
use tracing::debug;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Accounts switched off: every caller browses anonymously.
///
/// Credentials are ignored instead of rejected, so a client holding a token
/// from an earlier token-mode deployment can still browse. Registration still
/// works, but watchlist and review endpoints answer 401 because no caller
/// ever resolves to a user.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoneAuthenticator;

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        if request.headers.contains_key("authorization") || request.headers.contains_key("x-api-key")
        {
            debug!(
                "Ignoring credentials from {}: accounts are disabled",
                request.source_ip
            );
        }
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}
